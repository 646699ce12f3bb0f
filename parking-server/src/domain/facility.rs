//! Parking facilities and the per-request records derived from them.

use serde::Serialize;

use super::Coordinate;

/// A parking facility as listed in the catalog.
///
/// Facilities are read-only: search results wrap them in an
/// [`EnrichedFacility`] instead of writing road metrics back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facility {
    /// Display name, also used as the identifier.
    pub name: String,

    /// Location of the entrance.
    pub coordinate: Coordinate,

    /// Street address.
    pub address: String,
}

impl Facility {
    /// Create a new facility.
    pub fn new(name: impl Into<String>, coordinate: Coordinate, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinate,
            address: address.into(),
        }
    }
}

/// Road distance and travel time reported by the routing service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoadMetrics {
    /// Driving distance in kilometres, rounded to one decimal place.
    pub distance_km: f64,

    /// Driving time in whole minutes.
    pub duration_min: f64,
}

impl RoadMetrics {
    /// Build metrics from raw routing values (metres and seconds).
    ///
    /// ```
    /// use parking_server::domain::RoadMetrics;
    ///
    /// let m = RoadMetrics::from_route(2345.0, 431.0);
    /// assert_eq!(m.distance_km, 2.3);
    /// assert_eq!(m.duration_min, 7.0);
    /// ```
    pub fn from_route(distance_m: f64, duration_s: f64) -> Self {
        Self {
            distance_km: (distance_m / 100.0).round() / 10.0,
            duration_min: (duration_s / 60.0).round(),
        }
    }
}

/// A facility annotated with distances for one search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedFacility {
    pub facility: Facility,

    /// Great-circle distance from the search origin.
    pub straight_line_km: f64,

    /// Road distance, absent when the routing service could not answer.
    pub road_distance_km: Option<f64>,

    /// Road travel time, absent when the routing service could not answer.
    pub road_duration_min: Option<f64>,
}

impl EnrichedFacility {
    /// Attach the (possibly absent) road metrics to a facility.
    pub fn new(facility: Facility, straight_line_km: f64, road: Option<RoadMetrics>) -> Self {
        Self {
            facility,
            straight_line_km,
            road_distance_km: road.map(|m| m.distance_km),
            road_duration_min: road.map(|m| m.duration_min),
        }
    }

    /// Returns true if both road fields are known.
    pub fn has_road_metrics(&self) -> bool {
        self.road_distance_km.is_some() && self.road_duration_min.is_some()
    }
}
