//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, EnrichedFacility};
use crate::session::UserSession;

/// Shown in place of a road distance or duration the routing service could
/// not provide.
pub const UNKNOWN: &str = "unknown";

/// Body of a location update.
#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// Query for a nearby search from a stored location.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    /// Geofence radius; the configured default when absent
    pub radius_km: Option<f64>,
}

/// Query for a stateless search.
#[derive(Debug, Deserialize)]
pub struct CoordinateQuery {
    pub lat: f64,
    pub lon: f64,

    /// Geofence radius (nearby only)
    pub radius_km: Option<f64>,
}

/// Acknowledgement of a stored location.
#[derive(Debug, Serialize)]
pub struct LocationAck {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTime<Utc>,
}

impl LocationAck {
    pub fn from_session(session: &UserSession) -> Self {
        Self {
            user_id: session.user_id.to_string(),
            latitude: session.coordinate.latitude(),
            longitude: session.coordinate.longitude(),
            updated_at: session.updated_at,
        }
    }
}

/// One facility in a search answer.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityResult {
    /// 1-based position in the answer
    pub rank: usize,

    pub name: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Google Maps link to the facility
    pub map_url: String,

    /// Road distance, e.g. "1.2 km", or "unknown"
    pub distance: String,

    /// Road travel time, e.g. "7 min", or "unknown"
    pub duration: String,

    pub address: String,

    /// Great-circle distance from the search origin, two decimals
    pub straight_line_km: f64,
}

impl FacilityResult {
    /// Create from an enriched facility at the given 1-based rank.
    pub fn from_enriched(rank: usize, enriched: &EnrichedFacility) -> Self {
        let coordinate = enriched.facility.coordinate;
        Self {
            rank,
            name: enriched.facility.name.clone(),
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            map_url: map_url(&coordinate),
            distance: format_distance(enriched.road_distance_km),
            duration: format_duration(enriched.road_duration_min),
            address: enriched.facility.address.clone(),
            straight_line_km: (enriched.straight_line_km * 100.0).round() / 100.0,
        }
    }
}

/// Answer to a nearby search.
#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub found: bool,
    pub radius_km: f64,
    pub results: Vec<FacilityResult>,

    /// Explanation when nothing was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NearbyResponse {
    pub fn new(radius_km: f64, ranked: &[EnrichedFacility]) -> Self {
        let results: Vec<FacilityResult> = ranked
            .iter()
            .enumerate()
            .map(|(i, e)| FacilityResult::from_enriched(i + 1, e))
            .collect();

        Self {
            found: !results.is_empty(),
            radius_km,
            message: results.is_empty().then(|| nothing_nearby_message(radius_km)),
            results,
        }
    }
}

/// Answer to a nearest search.
#[derive(Debug, Serialize)]
pub struct NearestResponse {
    pub found: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<FacilityResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NearestResponse {
    pub fn new(nearest: Option<&EnrichedFacility>) -> Self {
        let result = nearest.map(|e| FacilityResult::from_enriched(1, e));
        Self {
            found: result.is_some(),
            message: result.is_none().then(|| NO_FACILITIES_MESSAGE.to_string()),
            result,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Message for a nearest search over an empty catalog.
pub const NO_FACILITIES_MESSAGE: &str = "No parking facilities are on file.";

/// Message for a nearby search with no routable facility in range.
pub fn nothing_nearby_message(radius_km: f64) -> String {
    format!("No parking found within {radius_km} km. Try again with a larger radius.")
}

/// Google Maps link for a coordinate.
pub fn map_url(coordinate: &Coordinate) -> String {
    format!("http://www.google.com/maps/place/{coordinate}")
}

/// Format a road distance as "1.2 km".
pub fn format_distance(km: Option<f64>) -> String {
    km.map_or_else(|| UNKNOWN.to_string(), |km| format!("{km:.1} km"))
}

/// Format a road duration as "7 min".
pub fn format_duration(minutes: Option<f64>) -> String {
    minutes.map_or_else(|| UNKNOWN.to_string(), |min| format!("{min:.0} min"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Facility, RoadMetrics};

    fn enriched(road: Option<RoadMetrics>) -> EnrichedFacility {
        EnrichedFacility::new(
            Facility::new(
                "Chorsu Parking",
                Coordinate::new(41.3264, 69.2285).unwrap(),
                "Chorsu Square 1",
            ),
            1.23456,
            road,
        )
    }

    #[test]
    fn formatting() {
        assert_eq!(format_distance(Some(2.3)), "2.3 km");
        assert_eq!(format_distance(Some(10.0)), "10.0 km");
        assert_eq!(format_distance(None), "unknown");
        assert_eq!(format_duration(Some(7.0)), "7 min");
        assert_eq!(format_duration(None), "unknown");
    }

    #[test]
    fn map_link() {
        let c = Coordinate::new(41.3264, 69.2285).unwrap();
        assert_eq!(map_url(&c), "http://www.google.com/maps/place/41.3264,69.2285");
    }

    #[test]
    fn facility_result_from_routed() {
        let result =
            FacilityResult::from_enriched(1, &enriched(Some(RoadMetrics::from_route(2345.0, 431.0))));

        assert_eq!(result.rank, 1);
        assert_eq!(result.name, "Chorsu Parking");
        assert_eq!(result.distance, "2.3 km");
        assert_eq!(result.duration, "7 min");
        assert_eq!(result.address, "Chorsu Square 1");
        assert_eq!(result.straight_line_km, 1.23);
        assert_eq!(result.map_url, "http://www.google.com/maps/place/41.3264,69.2285");
    }

    #[test]
    fn facility_result_from_unrouted() {
        let result = FacilityResult::from_enriched(1, &enriched(None));

        assert_eq!(result.distance, "unknown");
        assert_eq!(result.duration, "unknown");
    }

    #[test]
    fn empty_nearby_response() {
        let response = NearbyResponse::new(5.0, &[]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["found"], false);
        assert_eq!(
            json["message"],
            "No parking found within 5 km. Try again with a larger radius."
        );
        assert!(json["results"].as_array().unwrap().is_empty());
    }

    #[test]
    fn nearby_response_ranks_from_one() {
        let routed = enriched(Some(RoadMetrics::from_route(1000.0, 60.0)));
        let response = NearbyResponse::new(2.5, &[routed.clone(), routed]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["found"], true);
        assert_eq!(json["radius_km"], 2.5);
        assert!(json.get("message").is_none());
        assert_eq!(json["results"][0]["rank"], 1);
        assert_eq!(json["results"][1]["rank"], 2);
    }

    #[test]
    fn nearest_response() {
        let json = serde_json::to_value(NearestResponse::new(None)).unwrap();
        assert_eq!(json["found"], false);
        assert_eq!(json["message"], NO_FACILITIES_MESSAGE);
        assert!(json.get("result").is_none());

        let unrouted = enriched(None);
        let json = serde_json::to_value(NearestResponse::new(Some(&unrouted))).unwrap();
        assert_eq!(json["found"], true);
        assert_eq!(json["result"]["distance"], "unknown");
    }
}
