//! Great-circle geometry and radius filtering.
//!
//! Distances use the haversine formula on a spherical Earth. This is accurate
//! to well under a percent at city scale, which is all the geofence needs:
//! real ranking happens on road distance.

use crate::domain::{Coordinate, Facility};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometres.
///
/// # Example
///
/// ```
/// use parking_server::domain::Coordinate;
/// use parking_server::geo::distance_km;
///
/// let tashkent = Coordinate::new(41.2995, 69.2401).unwrap();
/// let samarkand = Coordinate::new(39.6270, 66.9750).unwrap();
///
/// let d = distance_km(tashkent, samarkand);
/// assert!((d - 270.0).abs() < 5.0);
/// ```
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude().to_radians();
    let phi2 = b.latitude().to_radians();
    let delta_phi = (b.latitude() - a.latitude()).to_radians();
    let delta_lambda = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push h just past 1 for near-antipodal points.
    let h = h.clamp(0.0, 1.0);

    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Iterate facilities within `radius_km` of `origin`, with their distance.
///
/// The boundary is inclusive. Catalog order is preserved.
pub fn within_radius(
    origin: Coordinate,
    facilities: &[Facility],
    radius_km: f64,
) -> impl Iterator<Item = (&Facility, f64)> {
    facilities
        .iter()
        .map(move |f| (f, distance_km(origin, f.coordinate)))
        .filter(move |(_, d)| *d <= radius_km)
}

/// Facilities within `radius_km` of `origin`, in catalog order.
pub fn filter_within_radius(
    origin: Coordinate,
    facilities: &[Facility],
    radius_km: f64,
) -> Vec<&Facility> {
    within_radius(origin, facilities, radius_km)
        .map(|(f, _)| f)
        .collect()
}

/// The facility closest to `origin` by great-circle distance.
///
/// Not radius-limited. On exact ties the earliest facility in catalog order
/// wins. Returns `None` for an empty slice.
pub fn nearest_by_great_circle(
    origin: Coordinate,
    facilities: &[Facility],
) -> Option<(&Facility, f64)> {
    facilities
        .iter()
        .map(|f| (f, distance_km(origin, f.coordinate)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0)
            .prop_map(|(lat, lon)| Coordinate::new(lat, lon).unwrap())
    }

    fn facilities() -> impl Strategy<Value = Vec<Facility>> {
        proptest::collection::vec(coordinate(), 0..20).prop_map(|coords| {
            coords
                .into_iter()
                .enumerate()
                .map(|(i, c)| Facility::new(format!("P{i}"), c, ""))
                .collect()
        })
    }

    proptest! {
        /// distance(a, b) == distance(b, a)
        #[test]
        fn distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = distance_km(a, b);
            let ba = distance_km(b, a);
            prop_assert!((ab - ba).abs() < 1e-9, "ab={ab} ba={ba}");
        }

        /// distance(a, a) == 0
        #[test]
        fn distance_to_self_is_zero(a in coordinate()) {
            prop_assert_eq!(distance_km(a, a), 0.0);
        }

        /// Distances are non-negative and never exceed half the circumference
        #[test]
        fn distance_is_bounded(a in coordinate(), b in coordinate()) {
            let d = distance_km(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= EARTH_RADIUS_KM * std::f64::consts::PI + 1e-6);
        }

        /// A smaller radius always yields a subset of a larger one
        #[test]
        fn radius_is_monotonic(
            origin in coordinate(),
            facilities in facilities(),
            r1 in 0.0f64..5000.0,
            extra in 0.0f64..5000.0,
        ) {
            let r2 = r1 + extra;
            let small = filter_within_radius(origin, &facilities, r1);
            let large = filter_within_radius(origin, &facilities, r2);
            for f in &small {
                prop_assert!(large.iter().any(|g| std::ptr::eq(*f, *g)));
            }
        }

        /// The nearest facility is never farther than any other
        #[test]
        fn nearest_is_minimal(origin in coordinate(), facilities in facilities()) {
            match nearest_by_great_circle(origin, &facilities) {
                None => prop_assert!(facilities.is_empty()),
                Some((_, d)) => {
                    for f in &facilities {
                        prop_assert!(d <= distance_km(origin, f.coordinate));
                    }
                }
            }
        }
    }
}
