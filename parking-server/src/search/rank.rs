//! Ordering of enriched search results.
//!
//! Results are ranked by:
//! 1. Road distance (shorter is better)
//! 2. Straight-line distance (shorter is better)
//! 3. Catalog order (the sort is stable)

use std::cmp::Ordering;

use crate::domain::EnrichedFacility;

/// Compare two results by road distance, then straight-line distance.
///
/// Unknown road distance sorts last.
pub fn compare_by_road_distance(a: &EnrichedFacility, b: &EnrichedFacility) -> Ordering {
    let road = |e: &EnrichedFacility| e.road_distance_km.unwrap_or(f64::INFINITY);

    road(a)
        .total_cmp(&road(b))
        .then_with(|| a.straight_line_km.total_cmp(&b.straight_line_km))
}

/// Drop results without road metrics and sort the rest best-first.
pub fn rank_by_road_distance(results: Vec<EnrichedFacility>) -> Vec<EnrichedFacility> {
    let mut ranked: Vec<_> = results
        .into_iter()
        .filter(EnrichedFacility::has_road_metrics)
        .collect();
    ranked.sort_by(compare_by_road_distance);
    ranked
}
