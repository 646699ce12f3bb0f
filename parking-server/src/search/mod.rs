//! Ranked facility search.
//!
//! The pipeline for one request:
//!
//! 1. load the catalog (a failure here yields an empty result)
//! 2. geofence candidates by great-circle distance
//! 3. enrich candidates with road metrics, concurrently and time-limited
//! 4. rank by road distance
//!
//! Both modes share the pipeline; they differ only in which candidates are
//! enriched and what happens to candidates the routing service cannot
//! answer for.

mod config;
mod rank;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, warn};

use crate::catalog::FacilityCatalog;
use crate::domain::{Coordinate, EnrichedFacility, Facility};
use crate::geo::{nearest_by_great_circle, within_radius};
use crate::routing::{RouteEnricher, RouteProvider};

pub use config::SearchConfig;
pub use rank::{compare_by_road_distance, rank_by_road_distance};

/// What kind of answer the caller wants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchMode {
    /// Every facility within the radius that has a known road route,
    /// ranked by road distance.
    Nearby { radius_km: f64 },

    /// The single facility closest by great-circle distance, anywhere in
    /// the catalog. Returned even if its road metrics are unknown.
    Nearest,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Ranked {
        radius_km: f64,
        results: Vec<EnrichedFacility>,
    },
    Nearest(Option<EnrichedFacility>),
}

impl SearchOutcome {
    /// Returns true if nothing qualified.
    pub fn is_empty(&self) -> bool {
        match self {
            SearchOutcome::Ranked { results, .. } => results.is_empty(),
            SearchOutcome::Nearest(result) => result.is_none(),
        }
    }
}

/// Facility search over a catalog and a routing service.
pub struct RankedSearch<C, R> {
    catalog: C,
    enricher: RouteEnricher<R>,
    config: SearchConfig,
}

impl<C: FacilityCatalog, R: RouteProvider> RankedSearch<C, R> {
    /// Create a new search service.
    pub fn new(catalog: C, provider: R, config: SearchConfig) -> Self {
        let enricher = RouteEnricher::new(provider, config.route_timeout, config.route_attempts);
        Self {
            catalog,
            enricher,
            config,
        }
    }

    /// Search configuration in use.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// The underlying route provider.
    pub fn provider(&self) -> &R {
        self.enricher.provider()
    }

    /// Run a search in the given mode.
    pub async fn search(&self, origin: Coordinate, mode: SearchMode) -> SearchOutcome {
        match mode {
            SearchMode::Nearby { radius_km } => SearchOutcome::Ranked {
                radius_km,
                results: self.nearby_ranked(origin, radius_km).await,
            },
            SearchMode::Nearest => SearchOutcome::Nearest(self.nearest(origin).await),
        }
    }

    /// Facilities within `radius_km` of `origin`, ranked by road distance.
    ///
    /// Candidates the routing service cannot answer for are dropped.
    pub async fn nearby_ranked(&self, origin: Coordinate, radius_km: f64) -> Vec<EnrichedFacility> {
        let facilities = self.load_catalog().await;

        let candidates: Vec<(Facility, f64)> = within_radius(origin, &facilities, radius_km)
            .map(|(f, d)| (f.clone(), d))
            .collect();

        debug!(
            %origin,
            radius_km,
            catalog = facilities.len(),
            candidates = candidates.len(),
            "Geofence applied"
        );

        if candidates.is_empty() {
            return Vec::new();
        }

        let candidate_count = candidates.len();
        let enriched: Vec<EnrichedFacility> = stream::iter(candidates)
            .map(|(facility, straight_line_km)| async move {
                let road = self.enricher.enrich(origin, facility.coordinate).await;
                EnrichedFacility::new(facility, straight_line_km, road)
            })
            .buffered(self.config.max_concurrent_routes.max(1))
            .collect()
            .await;

        let ranked = rank_by_road_distance(enriched);

        if ranked.is_empty() {
            warn!(
                %origin,
                candidates = candidate_count,
                "No candidate could be routed"
            );
        } else {
            debug!(
                results = ranked.len(),
                dropped = candidate_count - ranked.len(),
                "Nearby search complete"
            );
        }

        ranked
    }

    /// The facility closest to `origin` by great-circle distance.
    ///
    /// Only that facility is routed. If routing fails it is still returned,
    /// with unknown road metrics. `None` only for an empty (or unavailable)
    /// catalog.
    pub async fn nearest(&self, origin: Coordinate) -> Option<EnrichedFacility> {
        let facilities = self.load_catalog().await;

        let (facility, straight_line_km) =
            nearest_by_great_circle(origin, &facilities).map(|(f, d)| (f.clone(), d))?;

        let road = self.enricher.enrich(origin, facility.coordinate).await;
        debug!(
            %origin,
            facility = %facility.name,
            straight_line_km,
            routed = road.is_some(),
            "Nearest search complete"
        );

        Some(EnrichedFacility::new(facility, straight_line_km, road))
    }

    /// Load the catalog, treating failure as an empty catalog.
    async fn load_catalog(&self) -> Arc<Vec<Facility>> {
        match self.catalog.load_all().await {
            Ok(facilities) => facilities,
            Err(e) => {
                error!(error = %e, "Facility catalog unavailable, returning no results");
                Arc::new(Vec::new())
            }
        }
    }
}
