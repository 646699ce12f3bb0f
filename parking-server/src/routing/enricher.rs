//! Road-metric enrichment with per-call timeout and optional retries.

use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::{Coordinate, RoadMetrics};

use super::RouteProvider;
use super::error::RoutingError;

/// Wraps a [`RouteProvider`] and turns every failure into "unknown".
///
/// Each attempt is bounded by its own timeout, so one hung request cannot
/// hold up the rest of a search. The timeout starts once the provider has
/// admitted the request; waiting for capacity is not counted. Only transient
/// failures are retried.
#[derive(Debug)]
pub struct RouteEnricher<R> {
    provider: R,
    timeout: Duration,
    attempts: u32,
}

impl<R: RouteProvider> RouteEnricher<R> {
    /// Create an enricher with the given per-attempt timeout and attempt count.
    ///
    /// `attempts` is clamped to at least one.
    pub fn new(provider: R, timeout: Duration, attempts: u32) -> Self {
        Self {
            provider,
            timeout,
            attempts: attempts.max(1),
        }
    }

    /// Access the underlying provider.
    pub fn provider(&self) -> &R {
        &self.provider
    }

    /// Road distance and duration between two points, or `None` if the
    /// routing service could not answer.
    pub async fn enrich(&self, origin: Coordinate, destination: Coordinate) -> Option<RoadMetrics> {
        for attempt in 1..=self.attempts {
            match self.route_once(origin, destination).await {
                Ok(metrics) => return Some(metrics),
                Err(e) if e.is_transient() && attempt < self.attempts => {
                    debug!(
                        %origin,
                        %destination,
                        attempt,
                        error = %e,
                        "Route request failed, retrying"
                    );
                }
                Err(e) => {
                    warn!(
                        %origin,
                        %destination,
                        attempt,
                        error = %e,
                        "Routing unavailable, road metrics unknown"
                    );
                    return None;
                }
            }
        }
        None
    }

    async fn route_once(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RoadMetrics, RoutingError> {
        let _permit = self.provider.acquire().await?;
        tokio::time::timeout(self.timeout, self.provider.route(origin, destination))
            .await
            .unwrap_or_else(|_| Err(RoutingError::Timeout(self.timeout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::mock::MockRouteProvider;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[tokio::test]
    async fn success_returns_metrics() {
        let dest = coord(41.31, 69.21);
        let provider = MockRouteProvider::new().with_route(dest, RoadMetrics::from_route(1500.0, 300.0));
        let enricher = RouteEnricher::new(provider, Duration::from_secs(1), 1);

        let metrics = enricher.enrich(coord(41.3, 69.2), dest).await.unwrap();
        assert_eq!(metrics.distance_km, 1.5);
        assert_eq!(metrics.duration_min, 5.0);
    }

    #[tokio::test]
    async fn failure_is_absent() {
        let dest = coord(41.31, 69.21);
        let provider = MockRouteProvider::new().with_failure(dest);
        let enricher = RouteEnricher::new(provider, Duration::from_secs(1), 1);

        assert!(enricher.enrich(coord(41.3, 69.2), dest).await.is_none());
        assert_eq!(enricher.provider().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_absent() {
        let dest = coord(41.31, 69.21);
        let provider = MockRouteProvider::new().with_delayed_route(
            dest,
            Duration::from_secs(60),
            RoadMetrics::from_route(1000.0, 60.0),
        );
        let enricher = RouteEnricher::new(provider, Duration::from_secs(2), 1);

        let started = tokio::time::Instant::now();
        assert!(enricher.enrich(coord(41.3, 69.2), dest).await.is_none());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let dest = coord(41.31, 69.21);
        let provider = MockRouteProvider::new()
            .with_delayed_route(dest, Duration::from_secs(60), RoadMetrics::from_route(1000.0, 60.0));
        let enricher = RouteEnricher::new(provider, Duration::from_secs(1), 3);

        assert!(enricher.enrich(coord(41.3, 69.2), dest).await.is_none());
        assert_eq!(enricher.provider().calls(), 3);
    }

    #[tokio::test]
    async fn definitive_failures_are_not_retried() {
        let dest = coord(41.31, 69.21);
        let provider = MockRouteProvider::new().with_failure(dest);
        let enricher = RouteEnricher::new(provider, Duration::from_secs(1), 3);

        assert!(enricher.enrich(coord(41.3, 69.2), dest).await.is_none());
        assert_eq!(enricher.provider().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn queueing_does_not_count_against_timeout() {
        let dest = coord(41.31, 69.21);
        let provider = MockRouteProvider::new()
            .with_delayed_route(dest, Duration::from_secs(3), RoadMetrics::from_route(1000.0, 60.0))
            .with_capacity(1);
        let enricher = RouteEnricher::new(provider, Duration::from_secs(5), 1);

        let started = tokio::time::Instant::now();
        let (first, second) = tokio::join!(
            enricher.enrich(coord(41.3, 69.2), dest),
            enricher.enrich(coord(41.3, 69.2), dest),
        );

        // The second request queues for 3 s, then routes for 3 s.
        assert!(first.is_some());
        assert!(second.is_some());
        assert!(started.elapsed() >= Duration::from_secs(6));
        assert_eq!(enricher.provider().peak_in_flight(), 1);
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        let enricher = RouteEnricher::new(MockRouteProvider::new(), Duration::from_secs(1), 0);
        assert_eq!(enricher.attempts, 1);
    }
}
