//! In-memory route provider for tests and offline development.
//!
//! Responses are configured per destination coordinate. Unknown destinations
//! fall back to a configurable default (a "no route" failure unless set).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::domain::{Coordinate, RoadMetrics};
use crate::geo::distance_km;

use super::{RoutePermit, RouteProvider};
use super::error::RoutingError;

/// Canned response for one destination.
#[derive(Debug, Clone, Copy)]
enum MockResponse {
    Route(RoadMetrics),
    Delayed(Duration, RoadMetrics),
    Failure,
    /// Road distance = great-circle distance x factor, at 30 km/h.
    Scaled(f64),
}

/// Route provider that serves canned responses.
#[derive(Debug)]
pub struct MockRouteProvider {
    responses: Vec<(Coordinate, MockResponse)>,
    fallback: MockResponse,
    capacity: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Default for MockRouteProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRouteProvider {
    /// A provider that fails for every destination.
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            fallback: MockResponse::Failure,
            capacity: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// A provider whose road distance is the great-circle distance scaled by
    /// `factor`, for every destination.
    pub fn scaled(factor: f64) -> Self {
        Self {
            fallback: MockResponse::Scaled(factor),
            ..Self::new()
        }
    }

    /// Answer `destination` with the given metrics.
    pub fn with_route(mut self, destination: Coordinate, metrics: RoadMetrics) -> Self {
        self.responses.push((destination, MockResponse::Route(metrics)));
        self
    }

    /// Answer `destination` with the given metrics after `delay`.
    pub fn with_delayed_route(
        mut self,
        destination: Coordinate,
        delay: Duration,
        metrics: RoadMetrics,
    ) -> Self {
        self.responses
            .push((destination, MockResponse::Delayed(delay, metrics)));
        self
    }

    /// Fail requests to `destination` with "no route".
    pub fn with_failure(mut self, destination: Coordinate) -> Self {
        self.responses.push((destination, MockResponse::Failure));
        self
    }

    /// Admit at most `n` requests at a time through [`RouteProvider::acquire`].
    pub fn with_capacity(mut self, n: usize) -> Self {
        self.capacity = Some(Arc::new(Semaphore::new(n)));
        self
    }

    /// Number of route requests received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of requests that were in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn response_for(&self, destination: Coordinate) -> MockResponse {
        self.responses
            .iter()
            .find(|(c, _)| *c == destination)
            .map(|(_, r)| *r)
            .unwrap_or(self.fallback)
    }
}

/// Decrements the in-flight counter when a request finishes or is cancelled.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RouteProvider for MockRouteProvider {
    async fn acquire(&self) -> Result<RoutePermit, RoutingError> {
        match &self.capacity {
            Some(semaphore) => semaphore
                .clone()
                .acquire_owned()
                .await
                .map(RoutePermit::from_semaphore)
                .map_err(|_| RoutingError::Closed),
            None => Ok(RoutePermit::unbounded()),
        }
    }

    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RoadMetrics, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        match self.response_for(destination) {
            MockResponse::Route(metrics) => Ok(metrics),
            MockResponse::Delayed(delay, metrics) => {
                tokio::time::sleep(delay).await;
                Ok(metrics)
            }
            MockResponse::Failure => Err(RoutingError::NoRoute {
                code: "NoRoute".to_string(),
                message: format!("no mock route to {destination}"),
            }),
            MockResponse::Scaled(factor) => {
                let km = distance_km(origin, destination) * factor;
                Ok(RoadMetrics::from_route(km * 1000.0, km / 30.0 * 3600.0))
            }
        }
    }
}
