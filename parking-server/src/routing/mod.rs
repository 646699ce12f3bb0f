//! Road routing: the external service client and the enrichment wrapper.
//!
//! The routing service is an opaque network dependency with an OSRM-style
//! HTTP API. Every call is independent and may fail; the [`RouteEnricher`]
//! turns failures into "unknown" so a single bad answer never aborts a
//! search.

mod client;
mod enricher;
mod error;
pub mod mock;
mod osrm;

use std::future::Future;

use tokio::sync::OwnedSemaphorePermit;

use crate::domain::{Coordinate, RoadMetrics};

pub use client::{DEFAULT_USER_AGENT, OsrmClient, OsrmConfig};
pub use enricher::RouteEnricher;
pub use error::RoutingError;
pub use osrm::{Route, RouteResponse};

/// Source of road distance/duration between two points.
///
/// This abstraction allows the search pipeline to be tested without a
/// running routing service.
pub trait RouteProvider: Send + Sync {
    /// Driving route metrics from `origin` to `destination`.
    ///
    /// Does not wait for capacity; see [`RouteProvider::acquire`].
    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<RoadMetrics, RoutingError>> + Send;

    /// Wait until the provider can take another request.
    ///
    /// The returned permit is held for the duration of one [`route`] call.
    /// Time spent here is queueing, not routing, and is not charged to the
    /// per-call timeout. Unbounded by default.
    ///
    /// [`route`]: RouteProvider::route
    fn acquire(&self) -> impl Future<Output = Result<RoutePermit, RoutingError>> + Send {
        std::future::ready(Ok(RoutePermit::unbounded()))
    }
}

/// Reserved capacity for one route request, released on drop.
#[derive(Debug)]
pub struct RoutePermit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl RoutePermit {
    /// A permit for a provider without a concurrency limit.
    pub fn unbounded() -> Self {
        Self { _permit: None }
    }

    /// A permit backed by a semaphore slot.
    pub fn from_semaphore(permit: OwnedSemaphorePermit) -> Self {
        Self {
            _permit: Some(permit),
        }
    }
}
