//! Search configuration.

use std::time::Duration;

/// Configuration parameters for facility search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Default geofence radius for nearby searches (kilometres).
    pub radius_km: f64,

    /// Maximum number of route requests issued concurrently per search.
    pub max_concurrent_routes: usize,

    /// Time budget for a single route request.
    /// Requests exceeding it count as "road metrics unknown".
    pub route_timeout: Duration,

    /// Attempts per route request (1 = no retries).
    /// Only transient failures are retried.
    pub route_attempts: u32,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        radius_km: f64,
        max_concurrent_routes: usize,
        route_timeout: Duration,
        route_attempts: u32,
    ) -> Self {
        Self {
            radius_km,
            max_concurrent_routes,
            route_timeout,
            route_attempts,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_km: 5.0,
            max_concurrent_routes: 8,
            route_timeout: Duration::from_secs(5),
            route_attempts: 1,
        }
    }
}
