//! OSRM HTTP client.
//!
//! Issues one driving-route request per origin/destination pair. A semaphore
//! bounds the number of in-flight requests across all concurrent searches so
//! a burst of users cannot flood the routing service. Callers wait for a
//! slot with [`RouteProvider::acquire`] before calling
//! [`RouteProvider::route`], so queueing is kept apart from request time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::trace;

use crate::domain::{Coordinate, RoadMetrics};

use super::{RoutePermit, RouteProvider};
use super::error::RoutingError;
use super::osrm::RouteResponse;

/// Default base URL: the public OSRM demo server.
const DEFAULT_BASE_URL: &str = "http://router.project-osrm.org";

/// Default routing profile.
const DEFAULT_PROFILE: &str = "driving";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = concat!("parking-server/", env!("CARGO_PKG_VERSION"));

/// Configuration for the OSRM client.
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL of the OSRM service
    pub base_url: String,
    /// Routing profile segment of the URL
    pub profile: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// HTTP request timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl OsrmConfig {
    /// Create a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            profile: DEFAULT_PROFILE.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the routing profile (e.g. `"driving"`, `"car"`).
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// OSRM Route API client.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    http: reqwest::Client,
    base_url: String,
    profile: String,
    semaphore: Arc<Semaphore>,
}

impl OsrmClient {
    /// Create a new OSRM client with the given configuration.
    pub fn new(config: OsrmConfig) -> Result<Self, RoutingError> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile: config.profile,
            semaphore: Arc::new(Semaphore::new(
                config.max_concurrent.clamp(1, Semaphore::MAX_PERMITS),
            )),
        })
    }

    /// Build the route URL for a pair of coordinates.
    ///
    /// OSRM takes `longitude,latitude` pairs separated by `;`.
    pub fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.base_url,
            self.profile,
            origin.longitude(),
            origin.latitude(),
            destination.longitude(),
            destination.latitude()
        )
    }
}

impl RouteProvider for OsrmClient {
    async fn acquire(&self) -> Result<RoutePermit, RoutingError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| RoutingError::Closed)?;
        Ok(RoutePermit::from_semaphore(permit))
    }

    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RoadMetrics, RoutingError> {
        let url = self.route_url(origin, destination);
        trace!(%url, "Requesting route");

        let response = self
            .http
            .get(&url)
            .query(&[("overview", "false")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // OSRM reports "no route" style failures as 400 with a JSON body
            if let Ok(parsed) = serde_json::from_str::<RouteResponse>(&body)
                && !parsed.is_ok()
            {
                return parsed.into_metrics();
            }
            return Err(RoutingError::Status {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let parsed: RouteResponse =
            serde_json::from_str(&body).map_err(|e| RoutingError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        parsed.into_metrics()
    }
}
