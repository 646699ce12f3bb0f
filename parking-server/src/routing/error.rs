//! Routing client error types.

use std::time::Duration;

/// Errors from a single route request.
///
/// None of these escape the [`RouteEnricher`](super::RouteEnricher): every
/// variant degrades to "road metrics unknown" for the affected facility.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// HTTP request failed (connection refused, reset, client timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Routing service returned a non-success status code
    #[error("routing service returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Service answered but found no usable route
    #[error("no route ({code}): {message}")]
    NoRoute { code: String, message: String },

    /// The call exceeded its time budget
    #[error("route request timed out after {0:?}")]
    Timeout(Duration),

    /// The client's concurrency limiter was shut down
    #[error("routing client closed")]
    Closed,
}

impl RoutingError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Definitive answers ("no route", malformed data) are not transient.
    pub fn is_transient(&self) -> bool {
        match self {
            RoutingError::Http(_) | RoutingError::Timeout(_) => true,
            RoutingError::Status { status, .. } => *status == 429 || *status >= 500,
            RoutingError::Json { .. } | RoutingError::NoRoute { .. } | RoutingError::Closed => {
                false
            }
        }
    }
}
