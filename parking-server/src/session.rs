//! Last-known location per user.
//!
//! Users share a coordinate once and then ask for "nearby" or "nearest"
//! later. The store is bounded both by capacity and by idle time, so
//! one-off users do not accumulate forever.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;
use serde::Serialize;

use crate::domain::Coordinate;

/// Maximum length of a user identifier.
const MAX_USER_ID_LEN: usize = 128;

/// Error returned when parsing an invalid user identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid user id: {reason}")]
pub struct InvalidUserId {
    reason: &'static str,
}

/// Opaque user identifier supplied by the front-end (chat id, device id...).
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(String);

impl UserId {
    /// Parse a user id. Must be non-empty, at most 128 bytes, and free of
    /// whitespace and control characters.
    pub fn parse(s: &str) -> Result<Self, InvalidUserId> {
        if s.is_empty() {
            return Err(InvalidUserId {
                reason: "must not be empty",
            });
        }
        if s.len() > MAX_USER_ID_LEN {
            return Err(InvalidUserId {
                reason: "must be at most 128 bytes",
            });
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidUserId {
                reason: "must not contain whitespace or control characters",
            });
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user's most recently shared location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSession {
    pub user_id: UserId,
    pub coordinate: Coordinate,
    pub updated_at: DateTime<Utc>,
}

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum number of users remembered.
    pub max_capacity: u64,

    /// Sessions not read or written for this long are evicted.
    pub time_to_idle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            time_to_idle: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Concurrent user -> last coordinate store.
///
/// Backed by a sharded concurrent cache: a write for one user never blocks
/// reads or writes for another. Cloning shares the underlying store.
#[derive(Clone)]
pub struct SessionStore {
    sessions: MokaCache<UserId, Arc<UserSession>>,
}

impl SessionStore {
    /// Create a new store with the given configuration.
    pub fn new(config: &SessionConfig) -> Self {
        let sessions = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_idle(config.time_to_idle)
            .build();

        Self { sessions }
    }

    /// Remember `coordinate` as the user's last location.
    pub async fn record(&self, user_id: UserId, coordinate: Coordinate) -> Arc<UserSession> {
        let session = Arc::new(UserSession {
            user_id: user_id.clone(),
            coordinate,
            updated_at: Utc::now(),
        });
        self.sessions.insert(user_id, session.clone()).await;
        session
    }

    /// The user's session, if they have shared a location recently.
    pub async fn get(&self, user_id: &UserId) -> Option<Arc<UserSession>> {
        self.sessions.get(user_id).await
    }

    /// The user's last coordinate, if known.
    pub async fn last_coordinate(&self, user_id: &UserId) -> Option<Coordinate> {
        self.get(user_id).await.map(|s| s.coordinate)
    }

    /// Forget a user's location.
    pub async fn forget(&self, user_id: &UserId) {
        self.sessions.invalidate(user_id).await;
    }

    /// Approximate number of stored sessions (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.sessions.entry_count()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}
