//! Application state for the web layer.

use std::sync::Arc;

use crate::search::RankedSearch;
use crate::session::SessionStore;

/// Shared application state.
///
/// Generic over the catalog and route provider so handlers can be tested
/// against in-memory collaborators.
pub struct AppState<C, R> {
    /// Facility search service
    pub search: Arc<RankedSearch<C, R>>,

    /// Last known location per user
    pub sessions: SessionStore,
}

impl<C, R> AppState<C, R> {
    /// Create a new app state.
    pub fn new(search: RankedSearch<C, R>, sessions: SessionStore) -> Self {
        Self {
            search: Arc::new(search),
            sessions,
        }
    }
}

// Derived Clone would require C: Clone and R: Clone.
impl<C, R> Clone for AppState<C, R> {
    fn clone(&self) -> Self {
        Self {
            search: self.search.clone(),
            sessions: self.sessions.clone(),
        }
    }
}
