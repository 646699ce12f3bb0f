//! Catalog error types.

use std::path::PathBuf;
use std::sync::Arc;

/// Errors raised while loading the facility catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Opening the SQLite database failed
    #[error("failed to open catalog database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Reading rows from the database failed
    #[error("catalog query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Reading the catalog file failed
    #[error("failed to read catalog file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file was not valid JSON
    #[error("failed to parse catalog file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The blocking load task panicked or was cancelled
    #[error("catalog load task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// A load failure shared by several concurrent callers
    #[error(transparent)]
    Shared(Arc<CatalogError>),
}
