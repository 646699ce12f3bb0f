//! Read-only facility catalog.
//!
//! The catalog is owned by a storage collaborator; the search pipeline only
//! ever asks for the full list. Backends:
//!
//! - [`SqliteCatalog`]: the `parkings` table of a SQLite database
//! - [`JsonCatalog`]: a JSON array on disk
//! - [`StaticCatalog`]: an in-memory list (embedding and tests)
//!
//! Any of them can be wrapped in a [`CachedCatalog`].

mod cache;
mod error;
mod json;
mod sqlite;

use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::domain::{Coordinate, Facility};

pub use cache::{CachedCatalog, CatalogCacheConfig};
pub use error::CatalogError;
pub use json::JsonCatalog;
pub use sqlite::SqliteCatalog;

/// Source of the full facility list.
///
/// This abstraction allows the search pipeline to be tested with in-memory
/// data.
pub trait FacilityCatalog: Send + Sync {
    /// Load every known facility, in catalog order.
    fn load_all(&self) -> impl Future<Output = Result<Arc<Vec<Facility>>, CatalogError>> + Send;
}

/// A fixed, in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    facilities: Arc<Vec<Facility>>,
}

impl StaticCatalog {
    /// Create a catalog serving the given facilities.
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self {
            facilities: Arc::new(facilities),
        }
    }
}

impl FacilityCatalog for StaticCatalog {
    async fn load_all(&self) -> Result<Arc<Vec<Facility>>, CatalogError> {
        Ok(self.facilities.clone())
    }
}

/// Catalog backend selected at startup.
#[derive(Debug, Clone)]
pub enum CatalogBackend {
    Sqlite(SqliteCatalog),
    Json(JsonCatalog),
    Static(StaticCatalog),
}

impl FacilityCatalog for CatalogBackend {
    async fn load_all(&self) -> Result<Arc<Vec<Facility>>, CatalogError> {
        match self {
            CatalogBackend::Sqlite(c) => c.load_all().await,
            CatalogBackend::Json(c) => c.load_all().await,
            CatalogBackend::Static(c) => c.load_all().await,
        }
    }
}

/// Raw catalog row before coordinate validation.
#[derive(Debug, Clone, Deserialize)]
struct FacilityRow {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    address: String,
}

/// Convert raw rows to facilities, skipping rows with invalid coordinates.
fn collect_valid(rows: Vec<FacilityRow>) -> Vec<Facility> {
    rows.into_iter()
        .filter_map(|row| match Coordinate::new(row.latitude, row.longitude) {
            Ok(coordinate) => Some(Facility::new(row.name, coordinate, row.address)),
            Err(e) => {
                warn!(facility = %row.name, error = %e, "Skipping catalog row");
                None
            }
        })
        .collect()
}
