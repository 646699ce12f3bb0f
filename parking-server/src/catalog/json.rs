//! JSON-file facility catalog.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::Facility;

use super::error::CatalogError;
use super::{FacilityCatalog, FacilityRow, collect_valid};

/// Catalog read from a JSON array of
/// `{"name", "latitude", "longitude", "address"}` objects.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    /// Create a catalog reading from the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the catalog file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FacilityCatalog for JsonCatalog {
    async fn load_all(&self) -> Result<Arc<Vec<Facility>>, CatalogError> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| CatalogError::Io {
                    path: self.path.clone(),
                    source,
                })?;

        let rows: Vec<FacilityRow> =
            serde_json::from_str(&contents).map_err(|source| CatalogError::Json {
                path: self.path.clone(),
                source,
            })?;

        Ok(Arc::new(collect_valid(rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn loads_facilities() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parkings.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "Chorsu", "latitude": 41.3262, "longitude": 69.2347, "address": "Chorsu bazaar"},
                {"name": "Broken", "latitude": -100.0, "longitude": 69.0, "address": "Nowhere"},
                {"name": "Tower", "latitude": 41.3456, "longitude": 69.2856}
            ]"#,
        )
        .unwrap();

        let facilities = JsonCatalog::new(&path).load_all().await.unwrap();

        assert_eq!(facilities.len(), 2);
        assert_eq!(facilities[0].name, "Chorsu");
        assert_eq!(facilities[1].name, "Tower");
        assert_eq!(facilities[1].address, "");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = JsonCatalog::new("/nonexistent/parkings.json")
            .load_all()
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parkings.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonCatalog::new(&path).load_all().await.unwrap_err();
        assert!(matches!(err, CatalogError::Json { .. }));
    }
}
