//! SQLite-backed facility catalog.
//!
//! Reads the `parkings` table:
//!
//! ```sql
//! CREATE TABLE parkings (name TEXT, latitude REAL, longitude REAL, address TEXT);
//! ```
//!
//! Coordinates stored as TEXT are accepted as long as they parse as numbers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};

use crate::domain::Facility;

use super::error::CatalogError;
use super::{FacilityCatalog, FacilityRow, collect_valid};

const SELECT_PARKINGS: &str = "SELECT name, latitude, longitude, address FROM parkings";

/// Read-only catalog over a SQLite database file.
///
/// A fresh connection is opened for every load on the blocking thread pool;
/// `rusqlite::Connection` is not `Sync` and loads are infrequent once the
/// catalog is wrapped in a [`CachedCatalog`](super::CachedCatalog).
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    path: PathBuf,
}

impl SqliteCatalog {
    /// Create a catalog reading from the given database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying database.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FacilityCatalog for SqliteCatalog {
    async fn load_all(&self) -> Result<Arc<Vec<Facility>>, CatalogError> {
        let path = self.path.clone();
        let rows = tokio::task::spawn_blocking(move || read_rows(&path)).await??;
        Ok(Arc::new(collect_valid(rows)))
    }
}

fn read_rows(path: &Path) -> Result<Vec<FacilityRow>, CatalogError> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
        |source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        },
    )?;

    let mut stmt = conn.prepare(SELECT_PARKINGS)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(FacilityRow {
                name: column_text(row, 0)?,
                latitude: column_f64(row, 1)?,
                longitude: column_f64(row, 2)?,
                address: column_text(row, 3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Read a numeric column, accepting REAL, INTEGER or numeric TEXT.
///
/// Unreadable cells (NULL, BLOB, non-numeric text) come back as NaN so the
/// row is rejected by coordinate validation instead of failing the load.
fn column_f64(row: &Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Real(v) => v,
        ValueRef::Integer(v) => v as f64,
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN),
        ValueRef::Null | ValueRef::Blob(_) => f64::NAN,
    })
}

/// Read a text column; NULL and BLOB read as empty, numbers as their text.
fn column_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Null | ValueRef::Blob(_) => String::new(),
    })
}
