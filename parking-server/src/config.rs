//! Process configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `PARKING_DATABASE` | `parkings.db` |
//! | `PARKING_CATALOG_JSON` | unset (overrides the database when set) |
//! | `OSRM_BASE_URL` | `http://router.project-osrm.org` |
//! | `SEARCH_RADIUS_KM` | `5` |
//! | `ROUTE_TIMEOUT_SECS` | `5` |
//! | `ROUTE_ATTEMPTS` | `1` |
//! | `MAX_CONCURRENT_ROUTES` | `8` |
//! | `SESSION_CAPACITY` | `10000` |
//! | `SESSION_IDLE_SECS` | `86400` |
//! | `CATALOG_TTL_SECS` | `300` |
//! | `BIND_ADDR` | `127.0.0.1:3000` |

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::catalog::{CatalogBackend, CatalogCacheConfig, JsonCatalog, SqliteCatalog};
use crate::routing::OsrmConfig;
use crate::search::SearchConfig;
use crate::session::SessionConfig;

const DEFAULT_DATABASE: &str = "parkings.db";
const DEFAULT_OSRM_BASE_URL: &str = "http://router.project-osrm.org";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Upper bound for every duration variable (ten years).
const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Upper bound for the per-search routing fan-out.
const MAX_CONCURRENT_ROUTES: usize = 1024;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {name} ({value:?}): {reason}")]
pub struct ConfigError {
    name: &'static str,
    value: String,
    reason: String,
}

/// Where the facility catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Sqlite(PathBuf),
    Json(PathBuf),
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog: CatalogSource,
    pub catalog_cache: CatalogCacheConfig,
    pub osrm_base_url: String,
    pub search: SearchConfig,
    pub session: SessionConfig,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let catalog = match lookup("PARKING_CATALOG_JSON").filter(|s| !s.is_empty()) {
            Some(path) => CatalogSource::Json(path.into()),
            None => CatalogSource::Sqlite(
                lookup("PARKING_DATABASE")
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
                    .into(),
            ),
        };

        let radius_km: f64 = parse_var(&lookup, "SEARCH_RADIUS_KM", 5.0)?;
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(invalid("SEARCH_RADIUS_KM", radius_km, "must be a non-negative number"));
        }

        let route_timeout = parse_secs(&lookup, "ROUTE_TIMEOUT_SECS", 5)?;
        if route_timeout.is_zero() {
            return Err(invalid("ROUTE_TIMEOUT_SECS", 0, "must be positive"));
        }

        let max_concurrent: usize = parse_var(&lookup, "MAX_CONCURRENT_ROUTES", 8)?;
        if !(1..=MAX_CONCURRENT_ROUTES).contains(&max_concurrent) {
            return Err(invalid(
                "MAX_CONCURRENT_ROUTES",
                max_concurrent,
                format!("must be between 1 and {MAX_CONCURRENT_ROUTES}"),
            ));
        }

        let search = SearchConfig::new(
            radius_km,
            max_concurrent,
            route_timeout,
            parse_var(&lookup, "ROUTE_ATTEMPTS", 1)?,
        );

        let session = SessionConfig {
            max_capacity: parse_var(&lookup, "SESSION_CAPACITY", 10_000)?,
            time_to_idle: parse_secs(&lookup, "SESSION_IDLE_SECS", 86_400)?,
        };

        let catalog_cache = CatalogCacheConfig {
            ttl: parse_secs(&lookup, "CATALOG_TTL_SECS", 300)?,
        };

        let bind_addr = match lookup("BIND_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|e| invalid("BIND_ADDR", &value, e))?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e| invalid("BIND_ADDR", DEFAULT_BIND_ADDR, e))?,
        };

        Ok(Self {
            catalog,
            catalog_cache,
            osrm_base_url: lookup("OSRM_BASE_URL")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_OSRM_BASE_URL.to_string()),
            search,
            session,
            bind_addr,
        })
    }

    /// Build the configured catalog backend.
    pub fn catalog_backend(&self) -> CatalogBackend {
        match &self.catalog {
            CatalogSource::Sqlite(path) => CatalogBackend::Sqlite(SqliteCatalog::new(path)),
            CatalogSource::Json(path) => CatalogBackend::Json(JsonCatalog::new(path)),
        }
    }

    /// OSRM client configuration.
    ///
    /// The HTTP timeout matches the per-call route timeout; the process-wide
    /// request limit is a small multiple of the per-search fan-out.
    pub fn osrm_config(&self) -> OsrmConfig {
        OsrmConfig::new(&self.osrm_base_url)
            .with_timeout(self.search.route_timeout)
            .with_max_concurrent(self.search.max_concurrent_routes.saturating_mul(4))
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|e| invalid(name, &value, e)),
        None => Ok(default),
    }
}

/// A whole number of seconds, at most ten years.
fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    let secs: u64 = parse_var(lookup, name, default_secs)?;
    if secs > MAX_DURATION_SECS {
        return Err(invalid(
            name,
            secs,
            format!("must be at most {MAX_DURATION_SECS} seconds"),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn invalid(name: &'static str, value: impl Display, reason: impl Display) -> ConfigError {
    ConfigError {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
