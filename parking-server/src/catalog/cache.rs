//! In-memory caching layer for the facility catalog.
//!
//! The catalog is read-only and changes rarely, so a short TTL avoids a
//! database read per search while still picking up edits eventually.
//! Concurrent misses share a single load. Failed loads are not cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::Facility;

use super::error::CatalogError;
use super::FacilityCatalog;

/// Cached catalog snapshot.
type CatalogEntry = Arc<Vec<Facility>>;

/// Configuration for the catalog cache.
#[derive(Debug, Clone)]
pub struct CatalogCacheConfig {
    /// How long a loaded snapshot is served before reloading.
    pub ttl: Duration,
}

impl Default for CatalogCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
        }
    }
}

/// Catalog wrapper that serves a cached snapshot of its inner catalog.
pub struct CachedCatalog<C> {
    inner: C,
    snapshot: MokaCache<(), CatalogEntry>,
}

impl<C: FacilityCatalog> CachedCatalog<C> {
    /// Wrap a catalog with the given cache configuration.
    pub fn new(inner: C, config: &CatalogCacheConfig) -> Self {
        let snapshot = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();

        Self { inner, snapshot }
    }

    /// Access the wrapped catalog.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Drop the cached snapshot so the next load hits the inner catalog.
    pub async fn invalidate(&self) {
        self.snapshot.invalidate(&()).await;
    }
}

impl<C: FacilityCatalog> FacilityCatalog for CachedCatalog<C> {
    async fn load_all(&self) -> Result<Arc<Vec<Facility>>, CatalogError> {
        self.snapshot
            .try_get_with((), async {
                let facilities = self.inner.load_all().await?;
                debug!(facilities = facilities.len(), "Loaded facility catalog");
                Ok::<_, CatalogError>(facilities)
            })
            .await
            .map_err(|e| Arc::try_unwrap(e).unwrap_or_else(CatalogError::Shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Catalog that counts loads and can be switched into failure mode.
    struct CountingCatalog {
        loads: AtomicUsize,
        failing: AtomicBool,
    }

    impl CountingCatalog {
        fn new() -> Self {
            Self {
                loads: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }
        }
    }

    impl FacilityCatalog for CountingCatalog {
        async fn load_all(&self) -> Result<Arc<Vec<Facility>>, CatalogError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.failing.load(Ordering::SeqCst) {
                return Err(CatalogError::Query(rusqlite::Error::QueryReturnedNoRows));
            }
            Ok(Arc::new(vec![Facility::new(
                "Only",
                Coordinate::new(41.0, 69.0).unwrap(),
                "Somewhere",
            )]))
        }
    }

    #[test]
    fn default_config() {
        assert_eq!(CatalogCacheConfig::default().ttl, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn second_load_is_served_from_cache() {
        let cached = CachedCatalog::new(CountingCatalog::new(), &CatalogCacheConfig::default());

        let first = cached.load_all().await.unwrap();
        let second = cached.load_all().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cached.inner().loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cached = CachedCatalog::new(CountingCatalog::new(), &CatalogCacheConfig::default());
        cached.inner().failing.store(true, Ordering::SeqCst);

        assert!(cached.load_all().await.is_err());

        cached.inner().failing.store(false, Ordering::SeqCst);
        assert_eq!(cached.load_all().await.unwrap().len(), 1);
        assert_eq!(cached.inner().loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_load() {
        let cached = CachedCatalog::new(CountingCatalog::new(), &CatalogCacheConfig::default());

        let loads = futures::future::join_all((0..8).map(|_| cached.load_all())).await;

        assert!(loads.iter().all(|r| r.as_ref().is_ok_and(|f| f.len() == 1)));
        assert_eq!(cached.inner().loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_failures_are_reported_to_every_caller() {
        let cached = CachedCatalog::new(CountingCatalog::new(), &CatalogCacheConfig::default());
        cached.inner().failing.store(true, Ordering::SeqCst);

        let loads = futures::future::join_all((0..4).map(|_| cached.load_all())).await;

        assert!(loads.iter().all(Result::is_err));
        assert_eq!(cached.inner().loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let cached = CachedCatalog::new(CountingCatalog::new(), &CatalogCacheConfig::default());

        cached.load_all().await.unwrap();
        cached.invalidate().await;
        cached.load_all().await.unwrap();

        assert_eq!(cached.inner().loads.load(Ordering::SeqCst), 2);
    }
}
