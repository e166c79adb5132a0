//! Read-through cache over the Pocket Price API
//!
//! Owns one slot per resource type (services, categories), each holding a
//! TTL-bounded cache entry plus a last-known-good fallback. Reads are served
//! from a live entry when possible; otherwise the upstream API is consulted
//! and, on failure, the fallback is returned so a read never fails and never
//! observes partial data. One upstream outage degrades to stale data rather
//! than an empty or erroring display.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::ServiceSource;
use crate::cache::snapshot::SnapshotStore;
use crate::data::{Category, Service};

/// Snapshot key for the services fallback
const SERVICES_SNAPSHOT_KEY: &str = "services_fallback";

/// Snapshot key for the categories fallback
const CATEGORIES_SNAPSHOT_KEY: &str = "categories_fallback";

/// Default cache TTL in seconds (1 hour)
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// A cached collection with its fetch timestamp
///
/// Expiry is implicit: the entry is live while `now - fetched_at` stays
/// within the manager's TTL.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: Vec<T>,
    fetched_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn is_live(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.fetched_at) <= ttl
    }
}

/// Per-resource-type cache state
///
/// `entry` and `fallback` are always mutated together under one write guard,
/// so readers never observe a fetch that replaced one but not the other.
#[derive(Debug)]
struct Slot<T> {
    entry: Option<CacheEntry<T>>,
    fallback: Option<Vec<T>>,
}

impl<T> Slot<T> {
    fn new(fallback: Option<Vec<T>>) -> Self {
        Self {
            entry: None,
            fallback,
        }
    }
}

/// Per-resource counts reported after a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Number of services available after the refresh
    pub services: usize,
    /// Number of categories available after the refresh
    pub categories: usize,
}

/// Cache manager for service and price listings
///
/// Constructed once per process and shared behind an `Arc`; both the
/// on-demand read path and the periodic sync path go through the same
/// instance. Services and categories keep independent TTL and fallback
/// state. When a snapshot store is available, fallbacks are persisted to
/// disk on every successful fetch and re-loaded at construction, so
/// last-known-good data survives restarts during an upstream outage.
pub struct CacheManager<S> {
    api: S,
    ttl: Duration,
    services: RwLock<Slot<Service>>,
    categories: RwLock<Slot<Category>>,
    store: Option<SnapshotStore>,
}

impl<S: ServiceSource> CacheManager<S> {
    /// Creates a cache manager over the default XDG snapshot store
    pub fn new(api: S, ttl_secs: u64) -> Self {
        Self::with_store(api, ttl_secs, SnapshotStore::new())
    }

    /// Creates a cache manager with an explicit (or no) snapshot store
    ///
    /// In-memory fallbacks are seeded from the store's snapshots when
    /// present.
    pub fn with_store(api: S, ttl_secs: u64, store: Option<SnapshotStore>) -> Self {
        let services_fallback = store.as_ref().and_then(|s| s.load(SERVICES_SNAPSHOT_KEY));
        let categories_fallback = store.as_ref().and_then(|s| s.load(CATEGORIES_SNAPSHOT_KEY));

        if services_fallback.is_some() || categories_fallback.is_some() {
            debug!("seeded fallback data from disk snapshots");
        }

        Self {
            api,
            ttl: Duration::seconds(ttl_secs as i64),
            services: RwLock::new(Slot::new(services_fallback)),
            categories: RwLock::new(Slot::new(categories_fallback)),
            store,
        }
    }

    /// Returns the service listing
    ///
    /// Serves the live cache entry unless `force` is set or the entry has
    /// expired; otherwise fetches from the API. A failed fetch returns the
    /// last-known-good fallback (empty if no fetch ever succeeded) and is
    /// never surfaced to the caller.
    pub async fn get_services(&self, force: bool) -> Vec<Service> {
        if !force {
            let slot = self.services.read().await;
            if let Some(ref entry) = slot.entry {
                if entry.is_live(Utc::now(), self.ttl) {
                    return entry.value.clone();
                }
            }
        }

        match self.api.fetch_services().await {
            Ok(services) => {
                self.publish(&self.services, SERVICES_SNAPSHOT_KEY, services.clone())
                    .await;
                services
            }
            Err(err) => {
                warn!("service fetch failed, serving last known data: {err}");
                self.services
                    .read()
                    .await
                    .fallback
                    .clone()
                    .unwrap_or_default()
            }
        }
    }

    /// Returns the category listing
    ///
    /// Identical policy to [`get_services`](Self::get_services), with
    /// independent TTL and fallback state.
    pub async fn get_categories(&self, force: bool) -> Vec<Category> {
        if !force {
            let slot = self.categories.read().await;
            if let Some(ref entry) = slot.entry {
                if entry.is_live(Utc::now(), self.ttl) {
                    return entry.value.clone();
                }
            }
        }

        match self.api.fetch_categories().await {
            Ok(categories) => {
                self.publish(&self.categories, CATEGORIES_SNAPSHOT_KEY, categories.clone())
                    .await;
                categories
            }
            Err(err) => {
                warn!("category fetch failed, serving last known data: {err}");
                self.categories
                    .read()
                    .await
                    .fallback
                    .clone()
                    .unwrap_or_default()
            }
        }
    }

    /// Returns the first service with the given id, if any
    pub async fn get_service(&self, id: &str) -> Option<Service> {
        self.get_services(false)
            .await
            .into_iter()
            .find(|service| service.id == id)
    }

    /// Returns the services in the given category, preserving listing order
    pub async fn get_services_by_category(&self, category_id: &str) -> Vec<Service> {
        self.get_services(false)
            .await
            .into_iter()
            .filter(|service| service.category_id.as_deref() == Some(category_id))
            .collect()
    }

    /// Discards both cache entries
    ///
    /// Fallbacks are untouched; the next read fetches fresh data and still
    /// has last-known-good data to fall back on. Idempotent.
    pub async fn flush(&self) {
        self.services.write().await.entry = None;
        self.categories.write().await.entry = None;
    }

    /// Flushes and force-reloads both resource types
    ///
    /// Invoked by the periodic sync timer and by manual sync actions.
    /// Returns once both resources have been attempted; fetch failures are
    /// absorbed the same way as on the read path.
    pub async fn refresh(&self) -> SyncSummary {
        self.flush().await;
        let services = self.get_services(true).await;
        let categories = self.get_categories(true).await;
        SyncSummary {
            services: services.len(),
            categories: categories.len(),
        }
    }

    /// Discards entries, fallbacks and disk snapshots
    ///
    /// The uninstall/teardown path. After this the manager behaves as if no
    /// fetch ever succeeded.
    pub async fn purge(&self) {
        {
            let mut slot = self.services.write().await;
            slot.entry = None;
            slot.fallback = None;
        }
        {
            let mut slot = self.categories.write().await;
            slot.entry = None;
            slot.fallback = None;
        }

        if let Some(ref store) = self.store {
            for key in [SERVICES_SNAPSHOT_KEY, CATEGORIES_SNAPSHOT_KEY] {
                if let Err(err) = store.clear(key) {
                    warn!("failed to remove {key} snapshot: {err}");
                }
            }
        }
    }

    /// Publishes a successfully fetched collection
    ///
    /// Entry and fallback are replaced together under one write guard. The
    /// disk snapshot is written best-effort before the in-memory publish; a
    /// snapshot IO failure never affects the read path.
    async fn publish<T>(&self, lock: &RwLock<Slot<T>>, key: &str, value: Vec<T>)
    where
        T: Clone + Serialize,
    {
        if let Some(ref store) = self.store {
            if let Err(err) = store.save(key, &value) {
                warn!("failed to persist {key} snapshot: {err}");
            }
        }

        let mut slot = lock.write().await;
        slot.fallback = Some(value.clone());
        slot.entry = Some(CacheEntry {
            value,
            fetched_at: Utc::now(),
        });
    }
}
