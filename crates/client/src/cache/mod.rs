//! Client-side query cache.
//!
//! Caches API reads using `moka`, keyed by the canonical string form of a
//! [`CacheKey`]. Entries expire after the configured time-to-live; mutations
//! can additionally mark entries stale, which forces a refetch on the next
//! read while keeping the old value readable through [`QueryCache::peek`].

mod key;

pub use key::{CacheKey, CacheValue, Cached, ResourceKind};

use std::future::Future;
use std::time::{Duration, Instant};

use moka::future::Cache;
use tracing::debug;

use crate::error::ApiError;

/// A cached value and its freshness.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: CacheValue,
    pub fetched_at: Instant,
    /// Must be refetched before it is served again.
    pub stale: bool,
}

impl CacheEntry {
    fn fresh(value: CacheValue) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            stale: false,
        }
    }
}

/// Shared query cache. Cheap to clone; clones share entries.
#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<String, CacheEntry>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl QueryCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { entries }
    }

    /// Return the fresh cached value for `key`, or run `fetch` and cache its
    /// result.
    ///
    /// A failed fetch leaves any previous entry untouched.
    ///
    /// # Errors
    ///
    /// Returns whatever `fetch` returns.
    pub async fn fetch<T, F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<T, ApiError>
    where
        T: Cached,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let canonical = key.canonical();

        if let Some(entry) = self.entries.get(&canonical).await
            && !entry.stale
            && let Some(value) = T::from_value(&entry.value)
        {
            debug!(key = %canonical, "Cache hit");
            return Ok(value);
        }

        debug!(key = %canonical, "Cache miss");
        let value = fetch().await?;
        self.entries
            .insert(canonical, CacheEntry::fresh(value.clone().into_value()))
            .await;
        Ok(value)
    }

    /// Cached value for `key`, stale or not, without fetching.
    pub async fn peek<T: Cached>(&self, key: &CacheKey) -> Option<T> {
        self.entries
            .get(&key.canonical())
            .await
            .and_then(|entry| T::from_value(&entry.value))
    }

    /// Raw entry for `key`.
    pub async fn entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(&key.canonical()).await
    }

    /// Store a fresh value under `key`, replacing any previous entry.
    pub async fn set<T: Cached>(&self, key: &CacheKey, value: T) {
        self.entries
            .insert(key.canonical(), CacheEntry::fresh(value.into_value()))
            .await;
    }

    /// Mark the entry for `key` stale, if present.
    pub async fn mark_stale(&self, key: &CacheKey) {
        let canonical = key.canonical();
        if let Some(mut entry) = self.entries.get(&canonical).await {
            entry.stale = true;
            self.entries.insert(canonical, entry).await;
        }
    }

    /// Mark every cached list of `kind` stale.
    pub async fn invalidate_lists(&self, kind: ResourceKind) {
        self.entries.run_pending_tasks().await;

        let prefix = kind.list_prefix();
        let lists: Vec<(String, CacheEntry)> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, entry)| ((*key).clone(), entry))
            .collect();

        debug!(prefix, count = lists.len(), "Marking cached lists stale");
        for (key, mut entry) in lists {
            entry.stale = true;
            self.entries.insert(key, entry).await;
        }
    }

    /// Drop the entry for `key`.
    pub async fn remove(&self, key: &CacheKey) {
        self.entries.invalidate(&key.canonical()).await;
    }

    /// Drop the entry for `key` and every sub-entry keyed under it.
    pub async fn remove_subtree(&self, key: &CacheKey) {
        self.entries.run_pending_tasks().await;

        let root = key.canonical();
        let nested = format!("{root}:");
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(k, _)| k.as_str() == root || k.starts_with(&nested))
            .map(|(k, _)| (*k).clone())
            .collect();

        debug!(key = %root, count = doomed.len(), "Removing cached record");
        for k in doomed {
            self.entries.invalidate(&k).await;
        }
    }

    /// Drop everything.
    pub async fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
        debug!("Cache cleared");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::QueryParams;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tenantdesk_core::{Page, Storefront, StorefrontId, Tenant, TenantId, TenantStats};

    fn cache() -> QueryCache {
        QueryCache::new(100, Duration::from_secs(300))
    }

    fn stats(products: u64) -> TenantStats {
        TenantStats {
            products_count: products,
            orders_count: 0,
            storage_used_mb: 0.0,
        }
    }

    #[tokio::test]
    async fn test_fresh_entry_skips_fetch() {
        let cache = cache();
        let key = CacheKey::TenantStats(TenantId::from(1_i64));
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..3 {
            let value: TenantStats = cache
                .fetch(&key, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(stats(4))
                })
                .await
                .unwrap();
            assert_eq!(value.products_count, 4);
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched_but_still_peekable() {
        let cache = cache();
        let key = CacheKey::TenantStats(TenantId::from(1_i64));
        cache.set(&key, stats(1)).await;
        cache.mark_stale(&key).await;

        assert_eq!(cache.peek::<TenantStats>(&key).await.unwrap().products_count, 1);

        let value: TenantStats = cache.fetch(&key, || async { Ok(stats(2)) }).await.unwrap();
        assert_eq!(value.products_count, 2);
        assert!(!cache.entry(&key).await.unwrap().stale);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_entry() {
        let cache = cache();
        let key = CacheKey::TenantStats(TenantId::from(1_i64));
        cache.set(&key, stats(1)).await;
        cache.mark_stale(&key).await;
        let before = cache.entry(&key).await.unwrap();

        let result = cache
            .fetch::<TenantStats, _, _>(&key, || async {
                Err(ApiError::from_response(500, serde_json::json!({})))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(cache.entry(&key).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_invalidate_lists_only_touches_that_kind() {
        let cache = cache();
        let tenants_a = CacheKey::TenantList(QueryParams::new());
        let tenants_b = CacheKey::TenantList(QueryParams::new().with("page", 2_i64));
        let storefronts = CacheKey::StorefrontList(QueryParams::new());
        let detail = CacheKey::TenantStats(TenantId::from(1_i64));

        cache.set(&tenants_a, Page::<Tenant>::default()).await;
        cache.set(&tenants_b, Page::<Tenant>::default()).await;
        cache
            .set(&storefronts, Page::<Storefront>::default())
            .await;
        cache.set(&detail, stats(1)).await;

        cache.invalidate_lists(ResourceKind::Tenants).await;

        assert!(cache.entry(&tenants_a).await.unwrap().stale);
        assert!(cache.entry(&tenants_b).await.unwrap().stale);
        assert!(!cache.entry(&storefronts).await.unwrap().stale);
        assert!(!cache.entry(&detail).await.unwrap().stale);
    }

    #[tokio::test]
    async fn test_remove_subtree_drops_sub_entries() {
        let cache = cache();
        let id = StorefrontId::from(3_i64);
        let other = StorefrontId::from(33_i64);

        cache.set(&CacheKey::StorefrontTheme(id.clone()), stats(1)).await;
        cache
            .set(&CacheKey::StorefrontSettings(id.clone()), stats(1))
            .await;
        cache
            .set(&CacheKey::StorefrontSettings(other.clone()), stats(2))
            .await;

        cache.remove_subtree(&CacheKey::StorefrontDetail(id.clone())).await;

        assert!(cache.entry(&CacheKey::StorefrontTheme(id.clone())).await.is_none());
        assert!(cache.entry(&CacheKey::StorefrontSettings(id)).await.is_none());
        // "3" is a prefix of "33" but not a parent key
        assert!(cache.entry(&CacheKey::StorefrontSettings(other)).await.is_some());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = cache();
        let key = CacheKey::TenantStats(TenantId::from(1_i64));
        cache.set(&key, stats(1)).await;
        cache.clear().await;
        assert!(cache.entry(&key).await.is_none());
    }
}
