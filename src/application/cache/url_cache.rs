//! Size-bounded durable key to URL cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::domain::entities::CacheKey;
use crate::domain::errors::StorageError;
use crate::domain::ports::{Bucket, DurableStoragePort};
use crate::domain::serde_utils::OrderedObject;
use crate::domain::services::ReliabilityPolicy;

/// Entry count above which the map is truncated.
pub const DEFAULT_MAX_ENTRIES: usize = 500;
/// Entries kept after truncation, and the most ever persisted.
pub const DEFAULT_RETAIN_ENTRIES: usize = 400;
/// Entries kept when storage reports its quota is exhausted.
pub const DEFAULT_RECOVERY_ENTRIES: usize = 200;

/// Size bounds of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    /// Entry count above which the map is truncated.
    pub max_entries: usize,
    /// Entries kept after truncation and the upper bound on persisted entries.
    pub retain_entries: usize,
    /// Entries kept after a quota failure.
    pub recovery_entries: usize,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            retain_entries: DEFAULT_RETAIN_ENTRIES,
            recovery_entries: DEFAULT_RECOVERY_ENTRIES,
        }
    }
}

/// Outcome of [`UrlCacheStore::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWrite {
    /// The URL was stored.
    Stored,
    /// The URL failed the reliability check and was not stored; the caller
    /// substitutes its own fallback.
    Rejected,
}

/// Key to URL map persisted to the [`Bucket::UrlCache`] bucket.
///
/// Reads use `peek` so the LRU order is write order: the front of the map
/// is always the most recently written entry. Eviction drops from the back.
pub struct UrlCacheStore {
    entries: Mutex<LruCache<CacheKey, String>>,
    storage: Arc<dyn DurableStoragePort>,
    policy: Arc<ReliabilityPolicy>,
    limits: CacheLimits,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl UrlCacheStore {
    /// Creates an empty store without touching storage.
    #[must_use]
    pub fn new(
        storage: Arc<dyn DurableStoragePort>,
        policy: Arc<ReliabilityPolicy>,
        limits: CacheLimits,
    ) -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
            storage,
            policy,
            limits,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a store and loads whatever storage holds.
    pub async fn open(
        storage: Arc<dyn DurableStoragePort>,
        policy: Arc<ReliabilityPolicy>,
        limits: CacheLimits,
    ) -> Self {
        let store = Self::new(storage, policy, limits);
        let loaded = store.load_all().await;
        info!(entries = loaded, "Image URL cache opened");
        store
    }

    /// Replaces the in-memory map with the persisted one.
    ///
    /// Corrupt or non-object contents count as empty. Entries with a stale
    /// version tag or an unreliable URL are dropped. Returns the number of
    /// entries kept.
    pub async fn load_all(&self) -> usize {
        let raw = match self.storage.read(Bucket::UrlCache).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return 0,
            Err(e) => {
                warn!(error = %e, "Failed to read image cache, starting empty");
                return 0;
            }
        };

        let object = match serde_json::from_str::<OrderedObject>(&raw) {
            Ok(object) => object,
            Err(e) => {
                warn!(error = %e, "Discarding corrupt image cache");
                return 0;
            }
        };

        let mut dropped = object.len();
        let mut entries = self.entries.lock();
        entries.clear();

        for (raw_key, url) in object.string_members() {
            let Some(key) = CacheKey::parse(raw_key).filter(CacheKey::is_current) else {
                trace!(key = raw_key, "Dropping cache entry with stale key");
                continue;
            };
            if !self.policy.is_reliable(Some(url)) {
                trace!(key = %key, url, "Dropping unreliable cache entry");
                continue;
            }
            entries.put(key, url.to_string());
            dropped -= 1;
        }

        truncate(&mut entries, self.limits.max_entries, self.limits.retain_entries);

        if dropped > 0 {
            debug!(dropped, "Dropped invalid entries while loading image cache");
        }
        entries.len()
    }

    /// Looks up a key without changing its eviction order.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let entries = self.entries.lock();
        if let Some(url) = entries.peek(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Image cache hit");
            Some(url.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Image cache miss");
            None
        }
    }

    /// Returns true if the key is cached. Does not count as a hit or miss.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().contains(key)
    }

    /// Stores a URL and persists the map.
    ///
    /// URLs failing the reliability check are never stored.
    pub async fn set(&self, key: &CacheKey, url: &str) -> CacheWrite {
        let url = url.trim();
        if !self.policy.is_reliable(Some(url)) {
            warn!(key = %key, url, "Refusing to cache unreliable URL");
            return CacheWrite::Rejected;
        }

        {
            let mut entries = self.entries.lock();
            entries.put(key.clone(), url.to_string());
            truncate(&mut entries, self.limits.max_entries, self.limits.retain_entries);
        }
        debug!(key = %key, url, "Cached image URL");

        self.persist_all().await;
        CacheWrite::Stored
    }

    /// Writes the newest entries to storage.
    ///
    /// On a quota failure the map shrinks to the recovery size and the write
    /// is retried once. If that fails too, the write is abandoned and memory
    /// stays authoritative. Returns true if storage is up to date.
    pub async fn persist_all(&self) -> bool {
        match self.write_snapshot(self.limits.retain_entries).await {
            Ok(()) => true,
            Err(e) if e.is_quota_exceeded() => {
                warn!(
                    error = %e,
                    keep = self.limits.recovery_entries,
                    "Storage quota exceeded, shrinking image cache"
                );
                {
                    let mut entries = self.entries.lock();
                    truncate(&mut entries, self.limits.recovery_entries, self.limits.recovery_entries);
                }
                match self.write_snapshot(self.limits.recovery_entries).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!(error = %e, "Abandoning image cache persistence after retry");
                        false
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist image cache");
                false
            }
        }
    }

    /// Empties memory and storage.
    pub async fn clear(&self) {
        self.entries.lock().clear();
        if let Err(e) = self.storage.remove(Bucket::UrlCache).await {
            warn!(error = %e, "Failed to remove persisted image cache");
        }
        info!("Cleared image URL cache");
    }

    /// Flushes the map before the store is dropped.
    pub async fn close(&self) {
        if self.persist_all().await {
            debug!(entries = self.len(), "Image URL cache closed");
        }
    }

    /// Number of entries in memory.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size bounds in effect.
    #[must_use]
    pub const fn limits(&self) -> CacheLimits {
        self.limits
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }

    async fn write_snapshot(&self, limit: usize) -> Result<(), StorageError> {
        let contents = {
            let entries = self.entries.lock();
            // Newest first in the LRU, oldest first on disk.
            let mut newest: Vec<(&CacheKey, &String)> = entries.iter().take(limit).collect();
            newest.reverse();
            let object = OrderedObject::from_pairs(
                newest.into_iter().map(|(k, v)| (k.as_str(), v.as_str())),
            );
            serde_json::to_string(&object)?
        };
        self.storage.write(Bucket::UrlCache, &contents).await
    }
}

impl std::fmt::Debug for UrlCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlCacheStore")
            .field("limits", &self.limits)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Drops the oldest entries down to `keep` once the map grows past `max`.
fn truncate(entries: &mut LruCache<CacheKey, String>, max: usize, keep: usize) {
    if entries.len() <= max {
        return;
    }
    let before = entries.len();
    while entries.len() > keep {
        entries.pop_lru();
    }
    debug!(before, after = entries.len(), "Evicted oldest image cache entries");
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached URLs.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} urls, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockStorage;

    fn store_with(storage: Arc<MockStorage>) -> UrlCacheStore {
        UrlCacheStore::new(
            storage,
            Arc::new(ReliabilityPolicy::default()),
            CacheLimits::default(),
        )
    }

    fn key(i: usize) -> CacheKey {
        CacheKey::new("make", &format!("model{i}"))
    }

    fn url(i: usize) -> String {
        format!("https://img.example.org/{i}.jpg")
    }

    fn persisted(storage: &MockStorage) -> OrderedObject {
        serde_json::from_str(&storage.contents(Bucket::UrlCache).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let storage = Arc::new(MockStorage::new());
        let store = store_with(storage.clone());

        assert_eq!(store.set(&key(1), &url(1)).await, CacheWrite::Stored);
        assert_eq!(store.get(&key(1)), Some(url(1)));
        assert!(store.get(&key(2)).is_none());
        assert_eq!(persisted(&storage).len(), 1);
    }

    #[tokio::test]
    async fn test_set_rejects_unreliable_url() {
        let storage = Arc::new(MockStorage::new());
        let store = store_with(storage.clone());

        let result = store
            .set(&key(1), "https://via.placeholder.com/300.png")
            .await;

        assert_eq!(result, CacheWrite::Rejected);
        assert!(store.is_empty());
        assert_eq!(storage.writes(), 0);
    }

    #[tokio::test]
    async fn test_writing_600_keys_persists_at_most_400() {
        let storage = Arc::new(MockStorage::new());
        let store = store_with(storage.clone());

        for i in 0..600 {
            store.set(&key(i), &url(i)).await;
        }

        let object = persisted(&storage);
        assert!(object.len() <= DEFAULT_RETAIN_ENTRIES);
        assert!(store.len() <= DEFAULT_MAX_ENTRIES);
        // The newest write always survives, the oldest never does.
        assert_eq!(store.get(&key(599)), Some(url(599)));
        assert!(store.get(&key(0)).is_none());
        assert_eq!(
            object.string_members().last(),
            Some((key(599).as_str(), url(599).as_str()))
        );
    }

    #[tokio::test]
    async fn test_truncates_when_exceeding_max() {
        let storage = Arc::new(MockStorage::new());
        let store = store_with(storage);

        for i in 0..=DEFAULT_MAX_ENTRIES {
            store.set(&key(i), &url(i)).await;
        }

        assert_eq!(store.len(), DEFAULT_RETAIN_ENTRIES);
        assert!(store.contains(&key(DEFAULT_MAX_ENTRIES)));
        assert!(!store.contains(&key(DEFAULT_MAX_ENTRIES - DEFAULT_RETAIN_ENTRIES)));
    }

    #[tokio::test]
    async fn test_rewrite_refreshes_recency() {
        let storage = Arc::new(MockStorage::new());
        let limits = CacheLimits {
            max_entries: 3,
            retain_entries: 2,
            recovery_entries: 1,
        };
        let store = UrlCacheStore::new(storage, Arc::new(ReliabilityPolicy::default()), limits);

        store.set(&key(1), &url(1)).await;
        store.set(&key(2), &url(2)).await;
        store.set(&key(3), &url(3)).await;
        store.set(&key(1), &url(1)).await;
        store.set(&key(4), &url(4)).await;

        assert!(store.contains(&key(1)));
        assert!(store.contains(&key(4)));
        assert!(!store.contains(&key(2)));
    }

    #[tokio::test]
    async fn test_get_does_not_refresh_recency() {
        let storage = Arc::new(MockStorage::new());
        let limits = CacheLimits {
            max_entries: 2,
            retain_entries: 2,
            recovery_entries: 1,
        };
        let store = UrlCacheStore::new(storage, Arc::new(ReliabilityPolicy::default()), limits);

        store.set(&key(1), &url(1)).await;
        store.set(&key(2), &url(2)).await;
        let _ = store.get(&key(1));
        store.set(&key(3), &url(3)).await;

        assert!(!store.contains(&key(1)));
    }

    #[tokio::test]
    async fn test_load_discards_corrupt_content() {
        for raw in ["{not json", "[1,2,3]", "\"string\"", "null", "42"] {
            let storage = Arc::new(MockStorage::new());
            storage.seed(Bucket::UrlCache, raw);
            let store = store_with(storage);

            assert_eq!(store.load_all().await, 0, "content {raw:?}");
        }
    }

    #[tokio::test]
    async fn test_load_revalidates_entries() {
        let storage = Arc::new(MockStorage::new());
        let good = CacheKey::new("toyota", "camry");
        let bad_url = CacheKey::new("honda", "civic");
        let stale = CacheKey::with_version("ford", "focus", "v1");
        storage.seed(
            Bucket::UrlCache,
            format!(
                r#"{{"{good}": "https://img.example.org/camry.jpg",
                    "{bad_url}": "https://via.placeholder.com/a.png",
                    "{stale}": "https://img.example.org/focus.jpg",
                    "untagged": "https://img.example.org/x.jpg",
                    "v4:number": 7}}"#
            ),
        );

        let store = store_with(storage);
        assert_eq!(store.load_all().await, 1);
        assert_eq!(
            store.get(&good).as_deref(),
            Some("https://img.example.org/camry.jpg")
        );
        assert!(store.get(&bad_url).is_none());
    }

    #[tokio::test]
    async fn test_persist_and_reload_keeps_order() {
        let storage = Arc::new(MockStorage::new());
        let limits = CacheLimits {
            max_entries: 3,
            retain_entries: 2,
            recovery_entries: 1,
        };
        let policy = Arc::new(ReliabilityPolicy::default());
        let store = UrlCacheStore::new(storage.clone(), policy.clone(), limits);
        for i in 0..3 {
            store.set(&key(i), &url(i)).await;
        }
        drop(store);

        let tighter = CacheLimits {
            max_entries: 2,
            ..limits
        };
        let reopened = UrlCacheStore::open(storage, policy, tighter).await;
        assert_eq!(reopened.len(), 2);
        reopened.set(&key(10), &url(10)).await;

        // key 1 was the oldest survivor, so it goes first.
        assert!(!reopened.contains(&key(1)));
        assert!(reopened.contains(&key(2)));
        assert!(reopened.contains(&key(10)));
    }

    #[tokio::test]
    async fn test_quota_failure_shrinks_and_retries() {
        let storage = Arc::new(MockStorage::new());
        let store = store_with(storage.clone());
        for i in 0..300 {
            store.set(&key(i), &url(i)).await;
        }

        assert_eq!(persisted(&storage).len(), 300);

        let full = storage.contents(Bucket::UrlCache).unwrap().len() as u64;
        storage.set_quota(Some(full * 3 / 4));

        assert_eq!(store.set(&key(300), &url(300)).await, CacheWrite::Stored);

        assert_eq!(store.len(), DEFAULT_RECOVERY_ENTRIES);
        assert_eq!(persisted(&storage).len(), DEFAULT_RECOVERY_ENTRIES);
        assert_eq!(storage.failed_writes(), 1);
        assert!(store.contains(&key(300)));
    }

    #[tokio::test]
    async fn test_quota_failure_twice_keeps_memory() {
        let storage = Arc::new(MockStorage::with_quota(10));
        let store = store_with(storage.clone());

        assert_eq!(store.set(&key(1), &url(1)).await, CacheWrite::Stored);

        assert_eq!(store.get(&key(1)), Some(url(1)));
        assert!(storage.contents(Bucket::UrlCache).is_none());
        assert_eq!(storage.failed_writes(), 2);
    }

    #[tokio::test]
    async fn test_clear_empties_memory_and_storage() {
        let storage = Arc::new(MockStorage::new());
        let store = store_with(storage.clone());
        store.set(&key(1), &url(1)).await;

        store.clear().await;

        assert!(store.is_empty());
        assert!(storage.contents(Bucket::UrlCache).is_none());
    }

    #[tokio::test]
    async fn test_read_failure_starts_empty() {
        let storage = Arc::new(MockStorage::new());
        storage.seed(Bucket::UrlCache, "{}");
        storage.set_fail_reads(true);

        let store = store_with(storage);
        assert_eq!(store.load_all().await, 0);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = store_with(Arc::new(MockStorage::new()));
        store.set(&key(1), &url(1)).await;

        let _ = store.get(&key(1));
        let _ = store.get(&key(2));

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }
}
