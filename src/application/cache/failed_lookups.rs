//! Negative cache of keys whose remote lookup came back empty.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::domain::entities::CacheKey;
use crate::domain::ports::{Bucket, DurableStoragePort};

/// Set of keys the external search has already failed for.
///
/// Held in memory for the session and mirrored to the
/// [`Bucket::FailedLookups`] bucket on a best-effort basis.
pub struct FailedLookupRegistry {
    keys: RwLock<HashSet<CacheKey>>,
    storage: Arc<dyn DurableStoragePort>,
}

impl FailedLookupRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStoragePort>) -> Self {
        Self {
            keys: RwLock::new(HashSet::new()),
            storage,
        }
    }

    /// Creates a registry, restoring the mirrored set when `restore` is set.
    pub async fn open(storage: Arc<dyn DurableStoragePort>, restore: bool) -> Self {
        let registry = Self::new(storage);
        if restore {
            registry.restore().await;
        }
        registry
    }

    /// Loads the mirrored set. Corrupt contents count as empty.
    pub async fn restore(&self) -> usize {
        let raw = match self.storage.read(Bucket::FailedLookups).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return 0,
            Err(e) => {
                warn!(error = %e, "Failed to read failed-lookup marks");
                return 0;
            }
        };

        let restored: HashSet<CacheKey> = match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(keys) => keys
                .iter()
                .filter_map(|raw| CacheKey::parse(raw))
                .filter(CacheKey::is_current)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Discarding corrupt failed-lookup marks");
                HashSet::new()
            }
        };

        let count = restored.len();
        *self.keys.write() = restored;
        debug!(count, "Restored failed-lookup marks");
        count
    }

    /// Returns true if the remote lookup already failed for this key.
    pub fn has_failed(&self, key: &CacheKey) -> bool {
        self.keys.read().contains(key)
    }

    /// Marks a key as failed and mirrors the set.
    pub async fn mark_failed(&self, key: &CacheKey) {
        let inserted = self.keys.write().insert(key.clone());
        if !inserted {
            return;
        }
        debug!(key = %key, "Marked lookup as failed");
        self.mirror().await;
    }

    /// Forgets every mark, in memory and in storage.
    pub async fn clear(&self) {
        self.keys.write().clear();
        if let Err(e) = self.storage.remove(Bucket::FailedLookups).await {
            warn!(error = %e, "Failed to remove failed-lookup marks");
        }
    }

    /// Number of marked keys.
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    /// Returns true if no key is marked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn mirror(&self) {
        let contents = {
            let keys = self.keys.read();
            let mut sorted: Vec<&str> = keys.iter().map(CacheKey::as_str).collect();
            sorted.sort_unstable();
            serde_json::to_string(&sorted)
        };

        let result = match contents {
            Ok(contents) => self.storage.write(Bucket::FailedLookups, &contents).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to mirror failed-lookup marks");
        }
    }
}

impl std::fmt::Debug for FailedLookupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailedLookupRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockStorage;

    #[tokio::test]
    async fn test_mark_and_check() {
        let storage = Arc::new(MockStorage::new());
        let registry = FailedLookupRegistry::new(storage.clone());
        let key = CacheKey::new("Toyota", "Camry");

        assert!(!registry.has_failed(&key));
        registry.mark_failed(&key).await;
        assert!(registry.has_failed(&key));
        assert!(registry.has_failed(&CacheKey::new("toyota ", "CAMRY")));

        assert_eq!(
            storage.contents(Bucket::FailedLookups).as_deref(),
            Some(r#"["v4:toyota/camry"]"#)
        );
    }

    #[tokio::test]
    async fn test_repeat_mark_does_not_rewrite() {
        let storage = Arc::new(MockStorage::new());
        let registry = FailedLookupRegistry::new(storage.clone());
        let key = CacheKey::new("Toyota", "Camry");

        registry.mark_failed(&key).await;
        registry.mark_failed(&key).await;

        assert_eq!(storage.writes(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let storage = Arc::new(MockStorage::new());
        let registry = FailedLookupRegistry::new(storage.clone());
        registry.mark_failed(&CacheKey::new("a", "b")).await;

        registry.clear().await;

        assert!(registry.is_empty());
        assert!(storage.contents(Bucket::FailedLookups).is_none());
    }

    #[tokio::test]
    async fn test_restore_only_when_requested() {
        let storage = Arc::new(MockStorage::new());
        storage.seed(
            Bucket::FailedLookups,
            r#"["v4:toyota/camry", "v3:toyota-camry", "junk"]"#,
        );

        let fresh = FailedLookupRegistry::open(storage.clone(), false).await;
        assert!(fresh.is_empty());

        let restored = FailedLookupRegistry::open(storage, true).await;
        assert_eq!(restored.len(), 1);
        assert!(restored.has_failed(&CacheKey::new("toyota", "camry")));
    }

    #[tokio::test]
    async fn test_restore_tolerates_corruption() {
        let storage = Arc::new(MockStorage::new());
        storage.seed(Bucket::FailedLookups, r#"{"not": "a list"}"#);

        let registry = FailedLookupRegistry::open(storage, true).await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_mirror_failure_keeps_mark() {
        let storage = Arc::new(MockStorage::with_quota(1));
        let registry = FailedLookupRegistry::new(storage);
        let key = CacheKey::new("a", "b");

        registry.mark_failed(&key).await;

        assert!(registry.has_failed(&key));
    }
}
