//! In-process caches backed by durable storage.

mod failed_lookups;
mod url_cache;

pub use failed_lookups::FailedLookupRegistry;
pub use url_cache::{
    CacheLimits, CacheStats, CacheWrite, DEFAULT_MAX_ENTRIES, DEFAULT_RECOVERY_ENTRIES,
    DEFAULT_RETAIN_ENTRIES, UrlCacheStore,
};
