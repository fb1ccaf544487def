//! Durable client-side storage port definition.

use async_trait::async_trait;

use crate::domain::errors::StorageError;

/// Named storage buckets. Each holds one JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Key to URL map of resolved images.
    UrlCache,
    /// Set of keys whose remote lookup came back empty.
    FailedLookups,
}

impl Bucket {
    /// Stable storage name of the bucket.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UrlCache => "image_cache",
            Self::FailedLookups => "failed_lookups",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Port for bucket persistence.
#[async_trait]
pub trait DurableStoragePort: Send + Sync {
    /// Reads the raw contents of a bucket, `None` if it was never written.
    async fn read(&self, bucket: Bucket) -> Result<Option<String>, StorageError>;

    /// Replaces the contents of a bucket.
    async fn write(&self, bucket: Bucket, contents: &str) -> Result<(), StorageError>;

    /// Deletes a bucket. Missing buckets are not an error.
    async fn remove(&self, bucket: Bucket) -> Result<(), StorageError>;
}
