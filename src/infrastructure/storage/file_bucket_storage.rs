//! File-backed bucket storage: one JSON document per bucket.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, trace, warn};

use crate::domain::errors::StorageError;
use crate::domain::ports::{Bucket, DurableStoragePort};

const ALL_BUCKETS: [Bucket; 2] = [Bucket::UrlCache, Bucket::FailedLookups];

/// Stores each bucket as `<dir>/<bucket>.json`.
///
/// Writes go through a temporary file that is atomically renamed over the
/// target, so a crash never leaves a half-written bucket behind.
pub struct FileBucketStorage {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileBucketStorage {
    /// Creates storage rooted at `dir`, creating it if needed.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub async fn new(dir: PathBuf, quota_bytes: Option<u64>) -> Result<Self, StorageError> {
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io(dir.display(), format!("Failed to create dir: {e}")))?;
        debug!(dir = %dir.display(), quota_bytes, "Opened bucket storage");
        Ok(Self { dir, quota_bytes })
    }

    /// Storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a bucket's file.
    #[must_use]
    pub fn bucket_path(&self, bucket: Bucket) -> PathBuf {
        self.dir.join(format!("{}.json", bucket.name()))
    }

    /// Bytes currently used by the given buckets.
    async fn used_bytes(&self, buckets: impl Iterator<Item = Bucket>) -> u64 {
        let mut total = 0;
        for bucket in buckets {
            if let Ok(meta) = fs::metadata(self.bucket_path(bucket)).await {
                total += meta.len();
            }
        }
        total
    }

    async fn check_quota(&self, bucket: Bucket, contents: &str) -> Result<(), StorageError> {
        let Some(limit) = self.quota_bytes else {
            return Ok(());
        };
        let others = self
            .used_bytes(ALL_BUCKETS.into_iter().filter(|b| *b != bucket))
            .await;
        let needed = others + contents.len() as u64;
        if needed > limit {
            return Err(StorageError::QuotaExceeded {
                bucket: bucket.to_string(),
                needed,
                limit,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DurableStoragePort for FileBucketStorage {
    async fn read(&self, bucket: Bucket) -> Result<Option<String>, StorageError> {
        let path = self.bucket_path(bucket);
        match fs::read_to_string(&path).await {
            Ok(contents) => {
                trace!(bucket = %bucket, bytes = contents.len(), "Read bucket");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(bucket, e.to_string())),
        }
    }

    async fn write(&self, bucket: Bucket, contents: &str) -> Result<(), StorageError> {
        self.check_quota(bucket, contents).await?;

        let path = self.bucket_path(bucket);
        let dir = self.dir.clone();
        let data = contents.to_owned();
        let len = data.len();

        let result = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut temp_file = tempfile::NamedTempFile::new_in(&dir)?;
            temp_file.write_all(data.as_bytes())?;
            temp_file.as_file().sync_all()?;
            temp_file.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::io(bucket, format!("Write task failed: {e}")))?;

        match result {
            Ok(()) => {
                trace!(bucket = %bucket, bytes = len, "Wrote bucket");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::StorageFull => {
                warn!(bucket = %bucket, error = %e, "Disk full while writing bucket");
                Err(StorageError::QuotaExceeded {
                    bucket: bucket.to_string(),
                    needed: len as u64,
                    limit: self.quota_bytes.unwrap_or(0),
                })
            }
            Err(e) => Err(StorageError::io(bucket, e.to_string())),
        }
    }

    async fn remove(&self, bucket: Bucket) -> Result<(), StorageError> {
        match fs::remove_file(self.bucket_path(bucket)).await {
            Ok(()) => {
                debug!(bucket = %bucket, "Removed bucket");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(bucket, e.to_string())),
        }
    }
}

impl std::fmt::Debug for FileBucketStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBucketStorage")
            .field("dir", &self.dir)
            .field("quota_bytes", &self.quota_bytes)
            .finish()
    }
}
