//! Durable storage error types.

use thiserror::Error;

/// Failures of the durable client-side storage.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum StorageError {
    #[error("storage quota exceeded writing {bucket} ({needed} bytes needed, limit {limit})")]
    QuotaExceeded {
        bucket: String,
        needed: u64,
        limit: u64,
    },

    #[error("storage io error on {bucket}: {message}")]
    Io { bucket: String, message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl StorageError {
    /// Creates io error.
    #[must_use]
    pub fn io(bucket: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Io {
            bucket: bucket.to_string(),
            message: message.into(),
        }
    }

    /// Creates serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns whether the write failed for lack of space.
    #[must_use]
    pub const fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
