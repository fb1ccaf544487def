//! External image search error types.

use thiserror::Error;

/// Failures of the external image search tier.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum SearchError {
    #[error("search credentials are not configured")]
    MissingCredentials,

    #[error("network error during image search: {message}")]
    Network { message: String },

    #[error("rate limited by search provider, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("malformed search response: {message}")]
    InvalidResponse { message: String },

    #[error("unexpected search error: {message}")]
    Unexpected { message: String },
}

impl SearchError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether the provider is unreachable or refusing calls, in which
    /// case trying further query variants is pointless.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::RateLimited { .. })
    }

    /// Returns whether a later attempt may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::RateLimited { .. } | Self::InvalidResponse { .. }
        )
    }
}
