//! Port definition for the external keyword image search.

use async_trait::async_trait;

use crate::domain::entities::{SearchItem, SearchQuery};
use crate::domain::errors::SearchError;

/// Port for issuing a photographic image search.
///
/// Implementations return only results that passed boundary validation;
/// malformed entries are dropped before they reach scoring.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSearchPort: Send + Sync {
    /// Runs one keyword query and returns its candidate results in API order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>, SearchError>;
}
