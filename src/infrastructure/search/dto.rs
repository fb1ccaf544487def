use serde::Deserialize;
use tracing::trace;

use crate::domain::entities::SearchItem;

/// Custom Search JSON API response body.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Results, absent when the query matched nothing.
    #[serde(default)]
    pub items: Option<Vec<RawSearchItem>>,
}

/// One raw result as the provider sends it.
#[derive(Debug, Deserialize)]
pub struct RawSearchItem {
    /// Image URL.
    #[serde(default)]
    pub link: Option<String>,
    /// Page title.
    #[serde(default)]
    pub title: Option<String>,
    /// Text snippet.
    #[serde(default)]
    pub snippet: Option<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetail,
}

/// Provider error details.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// Error message.
    #[serde(default)]
    pub message: String,
}

impl SearchResponse {
    /// Validates raw items, dropping any without a usable link.
    #[must_use]
    pub fn into_items(self) -> Vec<SearchItem> {
        self.items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| {
                let link = raw.link.unwrap_or_default();
                let item = SearchItem::new(
                    &link,
                    raw.title.as_deref().unwrap_or_default(),
                    raw.snippet.as_deref().unwrap_or_default(),
                );
                if item.is_none() {
                    trace!(link = %link, "Dropping malformed search result");
                }
                item
            })
            .collect()
    }
}
