//! Custom Search JSON API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode, header};
use tracing::{debug, warn};

use super::dto::{ErrorResponse, SearchResponse};
use crate::domain::entities::{SearchItem, SearchQuery};
use crate::domain::errors::SearchError;
use crate::domain::ports::ImageSearchPort;

const USER_AGENT: &str = concat!("vehicle-imagery/", env!("CARGO_PKG_VERSION"));
const DEFAULT_RETRY_AFTER_MS: u64 = 5000;
const MAX_RESULTS: u8 = 10;

/// Settings for [`CustomSearchClient`].
#[derive(Debug, Clone)]
pub struct CustomSearchSettings {
    /// Endpoint URL.
    pub endpoint: String,
    /// API key.
    pub api_key: String,
    /// Search engine identifier.
    pub engine_id: String,
    /// Results per query, clamped to 1..=10.
    pub results_per_query: u8,
    /// Request timeout.
    pub timeout: Duration,
    /// Filter explicit results.
    pub safe_search: bool,
}

/// Image search over the Custom Search JSON API.
pub struct CustomSearchClient {
    client: Client,
    settings: CustomSearchSettings,
}

impl CustomSearchClient {
    /// Creates new client.
    ///
    /// # Errors
    /// Returns error if credentials are blank or HTTP client creation fails.
    pub fn new(settings: CustomSearchSettings) -> Result<Self, SearchError> {
        if settings.api_key.trim().is_empty() || settings.engine_id.trim().is_empty() {
            return Err(SearchError::MissingCredentials);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| SearchError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    fn build_request(&self, query: &SearchQuery) -> Result<Request, SearchError> {
        let num = self.settings.results_per_query.clamp(1, MAX_RESULTS).to_string();
        let safe = if self.settings.safe_search { "active" } else { "off" };
        let text = query.text();

        self.client
            .get(&self.settings.endpoint)
            .query(&[
                ("key", self.settings.api_key.as_str()),
                ("cx", self.settings.engine_id.as_str()),
                ("q", text.as_str()),
                ("searchType", "image"),
                ("imgType", "photo"),
                ("num", num.as_str()),
                ("safe", safe),
            ])
            .header(header::ACCEPT, "application/json")
            .build()
            .map_err(|e| SearchError::unexpected(format!("failed to build request: {e}")))
    }

    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> SearchError {
        let retry_after_ms = retry_after_ms(response.headers());

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) if !body.error.message.is_empty() => body.error.message,
            _ => format!("HTTP {status}"),
        };

        classify_status(status, retry_after_ms, message)
    }
}

/// Delay requested by a `Retry-After` header given in seconds.
fn retry_after_ms(headers: &header::HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000))
}

/// Maps a non-success status to an error.
fn classify_status(status: StatusCode, retry_after_ms: Option<u64>, message: String) -> SearchError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        SearchError::RateLimited {
            retry_after_ms: retry_after_ms.unwrap_or(DEFAULT_RETRY_AFTER_MS),
        }
    } else if status.is_server_error() {
        SearchError::network(format!("search provider unavailable: {message}"))
    } else {
        SearchError::unexpected(format!("unexpected response: {status} - {message}"))
    }
}

#[async_trait]
impl ImageSearchPort for CustomSearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>, SearchError> {
        let request = self.build_request(query)?;

        debug!(query = %query, "Querying image search");

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(error = %e, "Failed to reach image search");
            if e.is_timeout() {
                SearchError::network("request timed out")
            } else if e.is_connect() {
                SearchError::network("failed to connect to search provider")
            } else {
                SearchError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse search response");
            SearchError::invalid_response(e.to_string())
        })?;

        let items = body.into_items();
        debug!(query = %query, results = items.len(), "Image search returned");
        Ok(items)
    }
}

impl std::fmt::Debug for CustomSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomSearchClient")
            .field("endpoint", &self.settings.endpoint)
            .field("engine_id", &self.settings.engine_id)
            .finish_non_exhaustive()
    }
}
