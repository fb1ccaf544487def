//! External image search with relevance gating.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::cache::{CacheWrite, UrlCacheStore};
use crate::domain::entities::{CacheKey, CandidateImage, SearchQuery};
use crate::domain::ports::{ImageCatalogPort, ImageSearchPort};
use crate::domain::services::RelevanceScorer;

/// Runs query variants against the search port and caches the winner.
///
/// Without a search port every lookup misses, which degrades resolution
/// to catalog images instead of failing.
pub struct ImageSearchService {
    search_port: Option<Arc<dyn ImageSearchPort>>,
    scorer: RelevanceScorer,
    cache: Arc<UrlCacheStore>,
    catalog: Arc<dyn ImageCatalogPort>,
}

impl ImageSearchService {
    /// Creates a new search service.
    #[must_use]
    pub fn new(
        search_port: Option<Arc<dyn ImageSearchPort>>,
        scorer: RelevanceScorer,
        cache: Arc<UrlCacheStore>,
        catalog: Arc<dyn ImageCatalogPort>,
    ) -> Self {
        if search_port.is_none() {
            info!("No search credentials configured, using catalog images only");
        }
        Self {
            search_port,
            scorer,
            cache,
            catalog,
        }
    }

    /// Returns true if a search backend is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.search_port.is_some()
    }

    /// Best-effort search that always yields a URL.
    ///
    /// Falls back to the catalog default for the make when nothing scores
    /// high enough or the provider fails.
    pub async fn search(&self, make: &str, model: Option<&str>, year: Option<i32>) -> String {
        match self.lookup(make, model, year).await {
            Some(candidate) => candidate.url,
            None => self.catalog.default_image(make),
        }
    }

    /// Tries each query variant, most specific first, and returns the first
    /// accepted candidate after caching it.
    ///
    /// Provider outages stop the remaining variants. Any other error only
    /// skips the variant that raised it.
    pub async fn lookup(
        &self,
        make: &str,
        model: Option<&str>,
        year: Option<i32>,
    ) -> Option<CandidateImage> {
        let port = self.search_port.as_ref()?;
        let key = CacheKey::new(make, model.unwrap_or_default());

        for query in SearchQuery::variants(make, model, year) {
            debug!(query = %query, "Searching for vehicle image");

            let items = match port.search(&query).await {
                Ok(items) => items,
                Err(e) if e.is_network_error() => {
                    warn!(error = %e, query = %query, "Image search unavailable");
                    return None;
                }
                Err(e) => {
                    warn!(error = %e, query = %query, "Image search failed, trying next query");
                    continue;
                }
            };

            let Some(winner) = self.scorer.select(&items, &query) else {
                debug!(query = %query, results = items.len(), "No result reached the threshold");
                continue;
            };

            match self.cache.set(&key, &winner.url).await {
                CacheWrite::Stored => {
                    info!(key = %key, url = %winner.url, score = winner.score, "Accepted search result");
                    return Some(winner);
                }
                CacheWrite::Rejected => {
                    debug!(url = %winner.url, "Winning result rejected by cache");
                }
            }
        }

        None
    }
}

impl std::fmt::Debug for ImageSearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSearchService")
            .field("enabled", &self.is_enabled())
            .field("threshold", &self.scorer.threshold())
            .finish_non_exhaustive()
    }
}
