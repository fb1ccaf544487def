//! Image resolution use case.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::cache::{FailedLookupRegistry, UrlCacheStore};
use crate::application::services::{FallbackCandidateBuilder, ImageSearchService};
use crate::domain::entities::Vehicle;
use crate::domain::ports::ImageCatalogPort;
use crate::domain::services::{ReliabilityPolicy, synthetic_placeholder};

/// Tier that produced a resolved URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// The record's own image URL.
    ExplicitSource,
    /// A previously accepted search result.
    Cache,
    /// A fresh search result.
    ExternalSearch,
    /// A curated catalog image.
    Catalog,
    /// The generated inline placeholder.
    Placeholder,
}

impl ResolutionTier {
    /// Short label for logs and CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExplicitSource => "explicit",
            Self::Cache => "cache",
            Self::ExternalSearch => "search",
            Self::Catalog => "catalog",
            Self::Placeholder => "placeholder",
        }
    }
}

impl std::fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A resolved display URL and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// URL to render first.
    pub url: String,
    /// Tier that produced it.
    pub tier: ResolutionTier,
}

impl Resolution {
    const fn new(url: String, tier: ResolutionTier) -> Self {
        Self { url, tier }
    }
}

/// Picks the best display URL for a vehicle.
pub struct ResolveImageUseCase {
    cache: Arc<UrlCacheStore>,
    failed: Arc<FailedLookupRegistry>,
    search: Arc<ImageSearchService>,
    catalog: Arc<dyn ImageCatalogPort>,
    policy: Arc<ReliabilityPolicy>,
    candidates: FallbackCandidateBuilder,
}

impl ResolveImageUseCase {
    /// Creates new use case.
    #[must_use]
    pub fn new(
        cache: Arc<UrlCacheStore>,
        failed: Arc<FailedLookupRegistry>,
        search: Arc<ImageSearchService>,
        catalog: Arc<dyn ImageCatalogPort>,
        policy: Arc<ReliabilityPolicy>,
    ) -> Self {
        let candidates = FallbackCandidateBuilder::new(catalog.clone(), policy.clone());
        Self {
            cache,
            failed,
            search,
            catalog,
            policy,
            candidates,
        }
    }

    /// Resolves a vehicle to a URL, returning only the URL.
    pub async fn resolve_image(&self, vehicle: &Vehicle) -> String {
        self.execute(vehicle).await.url
    }

    /// Walks the tiers in order and stops at the first acceptable URL:
    ///
    /// 1. the record's own image, if reliable and not a stand-in
    /// 2. the URL cache
    /// 3. a previous failed search for the key skips step 4
    /// 4. the external search
    /// 5. the catalog brand image, then the model image
    /// 6. a generated placeholder
    ///
    /// Never fails; the last tier always produces a URL.
    pub async fn execute(&self, vehicle: &Vehicle) -> Resolution {
        let identity = &vehicle.identity;
        let key = identity.cache_key();

        if let Some(url) = vehicle.image_url.as_deref().map(str::trim) {
            if self.policy.is_reliable(Some(url)) && !self.policy.looks_like_placeholder(url) {
                debug!(vehicle = %identity, "Using explicit image");
                return Resolution::new(url.to_string(), ResolutionTier::ExplicitSource);
            }
            debug!(vehicle = %identity, url, "Ignoring unusable explicit image");
        }

        if !identity.is_anonymous() {
            if let Some(url) = self.cache.get(&key) {
                return Resolution::new(url, ResolutionTier::Cache);
            }

            if self.failed.has_failed(&key) {
                debug!(key = %key, "Skipping search for previously failed key");
            } else if self.search.is_enabled() {
                let found = self
                    .search
                    .lookup(&identity.make, identity.known_model(), identity.known_year())
                    .await;
                if let Some(candidate) = found {
                    return Resolution::new(candidate.url, ResolutionTier::ExternalSearch);
                }
                self.failed.mark_failed(&key).await;
            }

            let brand = self.catalog.default_image(&identity.make);
            if self.policy.is_reliable(Some(&brand)) {
                return Resolution::new(brand, ResolutionTier::Catalog);
            }
            if let Some(model) = identity.known_model() {
                let model_image = self.catalog.model_image(&identity.make, model);
                if self.policy.is_reliable(Some(&model_image)) {
                    return Resolution::new(model_image, ResolutionTier::Catalog);
                }
            }
        }

        info!(vehicle = %identity, "Falling back to generated placeholder");
        let color = self.brand_color(&identity.make);
        Resolution::new(
            synthetic_placeholder(identity, &color),
            ResolutionTier::Placeholder,
        )
    }

    /// Accent colour used for generated placeholders of this make.
    #[must_use]
    pub fn brand_color(&self, make: &str) -> String {
        self.candidates.brand_color(make)
    }

    /// Ordered runtime fallbacks starting from an already resolved URL.
    #[must_use]
    pub fn fallback_candidates(&self, vehicle: &Vehicle, primary: &str) -> Vec<String> {
        self.candidates.build(&vehicle.identity, primary)
    }
}

impl std::fmt::Debug for ResolveImageUseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveImageUseCase")
            .field("cache", &self.cache)
            .field("failed", &self.failed)
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cache::CacheLimits;
    use crate::domain::entities::{CacheKey, SearchItem, VehicleIdentity};
    use crate::domain::errors::SearchError;
    use crate::domain::ports::mocks::{MockCatalog, MockImageSearchPort, MockStorage};
    use crate::domain::ports::{DurableStoragePort, ImageSearchPort};
    use crate::domain::services::RelevanceScorer;
    use test_case::test_case;

    struct Fixture {
        use_case: ResolveImageUseCase,
        cache: Arc<UrlCacheStore>,
        failed: Arc<FailedLookupRegistry>,
    }

    fn fixture_with(port: Option<MockImageSearchPort>, catalog: MockCatalog) -> Fixture {
        let policy = Arc::new(ReliabilityPolicy::default());
        let storage: Arc<dyn DurableStoragePort> = Arc::new(MockStorage::new());
        let catalog: Arc<dyn ImageCatalogPort> = Arc::new(catalog);
        let cache = Arc::new(UrlCacheStore::new(
            storage.clone(),
            policy.clone(),
            CacheLimits::default(),
        ));
        let failed = Arc::new(FailedLookupRegistry::new(storage));
        let search = Arc::new(ImageSearchService::new(
            port.map(|p| Arc::new(p) as Arc<dyn ImageSearchPort>),
            RelevanceScorer::new(policy.clone()),
            cache.clone(),
            catalog.clone(),
        ));
        Fixture {
            use_case: ResolveImageUseCase::new(
                cache.clone(),
                failed.clone(),
                search,
                catalog,
                policy,
            ),
            cache,
            failed,
        }
    }

    fn fixture(port: MockImageSearchPort) -> Fixture {
        fixture_with(Some(port), MockCatalog::new())
    }

    fn camry() -> Vehicle {
        Vehicle::new(VehicleIdentity::new("Toyota", "Camry", 2023))
    }

    fn item(link: &str, title: &str) -> SearchItem {
        SearchItem::new(link, title, "").unwrap()
    }

    #[tokio::test]
    async fn test_accepted_search_result_is_returned_and_cached() {
        let mut port = MockImageSearchPort::new();
        port.expect_search().times(1).returning(|_| {
            Ok(vec![item(
                "https://upload.wikimedia.org/2023_camry.jpg",
                "Camry",
            )])
        });
        let f = fixture(port);

        let resolution = f.use_case.execute(&camry()).await;

        assert_eq!(resolution.url, "https://upload.wikimedia.org/2023_camry.jpg");
        assert_eq!(resolution.tier, ResolutionTier::ExternalSearch);
        assert_eq!(
            f.cache.get(&CacheKey::new("toyota", "camry")).as_deref(),
            Some("https://upload.wikimedia.org/2023_camry.jpg")
        );
    }

    #[tokio::test]
    async fn test_low_scoring_results_fall_to_catalog() {
        let mut port = MockImageSearchPort::new();
        port.expect_search()
            .times(3)
            .returning(|_| Ok(vec![item("https://img.example.org/1.jpg", "A car")]));
        let f = fixture(port);

        let resolution = f.use_case.execute(&camry()).await;

        assert_eq!(resolution.url, "https://catalog.test/brands/toyota.jpg");
        assert_eq!(resolution.tier, ResolutionTier::Catalog);
        assert!(f.failed.has_failed(&CacheKey::new("toyota", "camry")));
    }

    #[tokio::test]
    async fn test_blocked_explicit_image_is_ignored() {
        let mut port = MockImageSearchPort::new();
        port.expect_search().times(1).returning(|_| {
            Ok(vec![item(
                "https://img.example.org/toyota-camry.jpg",
                "Toyota Camry",
            )])
        });
        let f = fixture(port);
        let vehicle = camry().with_image_url("https://via.placeholder.com/x.png");

        let resolution = f.use_case.execute(&vehicle).await;

        assert_eq!(resolution.url, "https://img.example.org/toyota-camry.jpg");
        assert_eq!(resolution.tier, ResolutionTier::ExternalSearch);
    }

    #[tokio::test]
    async fn test_cache_takes_precedence_over_failed_mark() {
        let mut port = MockImageSearchPort::new();
        port.expect_search().never();
        let f = fixture(port);
        let key = CacheKey::new("toyota", "camry");
        f.cache.set(&key, "https://img.example.org/x.jpg").await;
        f.failed.mark_failed(&key).await;

        let resolution = f.use_case.execute(&camry()).await;

        assert_eq!(resolution.url, "https://img.example.org/x.jpg");
        assert_eq!(resolution.tier, ResolutionTier::Cache);
    }

    #[tokio::test]
    async fn test_second_resolution_hits_cache() {
        let mut port = MockImageSearchPort::new();
        let mut calls = 0;
        port.expect_search().times(1).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(vec![item(
                    "https://img.example.org/toyota-camry.jpg",
                    "Toyota Camry",
                )])
            } else {
                Err(SearchError::network("offline"))
            }
        });
        let f = fixture(port);

        let first = f.use_case.resolve_image(&camry()).await;
        let second = f.use_case.resolve_image(&camry()).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_key_skips_search() {
        let mut port = MockImageSearchPort::new();
        port.expect_search().never();
        let f = fixture(port);
        f.failed.mark_failed(&CacheKey::new("toyota", "camry")).await;

        let resolution = f.use_case.execute(&camry()).await;

        assert_eq!(resolution.tier, ResolutionTier::Catalog);
    }

    #[tokio::test]
    async fn test_network_failure_is_remembered() {
        let mut port = MockImageSearchPort::new();
        port.expect_search()
            .times(1)
            .returning(|_| Err(SearchError::RateLimited { retry_after_ms: 500 }));
        let f = fixture(port);

        let first = f.use_case.execute(&camry()).await;
        let second = f.use_case.execute(&camry()).await;

        assert_eq!(first, second);
        assert_eq!(first.tier, ResolutionTier::Catalog);
    }

    #[tokio::test]
    async fn test_explicit_image_used_as_is() {
        let mut port = MockImageSearchPort::new();
        port.expect_search().never();
        let f = fixture(port);
        let vehicle = camry().with_image_url(" https://dealer.example.com/stock/123.jpg ");

        let resolution = f.use_case.execute(&vehicle).await;

        assert_eq!(resolution.url, "https://dealer.example.com/stock/123.jpg");
        assert_eq!(resolution.tier, ResolutionTier::ExplicitSource);
    }

    #[tokio::test]
    async fn test_explicit_stand_in_image_is_ignored() {
        let f = fixture_with(None, MockCatalog::new());
        let vehicle = camry().with_image_url("https://dealer.example.com/img/no-image.png");

        let resolution = f.use_case.execute(&vehicle).await;

        assert_eq!(resolution.tier, ResolutionTier::Catalog);
    }

    #[tokio::test]
    async fn test_no_search_backend_uses_catalog_without_marking() {
        let f = fixture_with(None, MockCatalog::new());

        let resolution = f.use_case.execute(&camry()).await;

        assert_eq!(resolution.url, "https://catalog.test/brands/toyota.jpg");
        assert!(f.failed.is_empty());
    }

    #[tokio::test]
    async fn test_unusable_catalog_yields_placeholder() {
        let f = fixture_with(None, MockCatalog::with_base("https://via.placeholder.com"));

        let resolution = f.use_case.execute(&camry()).await;

        assert_eq!(resolution.tier, ResolutionTier::Placeholder);
        assert!(resolution.url.starts_with("data:image/svg+xml;base64,"));
    }

    #[test_case("", "", 0 ; "empty")]
    #[test_case("   ", "Camry", 2023 ; "blank_make")]
    #[test_case("Toyota", "", -1 ; "negative_year")]
    #[test_case("Zündapp", "Janus 250", 1957 ; "unicode")]
    #[tokio::test]
    async fn test_always_resolves(make: &str, model: &str, year: i32) {
        let mut port = MockImageSearchPort::new();
        port.expect_search()
            .returning(|_| Err(SearchError::network("offline")));
        let f = fixture(port);
        let vehicle = Vehicle::new(VehicleIdentity::new(make, model, year));

        let url = f.use_case.resolve_image(&vehicle).await;

        assert!(f.use_case.policy.is_reliable(Some(&url)));
    }

    #[tokio::test]
    async fn test_anonymous_vehicle_gets_placeholder() {
        let mut port = MockImageSearchPort::new();
        port.expect_search().never();
        let f = fixture(port);

        let resolution = f
            .use_case
            .execute(&Vehicle::new(VehicleIdentity::new("", "", 0)))
            .await;

        assert_eq!(resolution.tier, ResolutionTier::Placeholder);
    }
}
