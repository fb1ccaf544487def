//! Wiring of the resolution stack from configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::catalog::StaticImageCatalog;
use super::config::AppConfig;
use super::search::{CustomSearchClient, CustomSearchSettings};
use super::storage::FileBucketStorage;
use crate::application::cache::{CacheStats, FailedLookupRegistry, UrlCacheStore};
use crate::application::services::ImageSearchService;
use crate::application::use_cases::{Resolution, ResolveImageUseCase};
use crate::domain::entities::Vehicle;
use crate::domain::errors::StorageError;
use crate::domain::ports::{DurableStoragePort, ImageCatalogPort, ImageSearchPort};
use crate::domain::services::RelevanceScorer;

/// Fully wired resolver with its caches.
pub struct ResolverEngine {
    use_case: ResolveImageUseCase,
    cache: Arc<UrlCacheStore>,
    failed: Arc<FailedLookupRegistry>,
    search_enabled: bool,
}

/// Snapshot of engine state for reporting.
#[derive(Debug, Clone)]
pub struct EngineStats {
    /// URL cache statistics.
    pub cache: CacheStats,
    /// Keys whose search failed this session.
    pub failed_lookups: usize,
    /// Whether the external search is configured.
    pub search_enabled: bool,
}

impl std::fmt::Display for EngineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.cache)?;
        writeln!(f, "Failed lookups: {}", self.failed_lookups)?;
        write!(
            f,
            "External search: {}",
            if self.search_enabled { "enabled" } else { "disabled" }
        )
    }
}

impl ResolverEngine {
    /// Opens file storage under the configured cache directory and loads
    /// the persisted caches.
    ///
    /// # Errors
    /// Returns error if the cache directory cannot be determined or created.
    pub async fn open(config: &AppConfig) -> Result<Self, StorageError> {
        let dir = config
            .cache
            .effective_dir()
            .ok_or_else(|| StorageError::io("cache", "could not determine cache directory"))?;
        let storage = Arc::new(FileBucketStorage::new(dir, config.cache.quota_bytes).await?);
        let search = build_search_client(config);
        if !config.catalog.is_configured() {
            warn!(
                base_url = %config.catalog.base_url,
                "catalog.base_url is not configured, catalog images will not load"
            );
        }
        let catalog = Arc::new(StaticImageCatalog::new(config.catalog.base_url.clone()));

        Ok(Self::with_parts(config, storage, search, catalog).await)
    }

    /// Builds the engine from explicit adapters.
    pub async fn with_parts(
        config: &AppConfig,
        storage: Arc<dyn DurableStoragePort>,
        search: Option<Arc<dyn ImageSearchPort>>,
        catalog: Arc<dyn ImageCatalogPort>,
    ) -> Self {
        let policy = Arc::new(config.policy.policy());
        let cache = Arc::new(
            UrlCacheStore::open(storage.clone(), policy.clone(), config.cache.limits()).await,
        );
        let failed =
            Arc::new(FailedLookupRegistry::open(storage, config.cache.remember_failures).await);

        let scorer =
            RelevanceScorer::new(policy.clone()).with_threshold(config.search.acceptance_threshold);
        let search_service = Arc::new(ImageSearchService::new(
            search,
            scorer,
            cache.clone(),
            catalog.clone(),
        ));
        let search_enabled = search_service.is_enabled();

        let use_case = ResolveImageUseCase::new(
            cache.clone(),
            failed.clone(),
            search_service,
            catalog,
            policy,
        );

        Self {
            use_case,
            cache,
            failed,
            search_enabled,
        }
    }

    /// Resolves one vehicle.
    pub async fn resolve(&self, vehicle: &Vehicle) -> Resolution {
        self.use_case.execute(vehicle).await
    }

    /// Resolves vehicles one after another, in order.
    pub async fn resolve_all(&self, vehicles: &[Vehicle]) -> Vec<Resolution> {
        let mut resolutions = Vec::with_capacity(vehicles.len());
        for vehicle in vehicles {
            resolutions.push(self.resolve(vehicle).await);
        }
        resolutions
    }

    /// Runtime fallback candidates for a resolved vehicle.
    #[must_use]
    pub fn candidates(&self, vehicle: &Vehicle, resolution: &Resolution) -> Vec<String> {
        self.use_case.fallback_candidates(vehicle, &resolution.url)
    }

    /// Accent colour for a make.
    #[must_use]
    pub fn brand_color(&self, make: &str) -> String {
        self.use_case.brand_color(make)
    }

    /// Forgets every cached URL and failed lookup.
    pub async fn clear(&self) {
        self.cache.clear().await;
        self.failed.clear().await;
    }

    /// Flushes the URL cache.
    pub async fn close(&self) {
        self.cache.close().await;
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cache: self.cache.stats(),
            failed_lookups: self.failed.len(),
            search_enabled: self.search_enabled,
        }
    }
}

impl std::fmt::Debug for ResolverEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverEngine")
            .field("use_case", &self.use_case)
            .field("search_enabled", &self.search_enabled)
            .finish_non_exhaustive()
    }
}

fn build_search_client(config: &AppConfig) -> Option<Arc<dyn ImageSearchPort>> {
    let (api_key, engine_id) = config.search.credentials()?;
    let settings = CustomSearchSettings {
        endpoint: config.search.endpoint.clone(),
        api_key: api_key.to_string(),
        engine_id: engine_id.to_string(),
        results_per_query: config.search.results_per_query,
        timeout: Duration::from_secs(config.search.timeout_secs),
        safe_search: config.search.safe_search,
    };
    match CustomSearchClient::new(settings) {
        Ok(client) => {
            info!("External image search enabled");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "Failed to create search client, using catalog only");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::ResolutionTier;
    use crate::domain::entities::VehicleIdentity;
    use crate::domain::ports::mocks::MockStorage;
    use tempfile::tempdir;

    fn camry() -> Vehicle {
        Vehicle::new(VehicleIdentity::new("Toyota", "Camry", 2023))
    }

    #[tokio::test]
    async fn test_open_without_credentials_uses_catalog() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.cache.dir = Some(dir.path().to_path_buf());

        let engine = ResolverEngine::open(&config).await.unwrap();
        let resolution = engine.resolve(&camry()).await;

        assert!(!engine.stats().search_enabled);
        assert_eq!(resolution.tier, ResolutionTier::Catalog);
        assert!(resolution.url.ends_with("/brands/toyota.jpg"));
    }

    #[tokio::test]
    async fn test_cache_survives_reopen() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.cache.dir = Some(dir.path().to_path_buf());

        let engine = ResolverEngine::open(&config).await.unwrap();
        engine
            .cache
            .set(
                &camry().identity.cache_key(),
                "https://img.example.org/camry.jpg",
            )
            .await;
        engine.close().await;

        let reopened = ResolverEngine::open(&config).await.unwrap();
        let resolution = reopened.resolve(&camry()).await;

        assert_eq!(resolution.tier, ResolutionTier::Cache);
        assert_eq!(resolution.url, "https://img.example.org/camry.jpg");
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let storage = Arc::new(MockStorage::new());
        let config = AppConfig::default();
        let engine = ResolverEngine::with_parts(
            &config,
            storage,
            None,
            Arc::new(StaticImageCatalog::default()),
        )
        .await;
        let key = camry().identity.cache_key();
        engine.cache.set(&key, "https://img.example.org/x.jpg").await;
        engine.failed.mark_failed(&key).await;

        engine.clear().await;

        let stats = engine.stats();
        assert_eq!(stats.cache.size, 0);
        assert_eq!(stats.failed_lookups, 0);
        assert!(stats.to_string().contains("External search: disabled"));
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_order_and_candidates_start_with_primary() {
        let config = AppConfig::default();
        let engine = ResolverEngine::with_parts(
            &config,
            Arc::new(MockStorage::new()),
            None,
            Arc::new(StaticImageCatalog::default()),
        )
        .await;
        let vehicles = vec![
            camry(),
            Vehicle::new(VehicleIdentity::new("", "", 0)),
        ];

        let resolutions = engine.resolve_all(&vehicles).await;

        assert_eq!(resolutions.len(), 2);
        assert_eq!(resolutions[1].tier, ResolutionTier::Placeholder);
        let candidates = engine.candidates(&vehicles[0], &resolutions[0]);
        assert_eq!(candidates[0], resolutions[0].url);
    }
}
