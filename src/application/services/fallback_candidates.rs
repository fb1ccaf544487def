//! Precomputed candidate list for runtime load failures.

use std::sync::Arc;

use crate::domain::entities::VehicleIdentity;
use crate::domain::ports::ImageCatalogPort;
use crate::domain::services::{ReliabilityPolicy, derived_brand_color, synthetic_placeholder};

/// Builds the ordered list of URLs a renderer falls back through.
pub struct FallbackCandidateBuilder {
    catalog: Arc<dyn ImageCatalogPort>,
    policy: Arc<ReliabilityPolicy>,
}

impl FallbackCandidateBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(catalog: Arc<dyn ImageCatalogPort>, policy: Arc<ReliabilityPolicy>) -> Self {
        Self { catalog, policy }
    }

    /// Accent colour for a make: the catalog's if known, else a derived one.
    #[must_use]
    pub fn brand_color(&self, make: &str) -> String {
        self.catalog
            .brand_color(make)
            .unwrap_or_else(|| derived_brand_color(make))
    }

    /// Candidates in order: the resolved URL, brand images, stock photos and
    /// finally a brand-coloured inline card.
    ///
    /// Duplicates and unreliable entries are dropped, so the list is never
    /// empty and never repeats a URL that already failed.
    #[must_use]
    pub fn build(&self, identity: &VehicleIdentity, primary: &str) -> Vec<String> {
        let mut raw = vec![primary.to_string()];
        if !identity.is_anonymous() {
            if let Some(model) = identity.known_model() {
                raw.push(self.catalog.model_image(&identity.make, model));
            }
            raw.push(self.catalog.default_image(&identity.make));
        }
        raw.extend(self.catalog.stock_images());
        raw.push(synthetic_placeholder(
            identity,
            &self.brand_color(&identity.make),
        ));

        let mut candidates: Vec<String> = Vec::with_capacity(raw.len());
        for url in raw {
            let url = url.trim().to_string();
            if self.policy.is_reliable(Some(&url)) && !candidates.contains(&url) {
                candidates.push(url);
            }
        }
        candidates
    }
}

impl std::fmt::Debug for FallbackCandidateBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackCandidateBuilder").finish_non_exhaustive()
    }
}
