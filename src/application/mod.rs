//! Application layer with caches, services and use cases.

/// URL cache and failed-lookup registry.
pub mod cache;
/// Search and fallback services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use cache::{CacheLimits, FailedLookupRegistry, UrlCacheStore};
pub use services::{FallbackCandidateBuilder, ImageSearchService};
pub use use_cases::{Resolution, ResolutionTier, ResolveImageUseCase};
