pub mod fallback_candidates;
pub mod image_search_service;

pub use fallback_candidates::FallbackCandidateBuilder;
pub use image_search_service::ImageSearchService;
