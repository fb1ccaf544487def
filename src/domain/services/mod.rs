//! Pure domain services.

pub mod placeholder;
pub mod relevance;
pub mod reliability;

pub use placeholder::{derived_brand_color, synthetic_placeholder};
pub use relevance::{ACCEPTANCE_THRESHOLD, RelevanceScorer};
pub use reliability::{ReliabilityPolicy, is_reliable};
