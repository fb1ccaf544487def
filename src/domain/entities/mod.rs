//! Domain entity definitions.

mod cache_key;
mod candidate;
mod vehicle;

pub use cache_key::{CacheKey, RESOLVER_VERSION};
pub use candidate::{CandidateImage, SearchItem, SearchQuery};
pub use vehicle::{Vehicle, VehicleIdentity, normalize_term};
