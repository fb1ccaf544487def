//! Domain layer with core entities, pure services and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;
/// Reliability, relevance and placeholder services.
pub mod services;

pub use entities::{CacheKey, Vehicle, VehicleIdentity};
pub use errors::{SearchError, StorageError};
pub use services::{ReliabilityPolicy, RelevanceScorer, is_reliable};
