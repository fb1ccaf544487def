//! Infrastructure layer with adapters and wiring.

/// Static image catalog.
pub mod catalog;
/// Application configuration.
pub mod config;
/// Engine wiring.
pub mod engine;
/// External image search client.
pub mod search;
/// Durable bucket storage.
pub mod storage;

pub use catalog::StaticImageCatalog;
pub use config::{AppConfig, CliArgs, Command, ConfigStore, LogLevel};
pub use engine::{EngineStats, ResolverEngine};
pub use search::CustomSearchClient;
pub use storage::FileBucketStorage;
