//! Application configuration.

pub mod app_config;
pub mod args;
pub mod store;

pub use app_config::{AppConfig, CacheConfig, CatalogConfig, LogLevel, PolicyConfig, SearchConfig};
pub use args::{CliArgs, Command, VehicleArgs};
pub use store::{ConfigError, ConfigStore};
