//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use crate::application::cache::{
    CacheLimits, DEFAULT_MAX_ENTRIES, DEFAULT_RECOVERY_ENTRIES, DEFAULT_RETAIN_ENTRIES,
};
use crate::domain::services::{ACCEPTANCE_THRESHOLD, ReliabilityPolicy};
use crate::infrastructure::catalog::DEFAULT_CATALOG_BASE;

pub(super) const APP_NAME: &str = "vehicle-imagery";
pub(super) const APP_QUALIFIER: &str = "com";
pub(super) const APP_ORGANIZATION: &str = "linuxmobile";

/// Google Custom Search JSON API endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, from file merged with CLI.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// External image search.
    #[serde(default)]
    pub search: SearchConfig,

    /// URL cache and failed-lookup storage.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Reliability policy extensions.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Curated image catalog.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// External image search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// API key. Usually supplied through the environment.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Search engine identifier.
    #[serde(default)]
    pub engine_id: Option<String>,

    /// Endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Results requested per query, at most 10.
    #[serde(default = "default_results_per_query")]
    pub results_per_query: u8,

    /// Minimum relevance score for a result to be accepted.
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,

    /// Ask the provider to filter explicit results.
    #[serde(default = "default_true")]
    pub safe_search: bool,

    /// Skip the external search entirely.
    #[serde(default)]
    pub disabled: bool,
}

impl SearchConfig {
    /// API key and engine id, if both are present and non-blank.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.disabled {
            return None;
        }
        let key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        let engine = self.engine_id.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        Some((key, engine))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            results_per_query: default_results_per_query(),
            acceptance_threshold: default_acceptance_threshold(),
            safe_search: true,
            disabled: false,
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the bucket files.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Entry count above which the URL cache is truncated.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Entries kept after truncation.
    #[serde(default = "default_retain_entries")]
    pub retain_entries: usize,

    /// Entries kept after a quota failure.
    #[serde(default = "default_recovery_entries")]
    pub recovery_entries: usize,

    /// Byte budget shared by all buckets.
    #[serde(default)]
    pub quota_bytes: Option<u64>,

    /// Restore failed-lookup marks from a previous run.
    #[serde(default)]
    pub remember_failures: bool,
}

impl CacheConfig {
    /// Cache limits, clamped so that recovery <= retain <= max.
    #[must_use]
    pub fn limits(&self) -> CacheLimits {
        let max_entries = self.max_entries.max(1);
        let retain_entries = self.retain_entries.clamp(1, max_entries);
        let recovery_entries = self.recovery_entries.clamp(1, retain_entries);
        CacheLimits {
            max_entries,
            retain_entries,
            recovery_entries,
        }
    }

    /// Configured directory or the platform cache directory.
    #[must_use]
    pub fn effective_dir(&self) -> Option<PathBuf> {
        self.dir.clone().or_else(AppConfig::default_cache_dir)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_entries: DEFAULT_MAX_ENTRIES,
            retain_entries: DEFAULT_RETAIN_ENTRIES,
            recovery_entries: DEFAULT_RECOVERY_ENTRIES,
            quota_bytes: None,
            remember_failures: false,
        }
    }
}

/// Additions to the built-in domain lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Extra hostname substrings to reject.
    #[serde(default)]
    pub extra_blocked_domains: Vec<String>,

    /// Extra hostname substrings that earn the trusted bonus.
    #[serde(default)]
    pub extra_trusted_domains: Vec<String>,
}

impl PolicyConfig {
    /// Built-in policy extended with the configured domains.
    #[must_use]
    pub fn policy(&self) -> ReliabilityPolicy {
        ReliabilityPolicy::default().extended(
            self.extra_trusted_domains.iter().cloned(),
            self.extra_blocked_domains.iter().cloned(),
        )
    }
}

/// Curated image catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL the catalog assets are served from. Must be set for
    /// catalog images to load; the default is a stand-in host.
    #[serde(default = "default_catalog_base")]
    pub base_url: String,
}

impl CatalogConfig {
    /// Returns true if `base_url` points somewhere other than the stand-in host.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        let base = self.base_url.trim().trim_end_matches('/');
        !base.is_empty() && base != DEFAULT_CATALOG_BASE
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base(),
        }
    }
}

fn default_catalog_base() -> String {
    DEFAULT_CATALOG_BASE.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_SEARCH_ENDPOINT.to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_results_per_query() -> u8 {
    10
}

const fn default_acceptance_threshold() -> f64 {
    ACCEPTANCE_THRESHOLD
}

const fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

const fn default_retain_entries() -> usize {
    DEFAULT_RETAIN_ENTRIES
}

const fn default_recovery_entries() -> usize {
    DEFAULT_RECOVERY_ENTRIES
}

const fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(api_key) = &args.api_key {
            self.search.api_key = Some(api_key.clone());
        }
        if let Some(engine_id) = &args.engine_id {
            self.search.engine_id = Some(engine_id.clone());
        }
        if let Some(threshold) = args.threshold {
            self.search.acceptance_threshold = threshold;
        }
        if args.offline {
            self.search.disabled = true;
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache.dir = Some(cache_dir.clone());
        }
        if let Some(quota) = args.quota_bytes {
            self.cache.quota_bytes = Some(quota);
        }
        if args.remember_failures {
            self.cache.remember_failures = true;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default cache directory.
    #[must_use]
    pub fn default_cache_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.cache_dir().to_path_buf())
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("vehicle-imagery.log"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}
