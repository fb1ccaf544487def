//! Command-line arguments.

use super::app_config::LogLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::entities::{Vehicle, VehicleIdentity};

/// Command-line arguments, merged over the file configuration.
#[derive(Debug, Parser)]
#[command(
    name = "vehicle-imagery",
    version,
    about = "Resolve display images for vehicles with caching and fallbacks",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Search API key.
    #[arg(long, env = "VEHICLE_IMAGERY_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Search engine identifier.
    #[arg(long, env = "VEHICLE_IMAGERY_ENGINE_ID", global = true)]
    pub engine_id: Option<String>,

    /// Minimum relevance score for search results.
    #[arg(long, global = true)]
    pub threshold: Option<f64>,

    /// Never call the external search.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Directory for cache files.
    #[arg(long, value_name = "PATH", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Byte budget for cache files.
    #[arg(long, value_name = "BYTES", global = true)]
    pub quota_bytes: Option<u64>,

    /// Restore failed lookups recorded by earlier runs.
    #[arg(long, global = true)]
    pub remember_failures: bool,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve the display image for vehicles.
    Resolve {
        /// Vehicle described by flags.
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// JSON file holding a vehicle or a list of vehicles.
        #[arg(short, long, value_name = "PATH", conflicts_with = "make")]
        input: Option<PathBuf>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the runtime fallback chain for a vehicle.
    Chain {
        /// Vehicle described by flags.
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// Number of load errors to simulate.
        #[arg(long, default_value_t = 0)]
        errors: usize,
    },
    /// Empty the URL cache and forget failed lookups.
    ClearCache,
    /// Show cache statistics.
    Stats,
}

/// Flags describing a single vehicle record.
#[derive(Debug, Clone, Args)]
pub struct VehicleArgs {
    /// Manufacturer.
    #[arg(long)]
    pub make: Option<String>,

    /// Model name.
    #[arg(long)]
    pub model: Option<String>,

    /// Model year.
    #[arg(long, allow_negative_numbers = true)]
    pub year: Option<i32>,

    /// Image URL carried by the record.
    #[arg(long, value_name = "URL")]
    pub image: Option<String>,
}

impl VehicleArgs {
    /// Builds the vehicle record described by the flags.
    #[must_use]
    pub fn to_vehicle(&self) -> Vehicle {
        let identity = VehicleIdentity::new(
            self.make.clone().unwrap_or_default(),
            self.model.clone().unwrap_or_default(),
            self.year.unwrap_or_default(),
        );
        let vehicle = Vehicle::new(identity);
        match &self.image {
            Some(url) => vehicle.with_image_url(url),
            None => vehicle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve_flags() {
        let args = CliArgs::parse_from([
            "vehicle-imagery",
            "resolve",
            "--make",
            "Toyota",
            "--model",
            "Camry",
            "--year",
            "2023",
        ]);

        let Command::Resolve { vehicle, input, json } = args.command else {
            panic!("expected resolve");
        };
        assert!(input.is_none());
        assert!(!json);
        let vehicle = vehicle.to_vehicle();
        assert_eq!(vehicle.identity, VehicleIdentity::new("Toyota", "Camry", 2023));
        assert!(vehicle.image_url.is_none());
    }

    #[test]
    fn test_input_conflicts_with_make() {
        let result = CliArgs::try_parse_from([
            "vehicle-imagery",
            "resolve",
            "--make",
            "Toyota",
            "--input",
            "cars.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_chain() {
        let args = CliArgs::parse_from([
            "vehicle-imagery",
            "--offline",
            "chain",
            "--make",
            "Ford",
            "--errors",
            "3",
        ]);

        assert!(args.offline);
        let Command::Chain { vehicle, errors } = args.command else {
            panic!("expected chain");
        };
        assert_eq!(errors, 3);
        assert_eq!(vehicle.to_vehicle().identity.make, "Ford");
    }
}
