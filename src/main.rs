use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vehicle_imagery::domain::entities::Vehicle;
use vehicle_imagery::infrastructure::config::VehicleArgs;
use vehicle_imagery::infrastructure::{AppConfig, CliArgs, Command, ConfigStore, ResolverEngine};
use vehicle_imagery::presentation::{
    ChainTransition, FallbackChain, PlaceholderCard, RenderTarget, preview_url,
};

const PREVIEW_LEN: usize = 72;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let store = match &args.config {
        Some(path) => ConfigStore::with_dir(
            path.parent().map_or_else(PathBuf::new, Path::to_path_buf),
        ),
        None => ConfigStore::new()?,
    };
    let mut config = store
        .load_config(args.config.as_deref())
        .wrap_err("Failed to load configuration")?;
    config.merge_with_args(args);
    Ok(config)
}

fn preview(url: &str) -> String {
    preview_url(url, PREVIEW_LEN)
}

async fn read_vehicles(vehicle: &VehicleArgs, input: Option<&Path>) -> Result<Vec<Vehicle>> {
    match input {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            Vehicle::parse_batch(&content)
                .wrap_err_with(|| format!("Invalid vehicle JSON in {}", path.display()))
        }
        None => Ok(vec![vehicle.to_vehicle()]),
    }
}

async fn run_resolve(engine: &ResolverEngine, vehicles: &[Vehicle], as_json: bool) -> Result<()> {
    let resolutions = engine.resolve_all(vehicles).await;

    if as_json {
        let rows: Vec<_> = vehicles
            .iter()
            .zip(&resolutions)
            .map(|(vehicle, resolution)| {
                json!({
                    "vehicle": vehicle,
                    "url": resolution.url,
                    "tier": resolution.tier.label(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for (vehicle, resolution) in vehicles.iter().zip(&resolutions) {
            println!(
                "{}\t{}\t{}",
                vehicle.identity,
                resolution.tier,
                preview(&resolution.url)
            );
        }
    }
    Ok(())
}

async fn run_chain(engine: &ResolverEngine, vehicle: &Vehicle, errors: usize) {
    let resolution = engine.resolve(vehicle).await;
    let candidates = engine.candidates(vehicle, &resolution);
    let card = PlaceholderCard::for_vehicle(
        &vehicle.identity,
        engine.brand_color(&vehicle.identity.make),
    );

    println!("{} (resolved from {})", vehicle.identity, resolution.tier);
    for (index, url) in candidates.iter().enumerate() {
        println!("  [{index}] {}", preview(url));
    }

    let mut chain = FallbackChain::new(candidates, card);
    for n in 1..=errors {
        match chain.on_error(chain.attempt()) {
            ChainTransition::Advanced { src, .. } => {
                println!("error {n}: -> {}", preview(&src));
            }
            ChainTransition::Exhausted => println!("error {n}: exhausted"),
            ChainTransition::Ignored => println!("error {n}: ignored"),
        }
    }

    match chain.render() {
        RenderTarget::Image { src, .. } => println!("showing {}", preview(src)),
        RenderTarget::Card(card) => println!("{card}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = vehicle_imagery::VERSION, "Starting {}", vehicle_imagery::NAME);

    let engine = ResolverEngine::open(&config)
        .await
        .wrap_err("Failed to open image cache")?;

    match args.command {
        Command::Resolve {
            vehicle,
            input,
            json,
        } => {
            let vehicles = read_vehicles(&vehicle, input.as_deref()).await?;
            run_resolve(&engine, &vehicles, json).await?;
        }
        Command::Chain { vehicle, errors } => {
            run_chain(&engine, &vehicle.to_vehicle(), errors).await;
        }
        Command::ClearCache => {
            engine.clear().await;
            println!("Cache cleared");
        }
        Command::Stats => println!("{}", engine.stats()),
    }

    engine.close().await;
    Ok(())
}
