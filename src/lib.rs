//! Vehicle Imagery - multi-tier vehicle image resolution.
//!
//! This crate picks a display image for a vehicle record through an ordered
//! set of tiers (explicit source, durable cache, external image search,
//! curated catalog, generated placeholder) and provides the runtime fallback
//! chain a renderer walks when images fail to load.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing caches, services and use cases.
pub mod application;
/// Domain layer containing entities, errors, ports and pure services.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing the fallback chain and placeholder card.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "vehicle-imagery";
