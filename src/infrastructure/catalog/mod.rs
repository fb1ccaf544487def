//! Static image catalog adapter.

mod static_catalog;

pub use static_catalog::{DEFAULT_CATALOG_BASE, StaticImageCatalog};
