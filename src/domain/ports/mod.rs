mod durable_storage_port;
mod image_catalog_port;
mod image_search_port;

pub use durable_storage_port::{Bucket, DurableStoragePort};
pub use image_catalog_port::ImageCatalogPort;
pub use image_search_port::ImageSearchPort;
