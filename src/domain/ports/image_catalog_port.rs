//! Static image catalog port definition.

/// Lookup table of curated brand and model images.
///
/// Both lookups are keyed by normalized strings and always return a
/// non-empty URL, falling back to the catalog's own default for unknown
/// brands.
pub trait ImageCatalogPort: Send + Sync {
    /// Default image for a brand.
    fn default_image(&self, make: &str) -> String;

    /// Image for a specific brand and model.
    fn model_image(&self, make: &str, model: &str) -> String;

    /// Generic stock vehicle photos, brand agnostic.
    fn stock_images(&self) -> Vec<String>;

    /// Brand accent colour as `#rrggbb`, if the catalog knows one.
    fn brand_color(&self, make: &str) -> Option<String>;
}
