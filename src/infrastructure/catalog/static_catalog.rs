//! Built-in catalog of curated brand and model images.

use crate::domain::entities::normalize_term;
use crate::domain::ports::ImageCatalogPort;

/// Reserved stand-in host for the curated catalog assets.
///
/// Nothing is served here. Deployments set `catalog.base_url` to a server
/// holding `brands/<brand>.jpg`, `models/<brand>/<model>.jpg` and
/// `stock/*.jpg`; until then catalog candidates fail to load and the
/// fallback chain ends on the inline placeholder card.
pub const DEFAULT_CATALOG_BASE: &str = "https://assets.vehicle-imagery.dev/catalog";

const GENERIC_BRAND: &str = "generic";

/// Known brands with their accent colour.
const BRANDS: &[(&str, &str)] = &[
    ("acura", "#000000"),
    ("audi", "#bb0a30"),
    ("bmw", "#1c69d4"),
    ("buick", "#3c3c3c"),
    ("cadillac", "#a6875b"),
    ("chevrolet", "#c79a2c"),
    ("chrysler", "#0b2f5b"),
    ("dodge", "#c8102e"),
    ("ferrari", "#d40000"),
    ("fiat", "#8b1e2e"),
    ("ford", "#003478"),
    ("gmc", "#c8102e"),
    ("honda", "#cc0000"),
    ("hyundai", "#002c5f"),
    ("jaguar", "#0c121c"),
    ("jeep", "#374b31"),
    ("kia", "#05141f"),
    ("land rover", "#005a2b"),
    ("lexus", "#1a1a1a"),
    ("mazda", "#101010"),
    ("mercedes-benz", "#00adef"),
    ("mini", "#000000"),
    ("mitsubishi", "#e60012"),
    ("nissan", "#c3002f"),
    ("porsche", "#b12b28"),
    ("ram", "#1d1d1b"),
    ("subaru", "#013c74"),
    ("tesla", "#cc0000"),
    ("toyota", "#eb0a1e"),
    ("volkswagen", "#001e50"),
    ("volvo", "#003057"),
];

/// Common spellings mapped to the catalog's brand name.
const ALIASES: &[(&str, &str)] = &[
    ("chevy", "chevrolet"),
    ("vw", "volkswagen"),
    ("mercedes", "mercedes-benz"),
    ("mercedes benz", "mercedes-benz"),
    ("landrover", "land rover"),
    ("range rover", "land rover"),
];

/// Models with a dedicated image.
const MODELS: &[(&str, &str)] = &[
    ("bmw", "3 series"),
    ("bmw", "x5"),
    ("chevrolet", "silverado"),
    ("chevrolet", "corvette"),
    ("ford", "f-150"),
    ("ford", "mustang"),
    ("ford", "explorer"),
    ("honda", "civic"),
    ("honda", "accord"),
    ("honda", "cr-v"),
    ("hyundai", "elantra"),
    ("jeep", "wrangler"),
    ("mazda", "mx-5"),
    ("nissan", "altima"),
    ("porsche", "911"),
    ("subaru", "outback"),
    ("tesla", "model 3"),
    ("tesla", "model y"),
    ("toyota", "camry"),
    ("toyota", "corolla"),
    ("toyota", "rav4"),
    ("toyota", "tacoma"),
    ("volkswagen", "golf"),
];

const STOCK: &[&str] = &["sedan", "suv", "hatchback"];

/// Static lookup tables served from a base URL.
#[derive(Debug, Clone)]
pub struct StaticImageCatalog {
    base_url: String,
}

impl StaticImageCatalog {
    /// Creates a catalog serving from `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Base URL of the catalog assets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Canonical brand name, or `None` for brands the catalog lacks.
    fn brand(make: &str) -> Option<&'static str> {
        let make = normalize_term(make);
        let make = ALIASES
            .iter()
            .find(|(alias, _)| *alias == make)
            .map_or(make.as_str(), |(_, brand)| *brand);
        BRANDS.iter().find(|(name, _)| *name == make).map(|(name, _)| *name)
    }

    fn asset(&self, parts: &[&str]) -> String {
        let path: Vec<String> = parts.iter().map(|p| p.replace(' ', "-")).collect();
        format!("{}/{}.jpg", self.base_url, path.join("/"))
    }
}

impl Default for StaticImageCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_BASE)
    }
}

impl ImageCatalogPort for StaticImageCatalog {
    fn default_image(&self, make: &str) -> String {
        let brand = Self::brand(make).unwrap_or(GENERIC_BRAND);
        self.asset(&["brands", brand])
    }

    fn model_image(&self, make: &str, model: &str) -> String {
        let model = normalize_term(model);
        match Self::brand(make) {
            Some(brand) if MODELS.iter().any(|(b, m)| *b == brand && *m == model) => {
                self.asset(&["models", brand, model.as_str()])
            }
            _ => self.default_image(make),
        }
    }

    fn stock_images(&self) -> Vec<String> {
        STOCK.iter().map(|kind| self.asset(&["stock", kind])).collect()
    }

    fn brand_color(&self, make: &str) -> Option<String> {
        let brand = Self::brand(make)?;
        BRANDS
            .iter()
            .find(|(name, _)| *name == brand)
            .map(|(_, color)| (*color).to_string())
    }
}
