//! Vehicle identity and record types.

use serde::{Deserialize, Serialize};

use super::CacheKey;

/// Trims, collapses inner whitespace and case-folds a make or model string.
///
/// `"Toyota"`, `"toyota "` and `" TOYOTA"` all normalize to `"toyota"`.
#[must_use]
pub fn normalize_term(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Identifying attributes of a vehicle as far as image lookup is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleIdentity {
    /// Manufacturer, as entered.
    #[serde(default)]
    pub make: String,
    /// Model name, as entered.
    #[serde(default)]
    pub model: String,
    /// Model year.
    #[serde(default)]
    pub year: i32,
    /// Cylinder count if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cylinders: Option<u32>,
    /// Fuel type if known.
    #[serde(default, alias = "fuel_type", skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
}

impl VehicleIdentity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: i32) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year,
            cylinders: None,
            fuel_type: None,
        }
    }

    /// Sets the cylinder count.
    #[must_use]
    pub const fn with_cylinders(mut self, cylinders: u32) -> Self {
        self.cylinders = Some(cylinders);
        self
    }

    /// Sets the fuel type.
    #[must_use]
    pub fn with_fuel_type(mut self, fuel_type: impl Into<String>) -> Self {
        self.fuel_type = Some(fuel_type.into());
        self
    }

    /// Normalized make used for every lookup.
    #[must_use]
    pub fn normalized_make(&self) -> String {
        normalize_term(&self.make)
    }

    /// Normalized model used for every lookup.
    #[must_use]
    pub fn normalized_model(&self) -> String {
        normalize_term(&self.model)
    }

    /// Returns true when there is no usable make to look up.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.make.trim().is_empty()
    }

    /// Year if it looks like a real model year.
    #[must_use]
    pub const fn known_year(&self) -> Option<i32> {
        if self.year > 1885 { Some(self.year) } else { None }
    }

    /// Model as an option, `None` when blank.
    #[must_use]
    pub fn known_model(&self) -> Option<&str> {
        let model = self.model.trim();
        if model.is_empty() { None } else { Some(model) }
    }

    /// Cache key for this identity. Year is intentionally not part of it.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.make, &self.model)
    }

    /// Human readable "Make Model" label.
    #[must_use]
    pub fn display_name(&self) -> String {
        let make = self.make.split_whitespace().collect::<Vec<_>>().join(" ");
        let model = self.model.split_whitespace().collect::<Vec<_>>().join(" ");
        match (make.is_empty(), model.is_empty()) {
            (true, true) => "Unknown vehicle".to_string(),
            (false, true) => make,
            (true, false) => model,
            (false, false) => format!("{make} {model}"),
        }
    }
}

impl std::fmt::Display for VehicleIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.known_year() {
            Some(year) => write!(f, "{year} {}", self.display_name()),
            None => write!(f, "{}", self.display_name()),
        }
    }
}

/// A vehicle record as handed over for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Identity fields.
    #[serde(flatten)]
    pub identity: VehicleIdentity,
    /// Image URL carried by the record itself, if any.
    #[serde(default, alias = "image", alias = "image_url")]
    pub image_url: Option<String>,
}

impl Vehicle {
    /// Creates a record without an explicit image.
    #[must_use]
    pub const fn new(identity: VehicleIdentity) -> Self {
        Self {
            identity,
            image_url: None,
        }
    }

    /// Attaches an explicit image URL.
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// A JSON document holding one vehicle or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum VehicleBatch {
    Many(Vec<Vehicle>),
    One(Box<Vehicle>),
}

impl Vehicle {
    /// Parses a JSON object or array of vehicle records.
    ///
    /// # Errors
    /// Returns error if the document is neither.
    pub fn parse_batch(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        Ok(match serde_json::from_str::<VehicleBatch>(json)? {
            VehicleBatch::Many(vehicles) => vehicles,
            VehicleBatch::One(vehicle) => vec![*vehicle],
        })
    }
}

impl From<VehicleIdentity> for Vehicle {
    fn from(identity: VehicleIdentity) -> Self {
        Self::new(identity)
    }
}
