//! Cache key derivation.

use serde::{Deserialize, Serialize};

use super::vehicle::normalize_term;

/// Version tag baked into every key. Bumping it orphans all previously
/// persisted entries, which are then dropped on load.
pub const RESOLVER_VERSION: &str = "v4";

/// Deterministic key for a (make, model, resolver version) tuple.
///
/// Rendered as `"{version}:{make}/{model}"`, e.g. `"v4:toyota/camry"`.
/// Slugs never contain `/`, so distinct tuples never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the key for the current resolver version.
    #[must_use]
    pub fn new(make: &str, model: &str) -> Self {
        Self::with_version(make, model, RESOLVER_VERSION)
    }

    /// Builds the key for an explicit resolver version.
    #[must_use]
    pub fn with_version(make: &str, model: &str, version: &str) -> Self {
        let make = slug(make);
        let model = slug(model);
        let subject = if model.is_empty() {
            make
        } else {
            format!("{make}/{model}")
        };
        Self(format!("{version}:{subject}"))
    }

    /// Parses a persisted key. Returns `None` for keys without a version tag.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (version, subject) = raw.split_once(':')?;
        if version.is_empty() || subject.is_empty() {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    /// The version tag portion.
    #[must_use]
    pub fn version(&self) -> &str {
        self.0.split_once(':').map_or("", |(version, _)| version)
    }

    /// The normalized make/model portion, e.g. `"toyota/camry"`.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.0.split_once(':').map_or(&self.0, |(_, subject)| subject)
    }

    /// Returns true if the key was produced by the running resolver version.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.version() == RESOLVER_VERSION
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn slug(value: &str) -> String {
    normalize_term(value).replace([' ', '/'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = CacheKey::new("Toyota", "Camry");
        assert_eq!(key.as_str(), "v4:toyota/camry");
        assert_eq!(key.subject(), "toyota/camry");
        assert!(key.is_current());
    }

    #[test]
    fn test_key_without_model() {
        let key = CacheKey::new(" BMW ", "");
        assert_eq!(key.subject(), "bmw");
    }

    #[test]
    fn test_multi_word_model_is_hyphenated() {
        let key = CacheKey::new("Land Rover", "Range  Rover Sport");
        assert_eq!(key.subject(), "land-rover/range-rover-sport");
    }

    #[test]
    fn test_word_split_between_make_and_model_is_distinct() {
        assert_ne!(
            CacheKey::new("Land Rover", "Defender"),
            CacheKey::new("Land", "Rover Defender")
        );
        assert_ne!(
            CacheKey::new("Mercedes-Benz", "C"),
            CacheKey::new("Mercedes", "Benz-C")
        );
        assert_ne!(CacheKey::new("A/B", "C"), CacheKey::new("A", "B/C"));
        assert_ne!(CacheKey::new("Ford", ""), CacheKey::new("For", "d"));
    }

    #[test]
    fn test_version_changes_key() {
        let current = CacheKey::new("Toyota", "Camry");
        let old = CacheKey::with_version("Toyota", "Camry", "v1");
        assert_ne!(current, old);
        assert!(!old.is_current());
    }

    #[test]
    fn test_parse_rejects_untagged() {
        assert!(CacheKey::parse("toyota/camry").is_none());
        assert!(CacheKey::parse(":toyota").is_none());
        assert_eq!(
            CacheKey::parse("v4:toyota/camry"),
            Some(CacheKey::new("toyota", "camry"))
        );
    }
}
