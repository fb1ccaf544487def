//! Search queries, validated search results and scored candidates.

use url::Url;

use super::vehicle::normalize_term;

/// One keyword query against the external image search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Normalized make.
    pub make: String,
    /// Normalized model, if this variant includes it.
    pub model: Option<String>,
    /// Year, if this variant includes it.
    pub year: Option<i32>,
}

impl SearchQuery {
    /// Creates a query from raw fields. Blank models are dropped.
    #[must_use]
    pub fn new(make: &str, model: Option<&str>, year: Option<i32>) -> Self {
        Self {
            make: normalize_term(make),
            model: model.map(normalize_term).filter(|m| !m.is_empty()),
            year,
        }
    }

    /// Query variants from most to least specific:
    /// make+model+year, make+model, make.
    ///
    /// Variants that would repeat a previous one are skipped.
    #[must_use]
    pub fn variants(make: &str, model: Option<&str>, year: Option<i32>) -> Vec<Self> {
        let full = Self::new(make, model, year);
        if full.make.is_empty() {
            return Vec::new();
        }

        let mut variants = vec![full.clone()];
        for candidate in [
            Self {
                year: None,
                ..full.clone()
            },
            Self {
                model: None,
                year: None,
                ..full
            },
        ] {
            if !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
        variants
    }

    /// The query string sent to the search API.
    #[must_use]
    pub fn text(&self) -> String {
        let mut parts = vec![self.make.clone()];
        if let Some(model) = &self.model {
            parts.push(model.clone());
        }
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        parts.push("car".to_string());
        parts.join(" ")
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// A search API result that passed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    link: String,
    host: String,
    title: String,
    snippet: String,
}

impl SearchItem {
    /// Validates a raw result. The link must parse as an http(s) URL with a host.
    #[must_use]
    pub fn new(
        link: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Option<Self> {
        let link = link.into();
        let parsed = Url::parse(link.trim()).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        let host = parsed.host_str()?.to_lowercase();

        Some(Self {
            link: link.trim().to_string(),
            host,
            title: title.into(),
            snippet: snippet.into(),
        })
    }

    /// Image URL.
    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Lowercased hostname of the image URL.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Title of the page hosting the image.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Text snippet around the image.
    #[must_use]
    pub fn snippet(&self) -> &str {
        &self.snippet
    }
}

/// A scored search result. Only lives for one search-and-score cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateImage {
    /// Image URL.
    pub url: String,
    /// Relevance score.
    pub score: f64,
    /// Title of the page the image came from.
    pub source_title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_most_specific_first() {
        let variants = SearchQuery::variants("Toyota", Some("Camry"), Some(2023));
        let texts: Vec<String> = variants.iter().map(SearchQuery::text).collect();
        assert_eq!(
            texts,
            vec![
                "toyota camry 2023 car",
                "toyota camry car",
                "toyota car"
            ]
        );
    }

    #[test]
    fn test_variants_skip_duplicates() {
        let variants = SearchQuery::variants("Toyota", None, None);
        assert_eq!(variants.len(), 1);

        let variants = SearchQuery::variants("Toyota", Some("  "), Some(2020));
        assert_eq!(variants.len(), 2);
    }

    #[test]
    fn test_variants_empty_for_blank_make() {
        assert!(SearchQuery::variants("  ", Some("Camry"), None).is_empty());
    }

    #[test]
    fn test_search_item_validation() {
        assert!(SearchItem::new("https://img.example.org/a.jpg", "t", "s").is_some());
        assert!(SearchItem::new("", "t", "s").is_none());
        assert!(SearchItem::new("not a url", "t", "s").is_none());
        assert!(SearchItem::new("ftp://files.example.org/a.jpg", "t", "s").is_none());

        let item = SearchItem::new(" https://IMG.Example.org/a.jpg ", "", "").unwrap();
        assert_eq!(item.host(), "img.example.org");
        assert_eq!(item.link(), "https://IMG.Example.org/a.jpg");
    }
}
