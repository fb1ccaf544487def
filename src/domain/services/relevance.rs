//! Heuristic relevance scoring of image search results.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::trace;

use super::reliability::ReliabilityPolicy;
use crate::domain::entities::{CandidateImage, SearchItem, SearchQuery};

/// Minimum score a candidate needs to be accepted.
pub const ACCEPTANCE_THRESHOLD: f64 = 3.0;

/// Words suggesting a photo of the whole vehicle.
pub const VEHICLE_KEYWORDS: &[&str] = &[
    "car",
    "exterior",
    "vehicle",
    "sedan",
    "suv",
    "coupe",
    "hatchback",
    "wagon",
    "truck",
    "pickup",
    "convertible",
    "review",
    "front",
    "side view",
];

/// Words suggesting anything but a photo of the whole vehicle.
pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "interior",
    "logo",
    "person",
    "people",
    "dashboard",
    "engine",
    "emblem",
    "badge",
    "cartoon",
    "drawing",
    "diagram",
];

const MAKE_IN_TEXT: f64 = 5.0;
const MAKE_IN_URL: f64 = 3.0;
const MODEL_IN_TEXT: f64 = 4.0;
const MODEL_IN_URL: f64 = 2.0;
const YEAR_IN_TEXT: f64 = 2.0;
const KEYWORD_IN_TITLE: f64 = 1.0;
const KEYWORD_IN_SNIPPET: f64 = 0.5;
const TRUSTED_HOST: f64 = 10.0;
const NEGATIVE_KEYWORD: f64 = -2.0;

/// Scores search results against a query.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    policy: Arc<ReliabilityPolicy>,
    threshold: f64,
}

impl RelevanceScorer {
    /// Creates a scorer using the default acceptance threshold.
    #[must_use]
    pub const fn new(policy: Arc<ReliabilityPolicy>) -> Self {
        Self {
            policy,
            threshold: ACCEPTANCE_THRESHOLD,
        }
    }

    /// Overrides the acceptance threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Current acceptance threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scores one result. Returns `None` if its host is blocked.
    #[must_use]
    pub fn score(&self, item: &SearchItem, query: &SearchQuery) -> Option<CandidateImage> {
        if self.policy.is_blocked_host(item.host()) {
            trace!(url = %item.link(), "Rejected candidate from blocked host");
            return None;
        }

        let title = item.title().to_lowercase();
        let snippet = item.snippet().to_lowercase();
        let url = item.link().to_lowercase();
        let in_text = |term: &str| title.contains(term) || snippet.contains(term);

        let mut score = 0.0;

        if in_text(&query.make) {
            score += MAKE_IN_TEXT;
        }
        if url_mentions(&url, &query.make) {
            score += MAKE_IN_URL;
        }

        if let Some(model) = &query.model {
            if in_text(model) {
                score += MODEL_IN_TEXT;
            }
            if url_mentions(&url, model) {
                score += MODEL_IN_URL;
            }
        }

        if let Some(year) = query.year
            && in_text(&year.to_string())
        {
            score += YEAR_IN_TEXT;
        }

        for keyword in VEHICLE_KEYWORDS {
            if title.contains(keyword) {
                score += KEYWORD_IN_TITLE;
            }
            if snippet.contains(keyword) {
                score += KEYWORD_IN_SNIPPET;
            }
        }

        if self.policy.is_trusted_host(item.host()) {
            score += TRUSTED_HOST;
        }

        for keyword in NEGATIVE_KEYWORDS {
            if in_text(keyword) {
                score += NEGATIVE_KEYWORD;
            }
        }

        trace!(url = %item.link(), score, "Scored candidate");

        Some(CandidateImage {
            url: item.link().to_string(),
            score,
            source_title: item.title().to_string(),
        })
    }

    /// Scores every result and sorts by score, best first.
    /// Equal scores keep their API order.
    #[must_use]
    pub fn rank(&self, items: &[SearchItem], query: &SearchQuery) -> Vec<CandidateImage> {
        let mut ranked: Vec<CandidateImage> = items
            .iter()
            .filter_map(|item| self.score(item, query))
            .collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked
    }

    /// Picks the best result if it reaches the acceptance threshold.
    #[must_use]
    pub fn select(&self, items: &[SearchItem], query: &SearchQuery) -> Option<CandidateImage> {
        self.rank(items, query)
            .into_iter()
            .find(|candidate| candidate.score >= self.threshold)
    }
}

/// Checks a lowercased URL for a term, allowing `-`, `_` or no separator
/// in place of spaces (`land rover` matches `land-rover` and `landrover`).
fn url_mentions(url: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    if !term.contains(' ') {
        return url.contains(term);
    }
    ["-", "_", "", "+", "%20"]
        .iter()
        .any(|sep| url.contains(&term.replace(' ', sep)))
}
