//! URL reliability classification.
//!
//! A purely syntactic judgement: no network access, no side effects. The
//! policy is permissive on purpose, only known placeholder and broken-image
//! services are rejected.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Hosts serving generic placeholder or broken images.
pub const DEFAULT_BLOCKED_DOMAINS: &[&str] = &[
    "via.placeholder.com",
    "placeholder.com",
    "placehold.it",
    "placehold.co",
    "placeholdit.imgix.net",
    "dummyimage.com",
    "fakeimg.pl",
    "lorempixel.com",
    "loremflickr.com",
    "picsum.photos",
    "placekitten.com",
    "placeimg.com",
];

/// Hosts known to carry accurate vehicle photography. Used as a scoring bonus.
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "wikimedia.org",
    "wikipedia.org",
    "caranddriver.com",
    "motortrend.com",
    "edmunds.com",
    "kbb.com",
    "cars.com",
    "cargurus.com",
    "autotrader.com",
    "netcarshow.com",
    "topgear.com",
    "autoblog.com",
    "carscoops.com",
    "autoevolution.com",
    "images.unsplash.com",
];

static KNOWN_BAD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(placeholder|no[-_]?image|no[-_]?photo|image[-_]?not[-_]?(found|available)|missing[-_]?image|default[-_]?(car|vehicle|image))",
    )
    .expect("Invalid placeholder regex")
});

static DEFAULT_POLICY: LazyLock<ReliabilityPolicy> = LazyLock::new(ReliabilityPolicy::default);

/// Allow and deny lists of domain substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReliabilityPolicy {
    trusted_domains: Vec<String>,
    blocked_domains: Vec<String>,
}

impl ReliabilityPolicy {
    /// Creates a policy from explicit lists.
    #[must_use]
    pub fn new<T, B>(trusted: T, blocked: B) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            trusted_domains: clean(trusted),
            blocked_domains: clean(blocked),
        }
    }

    /// Extends the policy with additional entries.
    #[must_use]
    pub fn extended<T, B>(mut self, trusted: T, blocked: B) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        for domain in clean(trusted) {
            if !self.trusted_domains.contains(&domain) {
                self.trusted_domains.push(domain);
            }
        }
        for domain in clean(blocked) {
            if !self.blocked_domains.contains(&domain) {
                self.blocked_domains.push(domain);
            }
        }
        self
    }

    /// Trusted domain substrings.
    #[must_use]
    pub fn trusted_domains(&self) -> &[String] {
        &self.trusted_domains
    }

    /// Blocked domain substrings.
    #[must_use]
    pub fn blocked_domains(&self) -> &[String] {
        &self.blocked_domains
    }

    /// Returns true if the hostname contains a blocked substring.
    #[must_use]
    pub fn is_blocked_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.blocked_domains.iter().any(|d| host.contains(d.as_str()))
    }

    /// Returns true if the hostname contains a trusted substring.
    #[must_use]
    pub fn is_trusted_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.trusted_domains.iter().any(|d| host.contains(d.as_str()))
    }

    /// Decides whether a URL may be used as a display candidate.
    ///
    /// Fails closed: missing, empty and unparseable input is never reliable.
    /// Accepted schemes are `http`, `https` and inline `data:image/…` URIs.
    #[must_use]
    pub fn is_reliable(&self, url: Option<&str>) -> bool {
        let Some(raw) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            return false;
        };
        let Ok(parsed) = Url::parse(raw) else {
            return false;
        };

        match parsed.scheme() {
            "http" | "https" => parsed
                .host_str()
                .is_some_and(|host| !self.is_blocked_host(host)),
            "data" => parsed.path().starts_with("image/"),
            _ => false,
        }
    }

    /// Returns true for URLs that pass the classifier but look like a
    /// record's own "no picture" stand-in.
    #[must_use]
    pub fn looks_like_placeholder(&self, url: &str) -> bool {
        if url.starts_with("data:") {
            return false;
        }
        KNOWN_BAD_PATTERN.is_match(url)
    }
}

impl Default for ReliabilityPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_TRUSTED_DOMAINS.iter().copied(),
            DEFAULT_BLOCKED_DOMAINS.iter().copied(),
        )
    }
}

/// Classifies a URL against the default policy.
#[must_use]
pub fn is_reliable(url: Option<&str>) -> bool {
    DEFAULT_POLICY.is_reliable(url)
}

fn clean<I>(domains: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    domains
        .into_iter()
        .map(|d| d.into().trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}
