//! Runtime fallback chain for a rendered vehicle image.

use tracing::{debug, trace};

use super::placeholder_card::PlaceholderCard;

/// Where the chain currently points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// Showing the resolved URL.
    Primary,
    /// Showing the candidate at this index.
    Fallback(usize),
    /// Every candidate failed; only the card is shown.
    Exhausted,
}

/// Identifies one load attempt. Error events carry the id of the attempt
/// they belong to; events for any other attempt are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(u64);

impl AttemptId {
    /// Raw attempt number.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Result of feeding an event into the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainTransition {
    /// Moved to the next candidate.
    Advanced {
        /// New image source.
        src: String,
        /// Attempt the new source is loaded under.
        attempt: AttemptId,
    },
    /// Ran out of candidates.
    Exhausted,
    /// Stale, duplicate or post-terminal event; nothing changed.
    Ignored,
}

/// What to draw right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget<'a> {
    /// An image element.
    Image {
        /// Source URL.
        src: &'a str,
        /// Attempt whose error events the element reports.
        attempt: AttemptId,
    },
    /// The terminal text card.
    Card(&'a PlaceholderCard),
}

/// Cursor over precomputed candidates, advanced by load errors.
#[derive(Debug, Clone)]
pub struct FallbackChain {
    candidates: Vec<String>,
    state: ChainState,
    attempt: AttemptId,
    loaded: bool,
    card: PlaceholderCard,
}

impl FallbackChain {
    /// Creates a chain over `candidates`, the first being the resolved URL.
    /// An empty list starts exhausted.
    #[must_use]
    pub fn new(candidates: Vec<String>, card: PlaceholderCard) -> Self {
        let state = if candidates.is_empty() {
            ChainState::Exhausted
        } else {
            ChainState::Primary
        };
        Self {
            candidates,
            state,
            attempt: AttemptId(0),
            loaded: false,
            card,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ChainState {
        self.state
    }

    /// Current attempt id.
    #[must_use]
    pub const fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Candidate list.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Terminal card.
    #[must_use]
    pub const fn card(&self) -> &PlaceholderCard {
        &self.card
    }

    /// Returns true once every candidate failed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.state, ChainState::Exhausted)
    }

    /// Returns true if the current source finished loading.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Source of the current attempt, `None` when exhausted.
    #[must_use]
    pub fn current_src(&self) -> Option<&str> {
        let index = match self.state {
            ChainState::Primary => 0,
            ChainState::Fallback(index) => index,
            ChainState::Exhausted => return None,
        };
        self.candidates.get(index).map(String::as_str)
    }

    /// What to draw for the current state.
    #[must_use]
    pub fn render(&self) -> RenderTarget<'_> {
        match self.current_src() {
            Some(src) => RenderTarget::Image {
                src,
                attempt: self.attempt,
            },
            None => RenderTarget::Card(&self.card),
        }
    }

    /// Marks the current attempt as loaded. Later errors for it are ignored.
    pub fn on_load(&mut self, attempt: AttemptId) {
        if attempt == self.attempt && !self.is_exhausted() {
            trace!(attempt = attempt.as_u64(), "Image loaded");
            self.loaded = true;
        }
    }

    /// Handles a load error reported by attempt `attempt`.
    ///
    /// Only the first error of the live attempt moves the cursor. Each
    /// advance issues a new attempt id, which retires the old one.
    pub fn on_error(&mut self, attempt: AttemptId) -> ChainTransition {
        if self.is_exhausted() || self.loaded || attempt != self.attempt {
            trace!(
                attempt = attempt.as_u64(),
                current = self.attempt.as_u64(),
                "Ignoring image error"
            );
            return ChainTransition::Ignored;
        }

        let next = match self.state {
            ChainState::Primary => 1,
            ChainState::Fallback(index) => index + 1,
            ChainState::Exhausted => return ChainTransition::Ignored,
        };
        self.attempt = AttemptId(self.attempt.0 + 1);

        if let Some(src) = self.candidates.get(next) {
            debug!(index = next, src = %src, "Advancing image fallback");
            self.state = ChainState::Fallback(next);
            ChainTransition::Advanced {
                src: src.clone(),
                attempt: self.attempt,
            }
        } else {
            debug!(candidates = self.candidates.len(), "Image fallbacks exhausted");
            self.state = ChainState::Exhausted;
            ChainTransition::Exhausted
        }
    }
}
