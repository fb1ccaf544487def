//! Presentation layer with the runtime fallback chain and terminal card.

/// Terminal text helpers.
pub mod text;
/// Reusable widgets.
pub mod widgets;

pub use text::preview_url;
pub use widgets::{ChainState, ChainTransition, FallbackChain, PlaceholderCard, RenderTarget};
