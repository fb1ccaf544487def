mod fallback_chain;
mod placeholder_card;

pub use fallback_chain::{AttemptId, ChainState, ChainTransition, FallbackChain, RenderTarget};
pub use placeholder_card::PlaceholderCard;
