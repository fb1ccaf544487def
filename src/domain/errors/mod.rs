//! Domain error types.

mod search_error;
mod storage_error;

pub use search_error::SearchError;
pub use storage_error::StorageError;
