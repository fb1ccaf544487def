//! External image search adapter.

mod client;
mod dto;

pub use client::{CustomSearchClient, CustomSearchSettings};
pub use dto::{RawSearchItem, SearchResponse};
