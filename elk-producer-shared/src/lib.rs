//! # ELK Producer Shared
//!
//! This crate defines the data structures shared by the elk-producer client:
//! the timestamped envelope used for log writes and the untyped response
//! returned from every search.

pub mod types;

pub use types::log_document::LogDocument;
pub use types::search_response::{SearchResponse, SearchResponseExt};
