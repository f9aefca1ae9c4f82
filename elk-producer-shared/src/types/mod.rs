//! This module defines the core data structures used across elk-producer.
//! It re-exports `LogDocument` and the `SearchResponse` helpers.

pub mod log_document;
pub mod search_response;

pub use log_document::LogDocument;
pub use search_response::{SearchResponse, SearchResponseExt};
