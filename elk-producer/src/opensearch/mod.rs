//! OpenSearch implementation of the search backend.
//!
//! This module translates `ConnectionSettings` into transport options and
//! provides `SearchBackend` on top of the `opensearch` crate, which speaks the
//! Elasticsearch-compatible REST API.

mod backend;
mod options;

pub use backend::OpenSearchBackend;
pub use options::{Auth, ClientOptions, DEFAULT_ADDRESS};
