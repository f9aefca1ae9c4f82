//! Interface definitions for the search backend.
//!
//! This module defines the abstract `SearchBackend` trait that sits between
//! `ElkClient` and the wrapped search-engine library, allowing the backend to
//! be swapped for a mock in tests.

mod search_backend;

pub use search_backend::{BackendResponse, IndexRequest, SearchBackend};
