//! # ELK Producer
//!
//! A thin client over the `opensearch` crate for shipping documents and
//! timestamped logs into an Elasticsearch-compatible service and reading them
//! back. Writes are best-effort and never return errors; reads surface every
//! failure as an [`ElkError`].

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod queries;
pub mod utils;

pub use client::ElkClient;
pub use config::{
    ConnectionSettings, ElkConfig, ProxySettings, RetrySettings, TargetSettings,
    TransportSettings,
};
pub use errors::ElkError;
pub use interfaces::{BackendResponse, IndexRequest, SearchBackend};
pub use crate::opensearch::{ClientOptions, OpenSearchBackend};
pub use utils::derived_index_name;

pub use elk_producer_shared::{LogDocument, SearchResponse, SearchResponseExt};
