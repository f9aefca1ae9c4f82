//! Error types for the elk-producer client.

mod elk_error;

pub use elk_error::ElkError;
