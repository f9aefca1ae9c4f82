//! ELK client error types.
//!
//! This module defines the single error type shared by construction, the
//! connectivity probe and the read path. The write path only ever logs these.

use thiserror::Error;

/// Errors produced by the ELK client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ElkError {
    /// The underlying client could not be built from the configuration.
    #[error("Client construction error: {0}")]
    ClientConstructionError(String),

    /// The service could not be reached (DNS, refused connection, timeout).
    #[error("Connectivity error: {0}")]
    ConnectivityError(String),

    /// The service answered with an error status.
    #[error("Service error [{status}]: {body}")]
    ServiceError { status: u16, body: String },

    /// A document could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A request could not be sent or its response could not be read.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// A query body could not be encoded.
    #[error("Query encoding error: {0}")]
    QueryEncodingError(String),

    /// A response body was not a JSON object.
    #[error("Response decoding error: {0}")]
    ResponseDecodingError(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ElkError {
    /// Create a client construction error.
    pub fn client_construction(msg: impl Into<String>) -> Self {
        Self::ClientConstructionError(msg.into())
    }

    /// Create a connectivity error.
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::ConnectivityError(msg.into())
    }

    /// Create a service error from a status code and response text.
    pub fn service(status: u16, body: impl Into<String>) -> Self {
        Self::ServiceError {
            status,
            body: body.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a query encoding error.
    pub fn query_encoding(msg: impl Into<String>) -> Self {
        Self::QueryEncodingError(msg.into())
    }

    /// Create a response decoding error.
    pub fn response_decoding(msg: impl Into<String>) -> Self {
        Self::ResponseDecodingError(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Whether a client handle is still usable after this error was reported
    /// by the startup probe.
    pub fn is_degraded_start(&self) -> bool {
        matches!(
            self,
            Self::ConnectivityError(_) | Self::ServiceError { .. }
        )
    }
}
