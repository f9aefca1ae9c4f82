//! Search backend trait definition.
//!
//! The backend performs single raw requests. It reports transport failures as
//! `Err(ElkError::TransportError)` and hands every HTTP response back as a
//! `BackendResponse`, error statuses included; interpreting the status is
//! left to the caller.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ElkError;
use elk_producer_shared::SearchResponse;

/// A single-document write.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRequest {
    /// Target index name.
    pub index: String,
    /// Serialized document.
    pub body: Value,
    /// Ask the service to refresh so the document is immediately searchable.
    pub refresh: bool,
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: String,
}

impl BackendResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status signals an error (anything above 299).
    pub fn is_error(&self) -> bool {
        self.status > 299
    }

    /// Response text used in logs and service errors.
    ///
    /// Bodiless responses (such as `HEAD /`) are described by their status.
    pub fn text(&self) -> String {
        if self.body.is_empty() {
            format!("[{}]", self.status)
        } else {
            format!("[{}] {}", self.status, self.body)
        }
    }

    /// Convert an error status into `ElkError::ServiceError`.
    pub fn error_for_status(self) -> Result<Self, ElkError> {
        if self.is_error() {
            Err(ElkError::service(self.status, self.body))
        } else {
            Ok(self)
        }
    }

    /// Decode the body as a JSON object.
    pub fn json(&self) -> Result<SearchResponse, ElkError> {
        serde_json::from_str::<SearchResponse>(&self.body)
            .map_err(|e| ElkError::response_decoding(e.to_string()))
    }
}

/// Raw access to a search service.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one backend is shared by every
/// clone of `ElkClient` and by detached background writes.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fetch cluster information (`GET /`).
    async fn info(&self) -> Result<BackendResponse, ElkError>;

    /// Lightweight health check (`HEAD /`).
    async fn ping(&self) -> Result<BackendResponse, ElkError>;

    /// Index one document with a server-generated ID.
    async fn index(&self, request: IndexRequest) -> Result<BackendResponse, ElkError>;

    /// Run a search body against an index.
    async fn search(&self, index: &str, body: Value) -> Result<BackendResponse, ElkError>;

    /// Ping every configured node individually, returning `(address, reachable)`.
    ///
    /// Single-node backends may rely on the default, which pings once.
    async fn probe_nodes(&self) -> Vec<(String, bool)> {
        let reachable = matches!(self.ping().await, Ok(ref r) if !r.is_error());
        vec![("default".to_string(), reachable)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that only answers pings, relying on the default `probe_nodes`.
    struct PingOnly {
        ping_result: Result<BackendResponse, ElkError>,
        pings: AtomicUsize,
    }

    impl PingOnly {
        fn new(ping_result: Result<BackendResponse, ElkError>) -> Self {
            Self {
                ping_result,
                pings: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchBackend for PingOnly {
        async fn info(&self) -> Result<BackendResponse, ElkError> {
            Ok(BackendResponse::new(200, "{}"))
        }

        async fn ping(&self) -> Result<BackendResponse, ElkError> {
            self.pings.fetch_add(1, Ordering::SeqCst);
            self.ping_result.clone()
        }

        async fn index(&self, _request: IndexRequest) -> Result<BackendResponse, ElkError> {
            Ok(BackendResponse::new(201, "{}"))
        }

        async fn search(&self, _index: &str, _body: Value) -> Result<BackendResponse, ElkError> {
            Ok(BackendResponse::new(200, "{}"))
        }
    }

    #[tokio::test]
    async fn test_default_probe_nodes_pings_once() {
        let backend = PingOnly::new(Ok(BackendResponse::new(200, "")));
        let nodes = backend.probe_nodes().await;

        assert_eq!(nodes, vec![("default".to_string(), true)]);
        assert_eq!(backend.pings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_default_probe_nodes_reports_unreachable() {
        let backend = PingOnly::new(Err(ElkError::transport("connection refused")));
        assert_eq!(
            backend.probe_nodes().await,
            vec![("default".to_string(), false)]
        );

        let backend = PingOnly::new(Ok(BackendResponse::new(503, "")));
        assert_eq!(
            backend.probe_nodes().await,
            vec![("default".to_string(), false)]
        );
    }

    #[test]
    fn test_is_error_boundary() {
        assert!(!BackendResponse::new(200, "").is_error());
        assert!(!BackendResponse::new(201, "").is_error());
        assert!(!BackendResponse::new(299, "").is_error());
        assert!(BackendResponse::new(300, "").is_error());
        assert!(BackendResponse::new(401, "").is_error());
    }

    #[test]
    fn test_text() {
        assert_eq!(BackendResponse::new(401, "").text(), "[401]");
        assert_eq!(
            BackendResponse::new(404, "{\"found\":false}").text(),
            "[404] {\"found\":false}"
        );
    }

    #[test]
    fn test_error_for_status() {
        let ok = BackendResponse::new(200, "{}").error_for_status();
        assert!(ok.is_ok());

        let err = BackendResponse::new(403, "forbidden")
            .error_for_status()
            .unwrap_err();
        assert_eq!(err, ElkError::service(403, "forbidden"));
    }

    #[test]
    fn test_json_object() {
        let response = BackendResponse::new(200, r#"{"hits":{"total":{"value":1}}}"#);
        let map = response.json().unwrap();
        assert_eq!(map["hits"]["total"]["value"], 1);
    }

    #[test]
    fn test_json_rejects_non_object() {
        let response = BackendResponse::new(200, "[1,2,3]");
        assert!(matches!(
            response.json().unwrap_err(),
            ElkError::ResponseDecodingError(_)
        ));

        let response = BackendResponse::new(200, "");
        assert!(matches!(
            response.json().unwrap_err(),
            ElkError::ResponseDecodingError(_)
        ));
    }
}
