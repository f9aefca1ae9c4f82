//! OpenSearch backend implementation.
//!
//! This module provides the concrete implementation of `SearchBackend` using
//! the OpenSearch Rust client. One client is built per configured node and
//! requests rotate across them.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cert::{Certificate, CertificateValidation},
    http::headers::{HeaderName, HeaderValue, AUTHORIZATION},
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    params::Refresh,
    IndexParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::ElkError;
use crate::interfaces::{BackendResponse, IndexRequest, SearchBackend};
use crate::opensearch::options::{Auth, ClientOptions};

struct Node {
    address: String,
    client: OpenSearch,
}

/// `SearchBackend` backed by `opensearch::OpenSearch`.
///
/// # Example
///
/// ```ignore
/// use elk_producer::{ClientOptions, ConnectionSettings, OpenSearchBackend};
///
/// let settings = ConnectionSettings {
///     addresses: vec!["http://localhost:9200".to_string()],
///     ..Default::default()
/// };
/// let backend = OpenSearchBackend::new(&ClientOptions::from(&settings))?;
/// ```
pub struct OpenSearchBackend {
    nodes: Vec<Node>,
    next: AtomicUsize,
}

impl OpenSearchBackend {
    /// Build one transport per configured address.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchBackend)` - A backend ready to send requests
    /// * `Err(ElkError::ClientConstructionError)` - If an address, header,
    ///   proxy or CA certificate is invalid, or the transport cannot be built
    pub fn new(options: &ClientOptions) -> Result<Self, ElkError> {
        let nodes = options
            .node_addresses()
            .into_iter()
            .map(|address| {
                let client = Self::build_client(&address, options)?;
                Ok(Node { address, client })
            })
            .collect::<Result<Vec<_>, ElkError>>()?;

        if !options.retry.disable_retry && options.retry.max_retries > 0 {
            debug!(
                max_retries = options.retry.max_retries,
                retry_on_status = ?options.retry.retry_on_status,
                "Transport sends each request once; retry policy is not replayed"
            );
        }

        info!(
            addresses = ?nodes.iter().map(|n| n.address.as_str()).collect::<Vec<_>>(),
            auth = options.auth.as_ref().map(Auth::kind).unwrap_or("none"),
            "Created OpenSearch backend"
        );

        Ok(Self {
            nodes,
            next: AtomicUsize::new(0),
        })
    }

    fn build_client(address: &str, options: &ClientOptions) -> Result<OpenSearch, ElkError> {
        let url = Url::parse(address).map_err(|e| {
            ElkError::client_construction(format!("Invalid address '{}': {}", address, e))
        })?;

        let conn_pool = SingleNodeConnectionPool::new(url);
        let mut builder = TransportBuilder::new(conn_pool);

        match &options.proxy {
            Some(proxy) => {
                let proxy_url = Url::parse(&proxy.url).map_err(|e| {
                    ElkError::client_construction(format!(
                        "Invalid proxy '{}': {}",
                        proxy.url, e
                    ))
                })?;
                builder = builder.proxy(
                    proxy_url,
                    proxy.username.as_deref(),
                    proxy.password.as_deref(),
                );
            }
            None if options.disable_proxy => builder = builder.disable_proxy(),
            None => {}
        }

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(pem) = &options.ca_cert {
            let cert = Certificate::from_pem(pem).map_err(|e| {
                ElkError::client_construction(format!("Invalid CA certificate: {}", e))
            })?;
            builder = builder.cert_validation(CertificateValidation::Full(cert));
        }

        for (name, value) in &options.headers {
            let (name, value) = parse_header(name, value)?;
            builder = builder.header(name, value);
        }

        match &options.auth {
            Some(Auth::Basic { username, password }) => {
                builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
            }
            Some(Auth::ApiKey(key)) => {
                builder = builder.header(AUTHORIZATION, sensitive(&format!("ApiKey {}", key))?);
            }
            Some(Auth::ServiceToken(token)) => {
                builder = builder.auth(Credentials::Bearer(token.clone()));
            }
            None => {}
        }

        let transport = builder
            .build()
            .map_err(|e| ElkError::client_construction(e.to_string()))?;

        Ok(OpenSearch::new(transport))
    }

    fn node(&self) -> &Node {
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.nodes.len();
        &self.nodes[i]
    }

    async fn read(response: Response) -> Result<BackendResponse, ElkError> {
        let status = response.status_code().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ElkError::transport(e.to_string()))?;
        Ok(BackendResponse { status, body })
    }
}

impl Auth {
    fn kind(&self) -> &'static str {
        match self {
            Auth::ApiKey(_) => "api_key",
            Auth::ServiceToken(_) => "service_token",
            Auth::Basic { .. } => "basic",
        }
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ElkError> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        ElkError::client_construction(format!("Invalid header name '{}': {}", name, e))
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| {
        ElkError::client_construction(format!("Invalid value for header '{}': {}", name, e))
    })?;
    Ok((header_name, header_value))
}

fn sensitive(value: &str) -> Result<HeaderValue, ElkError> {
    let mut header = HeaderValue::from_str(value).map_err(|e| {
        ElkError::client_construction(format!("Invalid authorization value: {}", e))
    })?;
    header.set_sensitive(true);
    Ok(header)
}

#[async_trait]
impl SearchBackend for OpenSearchBackend {
    async fn info(&self) -> Result<BackendResponse, ElkError> {
        let response = self
            .node()
            .client
            .info()
            .send()
            .await
            .map_err(|e| ElkError::transport(e.to_string()))?;
        Self::read(response).await
    }

    async fn ping(&self) -> Result<BackendResponse, ElkError> {
        let response = self
            .node()
            .client
            .ping()
            .send()
            .await
            .map_err(|e| ElkError::transport(e.to_string()))?;
        Self::read(response).await
    }

    async fn index(&self, request: IndexRequest) -> Result<BackendResponse, ElkError> {
        let refresh = if request.refresh {
            Refresh::True
        } else {
            Refresh::False
        };

        let response = self
            .node()
            .client
            .index(IndexParts::Index(&request.index))
            .refresh(refresh)
            .body(request.body)
            .send()
            .await
            .map_err(|e| ElkError::transport(e.to_string()))?;
        Self::read(response).await
    }

    async fn search(&self, index: &str, body: Value) -> Result<BackendResponse, ElkError> {
        let response = self
            .node()
            .client
            .search(SearchParts::Index(&[index]))
            .track_total_hits(true)
            .body(body)
            .send()
            .await
            .map_err(|e| ElkError::transport(e.to_string()))?;
        Self::read(response).await
    }

    async fn probe_nodes(&self) -> Vec<(String, bool)> {
        let mut results = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let reachable = match node.client.ping().send().await {
                Ok(response) => response.status_code().is_success(),
                Err(e) => {
                    warn!(address = %node.address, error = %e, "Node unreachable");
                    false
                }
            };
            results.push((node.address.clone(), reachable));
        }
        results
    }
}
