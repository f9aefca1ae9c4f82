//! ELK client implementation.
//!
//! `ElkClient` is the handle application code uses. It builds the backend,
//! probes it at startup, writes documents and log envelopes, and runs reads.
//!
//! Writes are best-effort: they return nothing and every failure is logged.
//! Reads return `Result` and surface every failure to the caller.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{ElkConfig, TargetSettings};
use crate::errors::ElkError;
use crate::interfaces::{BackendResponse, IndexRequest, SearchBackend};
use crate::opensearch::{ClientOptions, OpenSearchBackend};
use crate::queries;
use crate::utils::derived_index_name;
use elk_producer_shared::{LogDocument, SearchResponse, SearchResponseExt};

/// Handle to a search service.
///
/// Cloning is cheap; clones share the backend and its connections. The handle
/// holds no locks and may be used from many tasks at once.
///
/// # Example
///
/// ```no_run
/// use elk_producer::{ElkClient, ElkConfig};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (client, probe_error) = ElkClient::connect(ElkConfig::from_env()?).await?;
/// if let Some(e) = probe_error {
///     eprintln!("starting degraded: {}", e);
/// }
///
/// client.add_log_async(&json!({"event": "started"}));
/// let page = client.get_data(&json!({"query": {"match_all": {}}})).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ElkClient {
    backend: Arc<dyn SearchBackend>,
    target: Arc<TargetSettings>,
}

impl fmt::Debug for ElkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElkClient")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl ElkClient {
    /// Build a client from configuration and probe the service.
    ///
    /// A failed probe does not fail construction: the handle is returned
    /// together with the probe error so callers may start degraded and re-check
    /// later with [`ElkClient::ping`].
    ///
    /// # Returns
    ///
    /// * `Ok((client, None))` - The service answered the ping
    /// * `Ok((client, Some(ElkError::ConnectivityError)))` - The service could not be reached
    /// * `Ok((client, Some(ElkError::ServiceError)))` - The service answered with an error status
    /// * `Err(ElkError::ClientConstructionError)` - The configuration could not be turned into a client
    pub async fn connect(config: ElkConfig) -> Result<(Self, Option<ElkError>), ElkError> {
        let options = ClientOptions::from(&config.connection);
        let backend = OpenSearchBackend::new(&options).inspect_err(|e| {
            error!(error = %e, "Failed to create search client");
        })?;

        let client = Self::from_parts(Arc::new(backend), config.target);
        if options.discover_nodes_on_start {
            client.log_node_probe().await;
        }
        let probe_error = client.startup_probe().await;

        Ok((client, probe_error))
    }

    /// Wrap an existing backend and run the startup probe against it.
    ///
    /// Only the ping (and the cluster info fetch in debug mode) is run. Node
    /// discovery belongs to [`ElkClient::connect`], which knows the connection
    /// settings; call [`SearchBackend::probe_nodes`] directly if needed.
    pub async fn with_backend(
        backend: Arc<dyn SearchBackend>,
        target: TargetSettings,
    ) -> (Self, Option<ElkError>) {
        let client = Self::from_parts(backend, target);
        let probe_error = client.startup_probe().await;
        (client, probe_error)
    }

    /// Wrap an existing backend without probing it.
    pub fn from_parts(backend: Arc<dyn SearchBackend>, target: TargetSettings) -> Self {
        Self {
            backend,
            target: Arc::new(target),
        }
    }

    /// The target settings this client was built with.
    pub fn target(&self) -> &TargetSettings {
        &self.target
    }

    /// Index written by `add_doc`/`add_log` and read by `get_log`.
    pub fn index_name(&self) -> String {
        derived_index_name(&self.target.index, &self.target.url)
    }

    async fn startup_probe(&self) -> Option<ElkError> {
        if self.target.debug_mode {
            self.log_cluster_info().await;
        }

        match self.backend.ping().await {
            Err(e) => {
                let e = match e {
                    ElkError::TransportError(msg) => ElkError::connectivity(msg),
                    other => other,
                };
                warn!(error = %e, "Search service unreachable");
                Some(e)
            }
            Ok(response) if response.is_error() => {
                let text = response.text();
                warn!(
                    status = response.status,
                    response = %text,
                    "Search service returned an error"
                );
                Some(ElkError::service(response.status, text))
            }
            Ok(_) => {
                info!(index = %self.target.index, "Connected to search service");
                None
            }
        }
    }

    async fn log_cluster_info(&self) {
        match self.backend.info().await {
            Err(e) => warn!(error = %e, "Failed to fetch cluster info"),
            Ok(response) if response.is_error() => warn!(
                status = response.status,
                body = %response.body,
                "Cluster info returned an error"
            ),
            Ok(response) => info!(info = %response.body, "Cluster info"),
        }
    }

    async fn log_node_probe(&self) {
        for (address, reachable) in self.backend.probe_nodes().await {
            info!(address = %address, reachable, "Node discovered");
        }
    }

    /// Check that the service is reachable and healthy.
    ///
    /// Returns `true` only when the request went through and the status was
    /// not an error.
    pub async fn ping(&self) -> bool {
        match self.backend.ping().await {
            Err(e) => {
                warn!(error = %e, "Ping failed");
                false
            }
            Ok(response) if response.is_error() => {
                warn!(
                    status = response.status,
                    response = %response.text(),
                    "Ping returned an error"
                );
                false
            }
            Ok(_) => true,
        }
    }

    /// Index a document into the derived index.
    ///
    /// Serialization and transport failures are logged, never returned.
    pub async fn add_doc<T: Serialize + ?Sized>(&self, doc: &T) {
        if let Some(body) = serialize_document(doc) {
            self.write(body, false).await;
        }
    }

    /// Launch [`ElkClient::add_doc`] in the background.
    ///
    /// The document is serialized before returning; the write itself is
    /// detached with no completion or ordering guarantee.
    pub fn add_doc_async<T: Serialize + ?Sized>(&self, doc: &T) {
        let Some(body) = serialize_document(doc) else {
            return;
        };
        let client = self.clone();
        spawn_detached("add_doc", async move { client.write(body, false).await });
    }

    /// Wrap a payload in a [`LogDocument`] and index it with an immediate refresh.
    ///
    /// Failures are logged, never returned.
    pub async fn add_log<T: Serialize + ?Sized>(&self, log: &T) {
        if let Some(body) = serialize_document(&self.envelope(log)) {
            self.write(body, true).await;
        }
    }

    /// Launch [`ElkClient::add_log`] in the background.
    ///
    /// The envelope is stamped and serialized before returning.
    pub fn add_log_async<T: Serialize + ?Sized>(&self, log: &T) {
        let Some(body) = serialize_document(&self.envelope(log)) else {
            return;
        };
        let client = self.clone();
        spawn_detached("add_log", async move { client.write(body, true).await });
    }

    fn envelope<'a, T: ?Sized>(&self, log: &'a T) -> LogDocument<&'a T> {
        LogDocument::new(log, self.target.url.as_str())
    }

    async fn write(&self, body: Value, refresh: bool) {
        let index = self.index_name();

        if self.target.debug_mode && refresh {
            info!(index = %index, body = %body, "Writing log document");
        }

        let request = IndexRequest {
            index: index.clone(),
            body,
            refresh,
        };

        match self.backend.index(request).await {
            Err(e) => error!(index = %index, error = %e, "Failed to index document"),
            Ok(response) if response.is_error() => {
                if self.target.debug_mode {
                    warn!(
                        index = %index,
                        status = response.status,
                        body = %response.body,
                        "Index request returned an error"
                    );
                }
            }
            Ok(response) => debug!(index = %index, status = response.status, "Document indexed"),
        }
    }

    /// Read a page of this client's log envelopes.
    ///
    /// Matches `url` against the configured tag in the derived index, using
    /// the configured pagination window.
    #[instrument(skip(self), fields(url = %self.target.url))]
    pub async fn get_log(&self) -> Result<SearchResponse, ElkError> {
        let query = queries::build_log_query(self.target.from, self.target.size, &self.target.url);
        self.search(&self.index_name(), query).await
    }

    /// Launch [`ElkClient::get_log`] in the background, discarding the result.
    pub fn get_log_async(&self) {
        let client = self.clone();
        spawn_detached("get_log", async move {
            if let Err(e) = client.get_log().await {
                error!(error = %e, "Background log read failed");
            }
        });
    }

    /// Read a page of every document in the base index.
    ///
    /// Unlike [`ElkClient::get_log`] this targets the configured index name
    /// as-is, without the URL digest suffix.
    #[instrument(skip(self), fields(index = %self.target.index))]
    pub async fn get_tee_log(&self) -> Result<SearchResponse, ElkError> {
        let query = queries::build_tee_log_query(self.target.from, self.target.size);
        self.search(&self.target.index, query).await
    }

    /// Run a caller-supplied query body verbatim against the base index.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - The decoded response object, unmodified
    /// * `Err(ElkError::QueryEncodingError)` - If the query cannot be serialized
    /// * `Err(ElkError::TransportError)` - If the request could not be completed
    /// * `Err(ElkError::ServiceError)` - If the service answered with an error status
    /// * `Err(ElkError::ResponseDecodingError)` - If the body is not a JSON object
    pub async fn get_data<Q: Serialize + ?Sized>(
        &self,
        query: &Q,
    ) -> Result<SearchResponse, ElkError> {
        let body =
            serde_json::to_value(query).map_err(|e| ElkError::query_encoding(e.to_string()))?;
        self.search(&self.target.index, body).await
    }

    /// Reading a single document is not supported; this does nothing.
    pub async fn get_doc(&self) {}

    /// Background variant of [`ElkClient::get_doc`]; also does nothing.
    pub fn get_doc_async(&self) {
        let client = self.clone();
        spawn_detached("get_doc", async move { client.get_doc().await });
    }

    async fn search(&self, index: &str, body: Value) -> Result<SearchResponse, ElkError> {
        let response = self.backend.search(index, body).await.inspect_err(|e| {
            error!(index = %index, error = %e, "Search request failed");
        })?;

        if self.target.debug_mode && response.is_error() {
            log_search_error(index, &response);
        }

        let response = response.error_for_status()?;
        response.json().inspect_err(|e| {
            error!(index = %index, error = %e, "Failed to decode search response");
        })
    }
}

fn log_search_error(index: &str, response: &BackendResponse) {
    match response.json() {
        Ok(decoded) => {
            let (kind, reason) = decoded.error_detail().unwrap_or_default();
            warn!(
                index = %index,
                status = response.status,
                error_type = %kind,
                reason = %reason,
                "Search returned an error"
            );
        }
        Err(e) => warn!(
            index = %index,
            status = response.status,
            error = %e,
            "Search returned an unreadable error"
        ),
    }
}

fn serialize_document<T: Serialize + ?Sized>(doc: &T) -> Option<Value> {
    match serde_json::to_value(doc) {
        Ok(body) => Some(body),
        Err(e) => {
            let e = ElkError::serialization(e.to_string());
            error!(error = %e, "Dropping document");
            None
        }
    }
}

/// Run a task on the ambient tokio runtime without keeping its handle.
fn spawn_detached<F>(operation: &'static str, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => drop(handle.spawn(task)),
        Err(e) => error!(
            operation,
            error = %e,
            "No async runtime available, dropping background call"
        ),
    }
}
