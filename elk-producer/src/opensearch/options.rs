//! Transport options derived from connection settings.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::{ConnectionSettings, ProxySettings, RetrySettings};

/// Node used when no address is configured.
pub const DEFAULT_ADDRESS: &str = "http://localhost:9200";

/// Resolved authentication mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: ApiKey <key>`.
    ApiKey(String),
    /// `Authorization: Bearer <token>`.
    ServiceToken(String),
    /// HTTP Basic.
    Basic { username: String, password: String },
}

impl Auth {
    /// Pick the authentication mode from connection settings.
    ///
    /// An API key wins over a service token, which wins over basic credentials.
    /// Returns `None` when nothing is configured.
    pub fn resolve(settings: &ConnectionSettings) -> Option<Self> {
        if !settings.api_key.is_empty() {
            Some(Self::ApiKey(settings.api_key.clone()))
        } else if !settings.service_token.is_empty() {
            Some(Self::ServiceToken(settings.service_token.clone()))
        } else if !settings.username.is_empty() || !settings.password.is_empty() {
            Some(Self::Basic {
                username: settings.username.clone(),
                password: settings.password.clone(),
            })
        } else {
            None
        }
    }
}

/// Connection settings in the shape the `opensearch` transport builder consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub addresses: Vec<String>,
    pub auth: Option<Auth>,
    pub ca_cert: Option<Vec<u8>>,
    pub headers: BTreeMap<String, String>,
    pub retry: RetrySettings,
    pub timeout: Option<Duration>,
    pub proxy: Option<ProxySettings>,
    pub disable_proxy: bool,
    pub discover_nodes_on_start: bool,
}

impl ClientOptions {
    /// Addresses to connect to, falling back to [`DEFAULT_ADDRESS`].
    pub fn node_addresses(&self) -> Vec<String> {
        if self.addresses.is_empty() {
            vec![DEFAULT_ADDRESS.to_string()]
        } else {
            self.addresses.clone()
        }
    }
}

impl From<&ConnectionSettings> for ClientOptions {
    fn from(settings: &ConnectionSettings) -> Self {
        Self {
            addresses: settings.addresses.clone(),
            auth: Auth::resolve(settings),
            ca_cert: settings.ca_cert.clone(),
            headers: settings.headers.clone(),
            retry: settings.retry.clone(),
            timeout: settings.transport.timeout,
            proxy: settings.transport.proxy.clone(),
            disable_proxy: settings.transport.disable_proxy,
            discover_nodes_on_start: settings.discover_nodes_on_start,
        }
    }
}
