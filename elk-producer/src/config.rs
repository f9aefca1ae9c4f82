//! Configuration types for the ELK client.
//!
//! `ConnectionSettings` describes how to reach and authenticate to the service;
//! `TargetSettings` describes which index to use and how to page reads. Both
//! are plain data. `ElkConfig::from_env` loads them from `ELK_*` variables.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::time::Duration;

use tracing::warn;

use crate::errors::ElkError;

/// Default page size for canned log queries.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default number of retries in a retry policy.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// HTTP statuses retried by default.
pub const DEFAULT_RETRY_ON_STATUS: [u16; 3] = [502, 503, 504];

/// How to reach and authenticate to the search service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Node addresses, e.g. `http://localhost:9200`.
    pub addresses: Vec<String>,
    /// Username for HTTP Basic authentication.
    pub username: String,
    /// Password for HTTP Basic authentication.
    pub password: String,
    /// Base64-encoded API key; overrides the service token and basic credentials.
    pub api_key: String,
    /// Service token; overrides basic credentials.
    pub service_token: String,
    /// PEM-encoded certificate authorities to trust.
    pub ca_cert: Option<Vec<u8>>,
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
    pub retry: RetrySettings,
    pub transport: TransportSettings,
    /// Probe every configured node once at construction.
    pub discover_nodes_on_start: bool,
}

/// Retry policy carried alongside the connection.
///
/// The `opensearch` transport sends every request exactly once, so this policy
/// is recorded on `ClientOptions` and reported at construction but no
/// request is replayed by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    pub disable_retry: bool,
    pub max_retries: u32,
    pub retry_on_status: Vec<u16>,
    /// Fixed delay between attempts.
    pub backoff: Option<Duration>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            disable_retry: false,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_on_status: DEFAULT_RETRY_ON_STATUS.to_vec(),
            backoff: None,
        }
    }
}

impl RetrySettings {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            disable_retry: true,
            max_retries: 0,
            retry_on_status: Vec::new(),
            backoff: None,
        }
    }
}

/// HTTP transport tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    /// Per-request timeout. `None` leaves the library default.
    pub timeout: Option<Duration>,
    /// Explicit proxy; takes precedence over `disable_proxy`.
    pub proxy: Option<ProxySettings>,
    /// Ignore proxies configured in the environment.
    pub disable_proxy: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: None,
            proxy: None,
            disable_proxy: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Which index to operate against and how to page canned reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSettings {
    /// Base index name.
    pub index: String,
    /// URL tag stamped on log envelopes and hashed into the derived index name.
    pub url: String,
    /// Pagination offset for canned reads.
    pub from: usize,
    /// Page size for canned reads.
    pub size: usize,
    /// Log probe results, request bodies and error responses.
    pub debug_mode: bool,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            index: String::new(),
            url: String::new(),
            from: 0,
            size: DEFAULT_PAGE_SIZE,
            debug_mode: false,
        }
    }
}

impl TargetSettings {
    /// Target the given index with default pagination.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            ..Default::default()
        }
    }

    /// Set the URL tag.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the pagination window.
    pub fn with_page(mut self, from: usize, size: usize) -> Self {
        self.from = from;
        self.size = size;
        self
    }

    /// Enable or disable debug mode.
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElkConfig {
    pub connection: ConnectionSettings,
    pub target: TargetSettings,
}

impl ElkConfig {
    pub fn new(connection: ConnectionSettings, target: TargetSettings) -> Self {
        Self { connection, target }
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ELK_ADDRESSES`: Comma-separated node addresses
    /// - `ELK_USERNAME` / `ELK_PASSWORD`: Basic credentials
    /// - `ELK_API_KEY`: API key
    /// - `ELK_SERVICE_TOKEN`: Service token
    /// - `ELK_CA_CERT_PATH`: Path to a PEM bundle of trusted CAs
    /// - `ELK_TIMEOUT_SECS`: Request timeout in seconds
    /// - `ELK_DISABLE_PROXY`: `true`/`false` (default: true)
    /// - `ELK_INDEX`: Base index name
    /// - `ELK_URL`: URL tag
    /// - `ELK_FROM` / `ELK_SIZE`: Pagination window (default: 0 / 10)
    /// - `ELK_DEBUG`: `true`/`false` (default: false)
    ///
    /// # Returns
    ///
    /// * `Ok(ElkConfig)` - The loaded configuration
    /// * `Err(ElkError::ConfigurationError)` - If the CA bundle cannot be read
    pub fn from_env() -> Result<Self, ElkError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ElkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let addresses = var("ELK_ADDRESSES")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let ca_cert = match lookup("ELK_CA_CERT_PATH").filter(|p| !p.is_empty()) {
            Some(path) => Some(fs::read(&path).map_err(|e| {
                ElkError::configuration(format!("Failed to read CA certificate {}: {}", path, e))
            })?),
            None => None,
        };

        let timeout = parse_var::<u64, _>(&lookup, "ELK_TIMEOUT_SECS").map(Duration::from_secs);

        let connection = ConnectionSettings {
            addresses,
            username: var("ELK_USERNAME"),
            password: var("ELK_PASSWORD"),
            api_key: var("ELK_API_KEY"),
            service_token: var("ELK_SERVICE_TOKEN"),
            ca_cert,
            transport: TransportSettings {
                timeout,
                disable_proxy: parse_var(&lookup, "ELK_DISABLE_PROXY").unwrap_or(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let target = TargetSettings {
            index: var("ELK_INDEX"),
            url: var("ELK_URL"),
            from: parse_var(&lookup, "ELK_FROM").unwrap_or(0),
            size: parse_var(&lookup, "ELK_SIZE").unwrap_or(DEFAULT_PAGE_SIZE),
            debug_mode: parse_var(&lookup, "ELK_DEBUG").unwrap_or(false),
        };

        Ok(Self { connection, target })
    }
}

/// Parse an optional variable, warning and falling back on malformed values.
fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.to_lowercase().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = %raw, "Invalid value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let target = TargetSettings::default();
        assert_eq!(target.from, 0);
        assert_eq!(target.size, DEFAULT_PAGE_SIZE);
        assert!(!target.debug_mode);

        let retry = RetrySettings::default();
        assert!(!retry.disable_retry);
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.retry_on_status, vec![502, 503, 504]);

        assert!(TransportSettings::default().disable_proxy);
    }

    #[test]
    fn test_target_builder() {
        let target = TargetSettings::new("test")
            .with_url("x")
            .with_page(20, 50)
            .with_debug_mode(true);

        assert_eq!(target.index, "test");
        assert_eq!(target.url, "x");
        assert_eq!(target.from, 20);
        assert_eq!(target.size, 50);
        assert!(target.debug_mode);
    }

    #[test]
    fn test_from_lookup_full() {
        let config = ElkConfig::from_lookup(lookup_from(&[
            ("ELK_ADDRESSES", "http://a:9200, http://b:9200,,"),
            ("ELK_USERNAME", "elastic"),
            ("ELK_PASSWORD", "secret"),
            ("ELK_API_KEY", "a2V5"),
            ("ELK_TIMEOUT_SECS", "10"),
            ("ELK_DISABLE_PROXY", "FALSE"),
            ("ELK_INDEX", "test2"),
            ("ELK_URL", "http://101.237.34.55:6010"),
            ("ELK_FROM", "5"),
            ("ELK_SIZE", "10000"),
            ("ELK_DEBUG", "true"),
        ]))
        .unwrap();

        assert_eq!(
            config.connection.addresses,
            vec!["http://a:9200".to_string(), "http://b:9200".to_string()]
        );
        assert_eq!(config.connection.username, "elastic");
        assert_eq!(config.connection.password, "secret");
        assert_eq!(config.connection.api_key, "a2V5");
        assert!(config.connection.ca_cert.is_none());
        assert_eq!(
            config.connection.transport.timeout,
            Some(Duration::from_secs(10))
        );
        assert!(!config.connection.transport.disable_proxy);
        assert_eq!(config.target.index, "test2");
        assert_eq!(config.target.url, "http://101.237.34.55:6010");
        assert_eq!(config.target.from, 5);
        assert_eq!(config.target.size, 10000);
        assert!(config.target.debug_mode);
    }

    #[test]
    fn test_from_lookup_empty() {
        let config = ElkConfig::from_lookup(|_| None).unwrap();

        assert!(config.connection.addresses.is_empty());
        assert!(config.connection.username.is_empty());
        assert_eq!(config.target, TargetSettings::default());
    }

    #[test]
    fn test_from_lookup_invalid_numbers_fall_back() {
        let config = ElkConfig::from_lookup(lookup_from(&[
            ("ELK_FROM", "-1"),
            ("ELK_SIZE", "lots"),
            ("ELK_DEBUG", "maybe"),
            ("ELK_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap();

        assert_eq!(config.target.from, 0);
        assert_eq!(config.target.size, DEFAULT_PAGE_SIZE);
        assert!(!config.target.debug_mode);
        assert!(config.connection.transport.timeout.is_none());
    }

    #[test]
    fn test_from_lookup_missing_ca_file() {
        let result = ElkConfig::from_lookup(lookup_from(&[(
            "ELK_CA_CERT_PATH",
            "/definitely/not/here/ca.pem",
        )]));

        assert!(matches!(
            result.unwrap_err(),
            ElkError::ConfigurationError(_)
        ));
    }
}
