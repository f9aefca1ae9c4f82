//! Degraded start against a port nothing listens on.

use std::time::Duration;

use elk_producer::{
    ConnectionSettings, ElkClient, ElkConfig, ElkError, RetrySettings, TargetSettings,
    TransportSettings,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const CLOSED_PORT: &str = "http://127.0.0.1:1";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("elk_producer=debug")),
        )
        .with_test_writer()
        .try_init();
}

fn unreachable_config() -> ElkConfig {
    ElkConfig::new(
        ConnectionSettings {
            addresses: vec![CLOSED_PORT.to_string()],
            retry: RetrySettings::disabled(),
            transport: TransportSettings {
                timeout: Some(Duration::from_secs(2)),
                ..Default::default()
            },
            ..Default::default()
        },
        TargetSettings::new("test").with_url("x"),
    )
}

#[tokio::test]
async fn connect_returns_handle_and_connectivity_error() {
    init_tracing();

    let (client, probe_error) = ElkClient::connect(unreachable_config()).await.unwrap();

    assert!(matches!(probe_error, Some(ElkError::ConnectivityError(_))));
    assert!(probe_error.unwrap().is_degraded_start());
    assert!(!client.ping().await);
}

#[tokio::test]
async fn reads_fail_and_writes_are_swallowed() {
    init_tracing();

    let (client, _) = ElkClient::connect(unreachable_config()).await.unwrap();

    let err = client
        .get_data(&json!({"query": {"match_all": {}}}))
        .await
        .unwrap_err();
    assert!(matches!(err, ElkError::TransportError(_)));

    let err = client.get_log().await.unwrap_err();
    assert!(matches!(err, ElkError::TransportError(_)));

    client.add_doc(&json!({"a": 1})).await;
    client.add_log(&json!({"event": "dropped"})).await;
    client.add_doc_async(&json!({"a": 2}));
}

#[tokio::test]
async fn invalid_address_fails_construction() {
    init_tracing();

    let mut config = unreachable_config();
    config.connection.addresses = vec!["not a url".to_string()];

    let err = ElkClient::connect(config).await.unwrap_err();
    assert!(matches!(err, ElkError::ClientConstructionError(_)));
}

#[tokio::test]
async fn node_discovery_does_not_block_degraded_start() {
    init_tracing();

    let mut config = unreachable_config();
    config.connection.addresses = vec![CLOSED_PORT.to_string(), "http://127.0.0.1:3".to_string()];
    config.connection.discover_nodes_on_start = true;

    let (client, probe_error) = ElkClient::connect(config).await.unwrap();

    assert!(matches!(probe_error, Some(ElkError::ConnectivityError(_))));
    assert!(!client.ping().await);
}

#[tokio::test]
async fn empty_config_still_returns_handle() {
    init_tracing();

    let mut config = ElkConfig::default();
    config.connection.transport.timeout = Some(Duration::from_secs(2));

    let (client, _probe_error) = ElkClient::connect(config).await.unwrap();

    assert_eq!(client.target().index, "");
    assert_eq!(client.index_name(), "d41d8cd98f00b204e9800998ecf8427e");
}
