//! Round trip against a real cluster.
//!
//! Configure with `ELK_*` variables (or a `.env` file) and run with
//! `cargo test -- --ignored`.

use elk_producer::{ElkClient, ElkConfig, SearchResponseExt};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct Sample {
    a: i32,
    b: String,
    d: Vec<String>,
}

#[tokio::test]
#[ignore]
async fn write_then_read_back() {
    dotenv::dotenv().ok();
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let config = ElkConfig::from_env().unwrap();
    let (client, probe_error) = ElkClient::connect(config).await.unwrap();
    assert!(probe_error.is_none(), "cluster unreachable: {:?}", probe_error);

    client
        .add_log(&Sample {
            a: 1,
            b: "b".to_string(),
            d: vec!["a1".to_string(), "b2".to_string()],
        })
        .await;

    let logs = client.get_log().await.unwrap();
    assert!(logs.total_hits().unwrap_or(0) >= 1);

    let data = client
        .get_data(&json!({"query": {"match_all": {}}}))
        .await
        .unwrap();
    assert!(data.contains_key("hits"));
}
