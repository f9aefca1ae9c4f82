//! Canned search bodies.
//!
//! These build the request bodies for the built-in log reads. Arbitrary
//! queries passed to `ElkClient::get_data` bypass this module entirely.

use serde_json::{json, Value};

/// Page of log envelopes whose `url` field matches the given tag.
pub fn build_log_query(from: usize, size: usize, url: &str) -> Value {
    json!({
        "from": from,
        "size": size,
        "query": {
            "match": {
                "url": url
            }
        }
    })
}

/// Page of every document in the index.
pub fn build_tee_log_query(from: usize, size: usize) -> Value {
    json!({
        "from": from,
        "size": size,
        "query": {
            "match_all": {}
        }
    })
}
