//! Generic search response.
//!
//! Search results are returned exactly as the remote service sent them. No
//! local schema is imposed; `SearchResponseExt` only offers read-only shortcuts
//! for the paths most callers navigate (`hits.total.value`, `hits.hits[]`).

use serde_json::{Map, Value};

/// Untyped response body of a search request, mirroring the remote JSON.
pub type SearchResponse = Map<String, Value>;

/// Read-only accessors over a [`SearchResponse`].
pub trait SearchResponseExt {
    /// Total number of matching documents (`hits.total.value`).
    ///
    /// Also accepts the legacy numeric form `hits.total`.
    fn total_hits(&self) -> Option<u64>;

    /// The returned hits (`hits.hits`), empty when absent.
    fn hits(&self) -> &[Value];

    /// The `_source` of every returned hit.
    fn sources(&self) -> Vec<&Value> {
        self.hits().iter().filter_map(|hit| hit.get("_source")).collect()
    }

    /// Server-reported error as `(type, reason)`, when the body is an error body.
    fn error_detail(&self) -> Option<(String, String)>;
}

impl SearchResponseExt for SearchResponse {
    fn total_hits(&self) -> Option<u64> {
        let total = self.get("hits")?.get("total")?;
        match total {
            Value::Number(n) => n.as_u64(),
            other => other.get("value")?.as_u64(),
        }
    }

    fn hits(&self) -> &[Value] {
        self.get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(|h| h.as_array())
            .map(|a| a.as_slice())
            .unwrap_or(&[])
    }

    fn error_detail(&self) -> Option<(String, String)> {
        let error = self.get("error")?;
        let kind = error
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or_default();
        let reason = error
            .get("reason")
            .and_then(|r| r.as_str())
            .unwrap_or_default();
        Some((kind.to_string(), reason.to_string()))
    }
}
