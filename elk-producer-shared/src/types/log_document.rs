//! Log envelope written by the log operations.
//!
//! Every log write wraps the caller's payload in a fresh `LogDocument` carrying
//! the creation time and the configured URL tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope stored in the index for each log write.
///
/// # Fields
///
/// - `timestamp`: When the envelope was created (UTC, RFC 3339 on the wire)
/// - `log`: The caller-supplied payload, serialized as-is
/// - `url`: The URL tag copied from the target settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogDocument<T> {
    pub timestamp: DateTime<Utc>,
    pub log: T,
    pub url: String,
}

impl<T> LogDocument<T> {
    /// Wrap a payload in an envelope stamped with the current time.
    ///
    /// # Example
    ///
    /// ```
    /// use elk_producer_shared::LogDocument;
    ///
    /// let doc = LogDocument::new("disk full", "http://10.0.0.1:6010");
    /// assert_eq!(doc.url, "http://10.0.0.1:6010");
    /// ```
    pub fn new(log: T, url: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            log,
            url: url.into(),
        }
    }
}
