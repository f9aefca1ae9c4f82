//! Utility functions for the ELK client.

use md5::{Digest, Md5};

/// Derive the per-URL index name used by writes and `get_log`.
///
/// The name is the base index followed by the lowercase hex MD5 of the URL
/// tag. The digest only buckets documents by URL; it carries no security
/// meaning. An empty URL still yields a fixed suffix.
///
/// # Example
///
/// ```
/// use elk_producer::derived_index_name;
///
/// assert_eq!(
///     derived_index_name("logs", ""),
///     "logsd41d8cd98f00b204e9800998ecf8427e"
/// );
/// ```
pub fn derived_index_name(index: &str, url: &str) -> String {
    let digest = Md5::digest(url.as_bytes());
    format!("{}{}", index, hex::encode(digest))
}
