//! Filesystem-safe encoding of server URLs.
//!
//! Server URLs contain `/`, which gopass would turn into nested folders, so
//! each URL is stored under its URL-safe, padded base64 form.

use crate::core::helper::{HelperError, HelperResult};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;

/// Encode a server URL into a single path segment.
pub fn encode_server_url(server_url: &str) -> String {
    URL_SAFE.encode(server_url.as_bytes())
}

/// Decode a path segment back into the server URL it was created from.
pub fn decode_server_url(entry: &str) -> HelperResult<String> {
    let bytes = URL_SAFE.decode(entry).map_err(|e| HelperError::Decode {
        entry: entry.to_string(),
        reason: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| HelperError::Decode {
        entry: entry.to_string(),
        reason: e.to_string(),
    })
}
