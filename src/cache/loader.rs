//! Raw cache file reader and envelope unwrapping.
//!
//! The cache file at `~/Library/Application Support/Granola/cache-v3.json`
//! is double-JSON-encoded: the top-level `cache` field is a JSON string
//! that must be parsed again, and the real payload usually sits under a
//! `state` key inside that. Older cache files skip the envelope entirely,
//! so a missing `cache` key is not an error — the value is used as-is.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;

/// Read and decode the cache file, unwrapping the `cache`/`state` envelope
/// when present.
///
/// Returns `Ok(None)` when the file does not exist — absence of the
/// external application's data is an expected state, not a failure.
pub fn read_raw(path: &Path) -> Result<Option<Value>, LoadError> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(&raw).map_err(LoadError::OuterJson)?;
    unwrap_envelope(value).map(Some)
}

/// Unwrap the double-encoded envelope, if any.
///
/// When the top-level object carries a `cache` key whose value is a
/// JSON-encoded string, that string is decoded; if the decoded payload
/// contains a `state` key, the value under it becomes the root. Any other
/// shape is returned unchanged.
fn unwrap_envelope(value: Value) -> Result<Value, LoadError> {
    let encoded = match value.get("cache").and_then(Value::as_str) {
        Some(s) => s.to_string(),
        None => return Ok(value),
    };

    let mut inner: Value = serde_json::from_str(&encoded).map_err(LoadError::InnerJson)?;
    match inner.get_mut("state") {
        Some(state) => Ok(state.take()),
        None => Ok(inner),
    }
}
