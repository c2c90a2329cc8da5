//! Error types for cache loading and query input validation.
//!
//! Load failures are absorbed at the load boundary (the server degrades to
//! an empty snapshot), so `LoadError` never reaches the query layer. Query
//! input errors are returned to the caller as values, distinguishable from
//! a plain "not found" lookup.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or decode the cache file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read cache file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cache file is not valid JSON: {0}")]
    OuterJson(serde_json::Error),

    #[error("Cache envelope payload is not valid JSON: {0}")]
    InnerJson(serde_json::Error),
}

/// Invalid query input. Not used for lookup misses, which are normal
/// outcomes modeled as `Option`/empty collections.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Unknown pattern type: {0}. Expected one of: topics, participants, frequency")]
    UnknownPatternType(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
}
