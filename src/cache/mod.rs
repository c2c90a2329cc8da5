//! Granola cache ingestion: file loading, envelope unwrapping, and
//! normalization into the canonical snapshot.
//!
//! The cache file is the sole source of truth and is treated as read-only.
//! All load failures degrade to an empty snapshot — absence or corruption
//! of the external application's data must never take the query layer
//! down.

pub mod loader;
pub mod normalizer;
pub mod notes;

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::types::CacheSnapshot;

/// Environment variable overriding the cache file location.
pub const CACHE_PATH_ENV: &str = "GRANOLA_CACHE_PATH";

/// Default cache location written by the Granola desktop app.
pub fn default_cache_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("Library/Application Support/Granola/cache-v3.json")
}

/// Resolve the cache path: explicit override, then environment variable,
/// then the platform default.
pub fn resolve_cache_path(override_path: Option<&str>) -> PathBuf {
    if let Some(path) = override_path {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var(CACHE_PATH_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    default_cache_path()
}

/// Load and normalize the cache file into a snapshot.
///
/// Never fails: a missing file yields an empty snapshot, and read/decode
/// failures are logged and degrade to an empty snapshot as well.
/// Per-record failures are logged and skipped without affecting siblings.
pub fn load_snapshot(path: &Path) -> CacheSnapshot {
    let loaded_at = Utc::now();

    let raw = match loader::read_raw(path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            log::info!("Granola cache not found at {}; serving empty snapshot", path.display());
            return CacheSnapshot::empty(loaded_at);
        }
        Err(e) => {
            log::warn!("Granola cache load failed: {e}; serving empty snapshot");
            return CacheSnapshot::empty(loaded_at);
        }
    };

    let normalized = normalizer::normalize(&raw, loaded_at);
    for failure in &normalized.skipped {
        log::warn!("Skipped cache record: {failure}");
    }
    log::info!(
        "Loaded Granola cache: {} meetings, {} documents, {} transcripts",
        normalized.snapshot.meetings.len(),
        normalized.snapshot.documents.len(),
        normalized.snapshot.transcripts.len()
    );

    normalized.snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::search::search_meetings;
    use serde_json::json;

    #[test]
    fn test_load_snapshot_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = load_snapshot(&dir.path().join("nope.json"));
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_load_snapshot_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache-v3.json");
        std::fs::write(&path, "corrupt{{").unwrap();
        let snapshot = load_snapshot(&path);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_resolve_cache_path_explicit_override() {
        let resolved = resolve_cache_path(Some("/tmp/custom.json"));
        assert_eq!(resolved, PathBuf::from("/tmp/custom.json"));
    }

    /// End-to-end: double-encoded cache file through load, normalize, and
    /// search scoring.
    #[test]
    fn test_load_snapshot_end_to_end_search() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache-v3.json");

        let state = json!({
            "state": {
                "documents": {
                    "m1": {
                        "title": "Q1 Planning Session",
                        "created_at": "2024-01-15T10:00:00Z",
                        "people": [{"name": "Alice"}]
                    }
                },
                "transcripts": {
                    "m1": {"content": "We talked about database optimization."}
                }
            }
        });
        let wrapper = json!({"cache": serde_json::to_string(&state).unwrap()});
        std::fs::write(&path, serde_json::to_string(&wrapper).unwrap()).unwrap();

        let snapshot = load_snapshot(&path);
        assert_eq!(snapshot.meetings.len(), 1);
        assert!(snapshot.transcripts.contains_key("m1"));

        // Transcript-only match scores 1
        let hits = search_meetings(&snapshot, "database", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 1);

        // Title match scores 2
        let hits = search_meetings(&snapshot, "planning", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 2);
    }
}
