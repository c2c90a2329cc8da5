//! Server state: cache path plus the lazily-built snapshot.
//!
//! The snapshot is built on first access and cached for the process
//! lifetime. `tokio::sync::OnceCell` gives the single-flight guarantee:
//! under concurrent first queries exactly one load runs and every other
//! caller awaits it, after which reads are lock-free clones of the same
//! `Arc`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;

use crate::cache;
use crate::types::CacheSnapshot;

/// Owns the cache location and the once-loaded snapshot.
pub struct ServerState {
    cache_path: PathBuf,
    snapshot: OnceCell<Arc<CacheSnapshot>>,
}

impl ServerState {
    pub fn new(cache_path: PathBuf) -> Self {
        Self {
            cache_path,
            snapshot: OnceCell::new(),
        }
    }

    pub fn cache_path(&self) -> &PathBuf {
        &self.cache_path
    }

    /// The snapshot, loading it on first call.
    ///
    /// Never fails: load problems degrade to an empty snapshot inside
    /// `cache::load_snapshot`, so queries always have something to read.
    pub async fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.snapshot
            .get_or_init(|| async {
                let path = self.cache_path.clone();
                // The one blocking file read in the process; off the
                // async executor.
                match tokio::task::spawn_blocking(move || cache::load_snapshot(&path)).await {
                    Ok(snapshot) => Arc::new(snapshot),
                    Err(e) => {
                        log::warn!("Cache load task failed: {e}; serving empty snapshot");
                        Arc::new(CacheSnapshot::empty(Utc::now()))
                    }
                }
            })
            .await
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_flat_cache(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("cache-v3.json");
        let value = json!({
            "meetings": {
                "m1": {"title": "Planning", "date": "2024-01-15T10:00:00Z"}
            }
        });
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_cache_yields_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let state = ServerState::new(dir.path().join("absent.json"));
        let snapshot = state.snapshot().await;
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_loaded_once_and_shared() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_flat_cache(&dir);
        let state = Arc::new(ServerState::new(path.clone()));

        let a = {
            let state = state.clone();
            tokio::spawn(async move { state.snapshot().await })
        };
        let b = {
            let state = state.clone();
            tokio::spawn(async move { state.snapshot().await })
        };
        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.meetings.len(), 1);

        // Deleting the file after the first load changes nothing: the
        // snapshot is cached for the process lifetime.
        std::fs::remove_file(&path).unwrap();
        let c = state.snapshot().await;
        assert!(Arc::ptr_eq(&a, &c));
    }
}
