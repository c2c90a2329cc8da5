//! Canonical in-memory model built from the Granola cache file.
//!
//! The snapshot is rebuilt wholesale on each load and never mutated after
//! the normalizer returns it. Document and transcript keys may reference
//! meeting ids that are absent from `meetings` — the query layer tolerates
//! dangling lookups rather than assuming referential integrity of the
//! external cache.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Meeting metadata extracted from the cache.
#[derive(Debug, Clone, Serialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    /// True when the source had no parsable date and `date` was defaulted
    /// to the load timestamp.
    pub date_defaulted: bool,
    /// Participant display names in encounter order. Duplicates permitted,
    /// empty entries dropped.
    pub participants: Vec<String>,
    /// Duration in minutes, when the source shape carries it.
    pub duration: Option<u32>,
    pub meeting_type: Option<String>,
    pub platform: Option<String>,
}

/// A document (meeting notes) owned by a meeting.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingDocument {
    pub id: String,
    pub meeting_id: String,
    pub title: String,
    /// Plain-text content. Possibly empty, never null.
    pub content: String,
    pub document_type: String,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// A meeting transcript. At most one per meeting; only materialized when
/// extracted content is non-empty.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub meeting_id: String,
    pub content: String,
    pub speakers: Vec<String>,
    pub language: Option<String>,
    /// Confidence score in [0, 1] when the source provides one.
    pub confidence: Option<f64>,
}

/// Immutable, fully-normalized view of the cache, built once per load.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub meetings: HashMap<String, Meeting>,
    pub documents: HashMap<String, MeetingDocument>,
    pub transcripts: HashMap<String, Transcript>,
    pub last_loaded: DateTime<Utc>,
}

impl CacheSnapshot {
    /// Snapshot with zero records, used when the cache file is missing or
    /// unreadable.
    pub fn empty(last_loaded: DateTime<Utc>) -> Self {
        Self {
            meetings: HashMap::new(),
            documents: HashMap::new(),
            transcripts: HashMap::new(),
            last_loaded,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty() && self.documents.is_empty() && self.transcripts.is_empty()
    }
}
