//! Relevance search over the snapshot.
//!
//! Linear scan with heuristic scoring — the cache is small enough that a
//! full-text index would be overkill. Case-insensitive substring matching:
//! +2 for a title hit, +1 per matching participant, +1 when the meeting's
//! transcript contains the query (at most once regardless of occurrence
//! count). Zero-score meetings are excluded.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::CacheSnapshot;

/// Default result cap when the caller does not supply one.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// One ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub meeting_id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub participants: Vec<String>,
    pub score: u32,
}

/// Search meetings by title, participants, and transcript content.
///
/// Results are sorted by descending score; ties are broken by meeting date
/// descending, then meeting id ascending, so ranking is deterministic.
pub fn search_meetings(snapshot: &CacheSnapshot, query: &str, limit: usize) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    let mut hits: Vec<SearchHit> = Vec::new();

    for (meeting_id, meeting) in &snapshot.meetings {
        let mut score = 0u32;

        if meeting.title.to_lowercase().contains(&needle) {
            score += 2;
        }

        for participant in &meeting.participants {
            if participant.to_lowercase().contains(&needle) {
                score += 1;
            }
        }

        if let Some(transcript) = snapshot.transcripts.get(meeting_id) {
            if transcript.content.to_lowercase().contains(&needle) {
                score += 1;
            }
        }

        if score > 0 {
            hits.push(SearchHit {
                meeting_id: meeting.id.clone(),
                title: meeting.title.clone(),
                date: meeting.date,
                participants: meeting.participants.clone(),
                score,
            });
        }
    }

    hits.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.date.cmp(&a.date))
            .then(a.meeting_id.cmp(&b.meeting_id))
    });
    hits.truncate(limit);
    hits
}
