//! Per-meeting lookups: details, transcript, and documents.
//!
//! Lookup misses are normal outcomes, not errors — the cache routinely
//! contains transcript or document keys without a matching meeting and
//! vice versa.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{CacheSnapshot, MeetingDocument, Transcript};

/// Assembled detail view of one meeting, including derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingDetails {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub date_defaulted: bool,
    pub participants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Number of documents whose owning meeting id equals this meeting.
    pub document_count: usize,
    pub has_transcript: bool,
}

/// Look up a meeting and assemble its detail view.
pub fn get_meeting_details(snapshot: &CacheSnapshot, meeting_id: &str) -> Option<MeetingDetails> {
    let meeting = snapshot.meetings.get(meeting_id)?;

    let document_count = snapshot
        .documents
        .values()
        .filter(|doc| doc.meeting_id == meeting_id)
        .count();

    Some(MeetingDetails {
        id: meeting.id.clone(),
        title: meeting.title.clone(),
        date: meeting.date,
        date_defaulted: meeting.date_defaulted,
        participants: meeting.participants.clone(),
        duration: meeting.duration,
        meeting_type: meeting.meeting_type.clone(),
        platform: meeting.platform.clone(),
        document_count,
        has_transcript: snapshot.transcripts.contains_key(meeting_id),
    })
}

/// Transcript for a meeting, when one was materialized.
pub fn get_meeting_transcript<'a>(
    snapshot: &'a CacheSnapshot,
    meeting_id: &str,
) -> Option<&'a Transcript> {
    snapshot.transcripts.get(meeting_id)
}

/// All documents owned by a meeting. Possibly empty — a normal outcome.
pub fn get_meeting_documents<'a>(
    snapshot: &'a CacheSnapshot,
    meeting_id: &str,
) -> Vec<&'a MeetingDocument> {
    let mut docs: Vec<&MeetingDocument> = snapshot
        .documents
        .values()
        .filter(|doc| doc.meeting_id == meeting_id)
        .collect();
    docs.sort_by(|a, b| a.id.cmp(&b.id));
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Meeting;
    use chrono::TimeZone;

    fn sample_snapshot() -> CacheSnapshot {
        let mut snapshot = CacheSnapshot::empty(Utc::now());
        snapshot.meetings.insert(
            "m1".to_string(),
            Meeting {
                id: "m1".to_string(),
                title: "Weekly Sync".to_string(),
                date: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
                date_defaulted: false,
                participants: vec!["Alice".to_string()],
                duration: Some(30),
                meeting_type: Some("meeting".to_string()),
                platform: None,
            },
        );
        for doc_id in ["d1", "d2"] {
            snapshot.documents.insert(
                doc_id.to_string(),
                MeetingDocument {
                    id: doc_id.to_string(),
                    meeting_id: "m1".to_string(),
                    title: "Weekly Sync".to_string(),
                    content: "notes".to_string(),
                    document_type: "meeting_notes".to_string(),
                    created_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
                    tags: Vec::new(),
                },
            );
        }
        snapshot.documents.insert(
            "d3".to_string(),
            MeetingDocument {
                id: "d3".to_string(),
                meeting_id: "other".to_string(),
                title: "Unrelated".to_string(),
                content: String::new(),
                document_type: "meeting_notes".to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
                tags: Vec::new(),
            },
        );
        snapshot.transcripts.insert(
            "m1".to_string(),
            Transcript {
                meeting_id: "m1".to_string(),
                content: "hello".to_string(),
                speakers: Vec::new(),
                language: None,
                confidence: None,
            },
        );
        snapshot
    }

    #[test]
    fn test_details_derived_fields() {
        let snapshot = sample_snapshot();
        let details = get_meeting_details(&snapshot, "m1").unwrap();
        assert_eq!(details.document_count, 2);
        assert!(details.has_transcript);
        assert_eq!(details.duration, Some(30));
    }

    #[test]
    fn test_details_not_found_is_none() {
        let snapshot = sample_snapshot();
        assert!(get_meeting_details(&snapshot, "missing").is_none());
    }

    #[test]
    fn test_details_without_transcript() {
        let mut snapshot = sample_snapshot();
        snapshot.transcripts.clear();
        let details = get_meeting_details(&snapshot, "m1").unwrap();
        assert!(!details.has_transcript);
    }

    #[test]
    fn test_transcript_lookup() {
        let snapshot = sample_snapshot();
        assert_eq!(
            get_meeting_transcript(&snapshot, "m1").unwrap().content,
            "hello"
        );
        assert!(get_meeting_transcript(&snapshot, "m2").is_none());
    }

    #[test]
    fn test_documents_filtered_by_meeting() {
        let snapshot = sample_snapshot();
        let docs = get_meeting_documents(&snapshot, "m1");
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.meeting_id == "m1"));

        // Dangling meeting id on a document is tolerated
        let docs = get_meeting_documents(&snapshot, "other");
        assert_eq!(docs.len(), 1);

        assert!(get_meeting_documents(&snapshot, "none").is_empty());
    }
}
