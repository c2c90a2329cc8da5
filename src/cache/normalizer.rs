//! Cache normalization: untyped JSON value → canonical snapshot.
//!
//! The cache has shipped in at least two schemas. The shape is detected
//! once by key presence (there is no version flag) and each shape gets its
//! own extraction path instead of scattering presence checks everywhere.
//!
//! A malformed individual record never aborts the load: the entry is
//! skipped and reported through the `skipped` list for diagnostics.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::notes;
use crate::types::{CacheSnapshot, Meeting, MeetingDocument, Transcript};

/// Fallback title when the source record carries none.
const UNTITLED_MEETING: &str = "Untitled Meeting";

/// Transcript content field candidates, in priority order.
const TRANSCRIPT_CONTENT_FIELDS: &[&str] = &["content", "text", "transcript"];

/// Storage schema of the (unwrapped) cache value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheShape {
    /// Top-level `meetings` map with fully-denormalized meeting records.
    Flat,
    /// Granola's document-centric schema: meetings are derived from the
    /// `documents` map, with `documentPanels` as a content overlay.
    DocumentCentric,
    /// Neither map present — zero records of every kind.
    Empty,
}

/// Detect the cache schema by key presence.
pub fn detect_shape(raw: &Value) -> CacheShape {
    if raw.get("meetings").and_then(Value::as_object).is_some() {
        CacheShape::Flat
    } else if raw.get("documents").and_then(Value::as_object).is_some() {
        CacheShape::DocumentCentric
    } else {
        CacheShape::Empty
    }
}

/// Normalization result: the snapshot plus per-record failures that were
/// skipped rather than aborting the load.
#[derive(Debug)]
pub struct Normalized {
    pub snapshot: CacheSnapshot,
    pub skipped: Vec<String>,
}

/// Build a snapshot from the unwrapped cache value.
///
/// Tolerates any subset of the expected top-level keys being absent.
/// `loaded_at` doubles as the default meeting date when a record has no
/// parsable date (such meetings carry `date_defaulted = true`).
pub fn normalize(raw: &Value, loaded_at: DateTime<Utc>) -> Normalized {
    let mut skipped = Vec::new();

    let meetings = match detect_shape(raw) {
        CacheShape::Flat => extract_flat_meetings(raw, loaded_at, &mut skipped),
        CacheShape::DocumentCentric => {
            extract_document_meetings(raw, loaded_at, &mut skipped)
        }
        CacheShape::Empty => HashMap::new(),
    };

    let documents = match detect_shape(raw) {
        CacheShape::Flat => extract_flat_documents(raw, loaded_at, &mut skipped),
        CacheShape::DocumentCentric => extract_document_contents(raw, &meetings, &mut skipped),
        CacheShape::Empty => HashMap::new(),
    };

    let transcripts = extract_transcripts(raw, &mut skipped);

    Normalized {
        snapshot: CacheSnapshot {
            meetings,
            documents,
            transcripts,
            last_loaded: loaded_at,
        },
        skipped,
    }
}

// =============================================================================
// Meetings
// =============================================================================

fn extract_flat_meetings(
    raw: &Value,
    loaded_at: DateTime<Utc>,
    skipped: &mut Vec<String>,
) -> HashMap<String, Meeting> {
    let mut meetings = HashMap::new();
    let Some(entries) = raw.get("meetings").and_then(Value::as_object) else {
        return meetings;
    };

    for (id, entry) in entries {
        let Some(obj) = entry.as_object() else {
            skipped.push(format!("meeting {id}: not a JSON object"));
            continue;
        };

        let (date, date_defaulted) =
            date_or_default(obj.get("date").and_then(Value::as_str), loaded_at);

        meetings.insert(
            id.clone(),
            Meeting {
                id: id.clone(),
                title: non_empty_str(obj.get("title"))
                    .unwrap_or(UNTITLED_MEETING)
                    .to_string(),
                date,
                date_defaulted,
                participants: string_list(obj.get("participants")),
                duration: obj
                    .get("duration")
                    .and_then(Value::as_u64)
                    .map(|d| d as u32),
                meeting_type: non_empty_str(obj.get("type")).map(str::to_string),
                platform: non_empty_str(obj.get("platform")).map(str::to_string),
            },
        );
    }

    meetings
}

fn extract_document_meetings(
    raw: &Value,
    loaded_at: DateTime<Utc>,
    skipped: &mut Vec<String>,
) -> HashMap<String, Meeting> {
    let mut meetings = HashMap::new();
    let Some(entries) = raw.get("documents").and_then(Value::as_object) else {
        return meetings;
    };

    for (id, entry) in entries {
        let Some(obj) = entry.as_object() else {
            skipped.push(format!("meeting {id}: not a JSON object"));
            continue;
        };

        let (date, date_defaulted) =
            date_or_default(obj.get("created_at").and_then(Value::as_str), loaded_at);

        meetings.insert(
            id.clone(),
            Meeting {
                id: id.clone(),
                title: non_empty_str(obj.get("title"))
                    .unwrap_or(UNTITLED_MEETING)
                    .to_string(),
                date,
                date_defaulted,
                participants: people_names(obj.get("people")),
                // This schema carries neither duration nor platform.
                duration: None,
                meeting_type: Some(
                    non_empty_str(obj.get("type"))
                        .unwrap_or("meeting")
                        .to_string(),
                ),
                platform: None,
            },
        );
    }

    meetings
}

// =============================================================================
// Documents
// =============================================================================

fn extract_flat_documents(
    raw: &Value,
    loaded_at: DateTime<Utc>,
    skipped: &mut Vec<String>,
) -> HashMap<String, MeetingDocument> {
    let mut documents = HashMap::new();
    let Some(entries) = raw.get("documents").and_then(Value::as_object) else {
        return documents;
    };

    for (id, entry) in entries {
        let Some(obj) = entry.as_object() else {
            skipped.push(format!("document {id}: not a JSON object"));
            continue;
        };

        let (created_at, _) =
            date_or_default(obj.get("created_at").and_then(Value::as_str), loaded_at);

        documents.insert(
            id.clone(),
            MeetingDocument {
                id: id.clone(),
                meeting_id: non_empty_str(obj.get("meeting_id"))
                    .unwrap_or(id)
                    .to_string(),
                title: non_empty_str(obj.get("title"))
                    .unwrap_or(UNTITLED_MEETING)
                    .to_string(),
                content: obj
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                document_type: non_empty_str(obj.get("type"))
                    .unwrap_or("meeting_notes")
                    .to_string(),
                created_at,
                tags: string_list(obj.get("tags")),
            },
        );
    }

    documents
}

/// Document-centric shape: derive one document per meeting from the notes
/// fields, with the `documentPanels` overlay as the content fallback.
///
/// Primary source priority: `notes_plain`, then `notes_markdown`, then the
/// structured `notes` tree. `Overview:`/`Summary:` sections are appended
/// regardless of which primary source won. Only meetings that were
/// materialized get a document.
fn extract_document_contents(
    raw: &Value,
    meetings: &HashMap<String, Meeting>,
    skipped: &mut Vec<String>,
) -> HashMap<String, MeetingDocument> {
    let mut documents = HashMap::new();
    let Some(entries) = raw.get("documents").and_then(Value::as_object) else {
        return documents;
    };
    let panels = raw.get("documentPanels").and_then(Value::as_object);

    for (id, entry) in entries {
        let Some(meeting) = meetings.get(id) else {
            continue;
        };
        let Some(obj) = entry.as_object() else {
            skipped.push(format!("document {id}: not a JSON object"));
            continue;
        };

        let mut sections: Vec<String> = Vec::new();

        let primary = non_empty_str(obj.get("notes_plain"))
            .map(str::to_string)
            .or_else(|| non_empty_str(obj.get("notes_markdown")).map(str::to_string))
            .or_else(|| {
                obj.get("notes")
                    .map(notes::extract_text)
                    .filter(|text| !text.trim().is_empty())
            });
        if let Some(text) = primary {
            sections.push(text);
        }

        if let Some(overview) = non_empty_str(obj.get("overview")) {
            sections.push(format!("Overview: {overview}"));
        }
        if let Some(summary) = non_empty_str(obj.get("summary")) {
            sections.push(format!("Summary: {summary}"));
        }

        // Panel overlay fallback: consulted whenever the primary notes
        // yielded no content at all.
        if sections.is_empty() {
            if let Some(text) = panel_text(panels, id) {
                sections.push(text);
            }
        }

        documents.insert(
            id.clone(),
            MeetingDocument {
                id: id.clone(),
                meeting_id: id.clone(),
                title: meeting.title.clone(),
                content: sections.join("\n\n"),
                document_type: "meeting_notes".to_string(),
                created_at: meeting.date,
                tags: Vec::new(),
            },
        );
    }

    documents
}

/// Extract text from every panel stored for a meeting id, joined with a
/// blank line. Returns `None` when the overlay has nothing usable.
fn panel_text(
    panels: Option<&serde_json::Map<String, Value>>,
    meeting_id: &str,
) -> Option<String> {
    let meeting_panels = panels?.get(meeting_id)?.as_object()?;

    let parts: Vec<String> = meeting_panels
        .values()
        .map(notes::extract_text)
        .filter(|text| !text.trim().is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

// =============================================================================
// Transcripts
// =============================================================================

fn extract_transcripts(raw: &Value, skipped: &mut Vec<String>) -> HashMap<String, Transcript> {
    let mut transcripts = HashMap::new();
    let Some(entries) = raw.get("transcripts").and_then(Value::as_object) else {
        return transcripts;
    };

    for (key, entry) in entries {
        let Some(obj) = entry.as_object() else {
            skipped.push(format!("transcript {key}: not a JSON object"));
            continue;
        };

        // Owning meeting: explicit document_id, else the entry's own key.
        let meeting_id = non_empty_str(obj.get("document_id"))
            .unwrap_or(key)
            .to_string();

        // First *present* candidate field wins, even if empty — an empty
        // value then drops the transcript below.
        let content = TRANSCRIPT_CONTENT_FIELDS
            .iter()
            .find_map(|field| obj.get(*field))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if content.is_empty() {
            // Transcripts without extractable content are not materialized.
            continue;
        }

        let speakers = match obj.get("speakers") {
            Some(list) => string_list(Some(list)),
            None => people_names(obj.get("people")),
        };

        // Later records for the same meeting overwrite earlier ones.
        transcripts.insert(
            meeting_id.clone(),
            Transcript {
                meeting_id,
                content,
                speakers,
                language: non_empty_str(obj.get("language")).map(str::to_string),
                confidence: obj.get("confidence").and_then(Value::as_f64),
            },
        );
    }

    transcripts
}

// =============================================================================
// Field helpers
// =============================================================================

/// Parse a cache date field, falling back to the load time.
///
/// The second element is true when the date was defaulted, so callers can
/// distinguish explicit dates from fabricated ones.
fn date_or_default(raw: Option<&str>, loaded_at: DateTime<Utc>) -> (DateTime<Utc>, bool) {
    match raw.and_then(parse_cache_date) {
        Some(date) => (date, false),
        None => (loaded_at, true),
    }
}

/// Parse Granola's ISO-8601 variants.
///
/// A trailing `Z` is rewritten to an explicit `+00:00` offset first.
/// Naive datetimes and bare dates (both emitted by older caches) are
/// treated as UTC.
pub fn parse_cache_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let normalized = match trimmed.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = normalized.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    if let Ok(date) = normalized.parse::<NaiveDate>() {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Non-empty string field, if present.
fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// String list field: non-string and empty entries dropped, order kept.
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Names from a `people` list of objects, in encounter order. Entries
/// without a non-empty `name` are dropped.
fn people_names(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|people| {
            people
                .iter()
                .filter_map(|person| non_empty_str(person.get("name")))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
