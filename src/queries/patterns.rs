//! Cross-meeting pattern analysis: participants, frequency, topics.
//!
//! All three variants operate on the meeting set, optionally pre-filtered
//! by an inclusive date range. An empty filtered set is a normal outcome
//! (an empty report), while bad input — unknown pattern type, unparsable
//! range — is a typed error distinguishable from "no data".

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::QueryError;
use crate::types::{CacheSnapshot, Meeting};

/// Title tokens that carry no topical signal.
const TOPIC_STOPWORDS: &[&str] = &["meeting", "call", "sync", "with"];

/// Tokens this short are noise ("q1", "the", "for").
const MIN_TOPIC_TOKEN_LEN: usize = 4;

const TOP_PARTICIPANTS: usize = 10;
const TOP_TOPICS: usize = 15;

/// Which analysis to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    Participants,
    Frequency,
    Topics,
}

impl FromStr for PatternType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "participants" => Ok(PatternType::Participants),
            "frequency" => Ok(PatternType::Frequency),
            "topics" => Ok(PatternType::Topics),
            other => Err(QueryError::UnknownPatternType(other.to_string())),
        }
    }
}

/// Inclusive date range filter. Either bound may be open.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parse `YYYY-MM-DD` bounds. An unparsable bound is an input error,
    /// not a silent no-op.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, QueryError> {
        let parse_bound = |raw: Option<&str>| -> Result<Option<NaiveDate>, QueryError> {
            match raw {
                None => Ok(None),
                Some(s) => s
                    .parse::<NaiveDate>()
                    .map(Some)
                    .map_err(|_| QueryError::InvalidDateRange(format!("not a date: {s}"))),
            }
        };
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }

    /// True when the timestamp falls inside the range. The end bound
    /// includes the whole end day.
    fn contains(&self, ts: DateTime<Utc>) -> bool {
        let date = ts.date_naive();
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// A counted name (participant or topic token).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

/// Meetings per calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub count: usize,
}

/// Structured analysis result, one variant per pattern type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum PatternReport {
    Participants {
        meetings_analyzed: usize,
        top_participants: Vec<NameCount>,
    },
    Frequency {
        meetings_analyzed: usize,
        /// Counts per `YYYY-MM` month, chronologically ascending.
        months: Vec<MonthCount>,
        /// Mean meetings per distinct observed month (not per calendar
        /// month in the range).
        mean_per_month: f64,
    },
    Topics {
        meetings_analyzed: usize,
        top_topics: Vec<NameCount>,
    },
}

/// Run a pattern analysis over the snapshot's meetings.
pub fn analyze_patterns(
    snapshot: &CacheSnapshot,
    pattern_type: PatternType,
    date_range: Option<DateRange>,
) -> PatternReport {
    let range = date_range.unwrap_or_default();
    let meetings: Vec<&Meeting> = snapshot
        .meetings
        .values()
        .filter(|m| range.contains(m.date))
        .collect();

    match pattern_type {
        PatternType::Participants => participant_patterns(&meetings),
        PatternType::Frequency => frequency_patterns(&meetings),
        PatternType::Topics => topic_patterns(&meetings),
    }
}

fn participant_patterns(meetings: &[&Meeting]) -> PatternReport {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for meeting in meetings {
        for participant in &meeting.participants {
            *counts.entry(participant.as_str()).or_insert(0) += 1;
        }
    }

    PatternReport::Participants {
        meetings_analyzed: meetings.len(),
        top_participants: top_counts(counts, TOP_PARTICIPANTS),
    }
}

fn frequency_patterns(meetings: &[&Meeting]) -> PatternReport {
    // BTreeMap keys sort lexicographically, which for YYYY-MM is
    // chronological order.
    let mut months: BTreeMap<String, usize> = BTreeMap::new();
    for meeting in meetings {
        let key = meeting.date.format("%Y-%m").to_string();
        *months.entry(key).or_insert(0) += 1;
    }

    let mean_per_month = if months.is_empty() {
        0.0
    } else {
        meetings.len() as f64 / months.len() as f64
    };

    PatternReport::Frequency {
        meetings_analyzed: meetings.len(),
        months: months
            .into_iter()
            .map(|(month, count)| MonthCount { month, count })
            .collect(),
        mean_per_month,
    }
}

fn topic_patterns(meetings: &[&Meeting]) -> PatternReport {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for meeting in meetings {
        for token in meeting.title.to_lowercase().split_whitespace() {
            if token.len() < MIN_TOPIC_TOKEN_LEN || TOPIC_STOPWORDS.contains(&token) {
                continue;
            }
            *counts.entry(token.to_string()).or_insert(0) += 1;
        }
    }

    let owned: HashMap<&str, usize> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    PatternReport::Topics {
        meetings_analyzed: meetings.len(),
        top_topics: top_counts(owned, TOP_TOPICS),
    }
}

/// Top `n` entries by descending count; equal counts ordered by name so
/// the report is deterministic.
fn top_counts(counts: HashMap<&str, usize>, n: usize) -> Vec<NameCount> {
    let mut sorted: Vec<NameCount> = counts
        .into_iter()
        .map(|(name, count)| NameCount {
            name: name.to_string(),
            count,
        })
        .collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then(a.name.cmp(&b.name)));
    sorted.truncate(n);
    sorted
}
