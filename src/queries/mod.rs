//! Read-only query engine over an immutable [`CacheSnapshot`].
//!
//! Every operation is a pure function of a snapshot reference plus
//! arguments; nothing here mutates the snapshot or touches disk.
//!
//! [`CacheSnapshot`]: crate::types::CacheSnapshot

pub mod meetings;
pub mod patterns;
pub mod search;

pub use meetings::{get_meeting_details, get_meeting_documents, get_meeting_transcript, MeetingDetails};
pub use patterns::{analyze_patterns, DateRange, PatternReport, PatternType};
pub use search::{search_meetings, SearchHit, DEFAULT_SEARCH_LIMIT};
