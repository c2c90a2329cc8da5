//! Query engine over the Granola meeting-recording app's local cache.
//!
//! Granola stores its meeting data in a single JSON cache file (double
//! JSON-encoded, in one of several historical schemas). This crate reads
//! that file once per process, normalizes it into an immutable
//! [`types::CacheSnapshot`], and answers read-only queries over it:
//! search, meeting details, transcript and document retrieval, and
//! cross-meeting pattern analysis.
//!
//! The cache is never written; the file is purely a read-only input. The
//! `granola-mcp` binary exposes the queries as MCP tools over stdio.

pub mod cache;
pub mod error;
pub mod queries;
pub mod state;
pub mod types;
