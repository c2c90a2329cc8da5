//! Granola MCP server — exposes meeting intelligence over stdio.
//!
//! Thin adapter around the query engine: declares the tool schemas,
//! dispatches to the core, and serializes its structured results as JSON.
//! No cache parsing or query logic lives here.
//!
//! The cache file is read lazily on the first tool call and held for the
//! process lifetime. Logs go to stderr; stdout belongs to the MCP
//! transport.

use std::sync::Arc;

use rmcp::model::*;
use rmcp::schemars::JsonSchema;
use rmcp::{tool, ServerHandler, ServiceExt};
use serde::Deserialize;

use granola_mcp::cache;
use granola_mcp::queries;
use granola_mcp::queries::{DateRange, PatternType};
use granola_mcp::state::ServerState;

// =============================================================================
// Server
// =============================================================================

#[derive(Clone)]
struct GranolaMcp {
    state: Arc<ServerState>,
}

// =============================================================================
// Tool parameter types
// =============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchMeetingsParams {
    #[schemars(description = "Search query for meeting titles, participants, and transcripts")]
    query: String,
    #[schemars(description = "Maximum number of results (default 10)")]
    limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct MeetingIdParams {
    #[schemars(description = "Meeting ID to look up")]
    meeting_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DateRangeParams {
    #[schemars(description = "Start date (YYYY-MM-DD), inclusive")]
    start_date: Option<String>,
    #[schemars(description = "End date (YYYY-MM-DD), inclusive")]
    end_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AnalyzePatternsParams {
    #[schemars(description = "Type of pattern to analyze: topics, participants, or frequency")]
    pattern_type: String,
    #[schemars(description = "Optional date range restricting the analysis")]
    date_range: Option<DateRangeParams>,
}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool(tool_box)]
impl GranolaMcp {
    fn new(state: ServerState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    #[tool(
        description = "Search meetings by title, content, or participants. Returns ranked matches with relevance scores."
    )]
    async fn search_meetings(&self, #[tool(aggr)] params: SearchMeetingsParams) -> String {
        let snapshot = self.state.snapshot().await;
        let limit = params.limit.unwrap_or(queries::DEFAULT_SEARCH_LIMIT);
        let hits = queries::search_meetings(&snapshot, &params.query, limit);

        if hits.is_empty() {
            return format!("No meetings found matching '{}'", params.query);
        }
        to_pretty_json(&hits)
    }

    #[tool(description = "Get detailed information about a specific meeting, including document count and transcript availability.")]
    async fn get_meeting_details(&self, #[tool(aggr)] params: MeetingIdParams) -> String {
        let snapshot = self.state.snapshot().await;
        match queries::get_meeting_details(&snapshot, &params.meeting_id) {
            Some(details) => to_pretty_json(&details),
            None => format!("Meeting '{}' not found", params.meeting_id),
        }
    }

    #[tool(description = "Get the transcript for a specific meeting.")]
    async fn get_meeting_transcript(&self, #[tool(aggr)] params: MeetingIdParams) -> String {
        let snapshot = self.state.snapshot().await;
        match queries::get_meeting_transcript(&snapshot, &params.meeting_id) {
            Some(transcript) => to_pretty_json(transcript),
            None => format!("No transcript available for meeting '{}'", params.meeting_id),
        }
    }

    #[tool(description = "Get the documents (meeting notes) associated with a meeting.")]
    async fn get_meeting_documents(&self, #[tool(aggr)] params: MeetingIdParams) -> String {
        let snapshot = self.state.snapshot().await;
        let documents = queries::get_meeting_documents(&snapshot, &params.meeting_id);
        if documents.is_empty() {
            return format!("No documents found for meeting '{}'", params.meeting_id);
        }
        to_pretty_json(&documents)
    }

    #[tool(description = "Analyze patterns across meetings: participants (most frequent attendees), frequency (meetings per month), or topics (common title keywords). Optionally restricted to a date range.")]
    async fn analyze_meeting_patterns(
        &self,
        #[tool(aggr)] params: AnalyzePatternsParams,
    ) -> String {
        let pattern_type: PatternType = match params.pattern_type.parse() {
            Ok(p) => p,
            Err(e) => return format!("Error: {e}"),
        };
        let date_range = match params.date_range {
            Some(ref r) => {
                match DateRange::parse(r.start_date.as_deref(), r.end_date.as_deref()) {
                    Ok(range) => Some(range),
                    Err(e) => return format!("Error: {e}"),
                }
            }
            None => None,
        };

        let snapshot = self.state.snapshot().await;
        let report = queries::analyze_patterns(&snapshot, pattern_type, date_range);
        to_pretty_json(&report)
    }
}

#[tool(tool_box)]
impl ServerHandler for GranolaMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "granola-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "Read-only access to Granola meeting data. Use search_meetings to find \
                 meetings, get_meeting_details / get_meeting_transcript / \
                 get_meeting_documents for a specific meeting, and \
                 analyze_meeting_patterns for cross-meeting statistics."
                    .to_string(),
            ),
        }
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {e}"))
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let override_path = std::env::args().nth(1);
    let cache_path = cache::resolve_cache_path(override_path.as_deref());
    log::info!("Serving Granola cache from {}", cache_path.display());

    let server = GranolaMcp::new(ServerState::new(cache_path));

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
