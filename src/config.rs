//! Process-wide run configuration.
//!
//! Read once at startup, never mutated during a run. Anything the
//! orchestrator, engine, or finder treats as a tunable lives here.

use std::path::PathBuf;

/// Default MediaWiki API endpoint.
pub const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Base URL for article pages. Includes the trailing slash.
pub const WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org/wiki/";

/// Models to benchmark (OpenRouter model IDs).
pub const MODELS: &[&str] = &[
    "openai/gpt-5.2",
    "anthropic/claude-opus-4.5",
    "x-ai/grok-4.1-fast",
    "google/gemini-3-flash-preview",
];

/// Short display names used in peer-pressure framing and summaries.
pub fn model_display_name(model_id: &str) -> &str {
    match model_id {
        "openai/gpt-5.2" => "GPT-5.2",
        "anthropic/claude-opus-4.5" => "Claude Opus 4.5",
        "x-ai/grok-4.1-fast" => "Grok 4.1 Fast",
        "google/gemini-3-flash-preview" => "Gemini 3 Flash",
        other => other,
    }
}

/// Run-wide tunables with compiled defaults.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// OpenRouter model IDs under test.
    pub models: Vec<String>,
    /// Move ceiling per attempt. Also the ranking cost for failed attempts.
    pub max_clicks: u32,
    /// Per-move retry budget for unparseable or invalid policy output.
    pub move_retry_budget: u32,
    /// Sampled (start, target) pairs per model per condition.
    pub attempts_per_model: usize,
    /// Worst attempts dropped per model when computing trimmed statistics.
    pub trimmed_drop_count: usize,
    /// Global cap on simultaneously running attempts.
    pub max_concurrent_attempts: usize,
    /// BFS depth bound for shortest-path queries.
    pub max_search_depth: u32,
    /// Articles created after this date qualify for the cutoff condition.
    pub cutoff_date: chrono::NaiveDate,
    /// Root directory for CSV, trace, and tips outputs.
    pub outputs_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            models: MODELS.iter().map(|m| m.to_string()).collect(),
            max_clicks: 30,
            move_retry_budget: 3,
            attempts_per_model: 15,
            trimmed_drop_count: 3,
            max_concurrent_attempts: 4,
            max_search_depth: 10,
            cutoff_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 1)
                .expect("valid compiled cutoff date"),
            outputs_dir: PathBuf::from("outputs"),
        }
    }
}
