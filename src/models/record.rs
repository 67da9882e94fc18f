use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest transcript excerpt kept in the history store, in characters.
const EXCERPT_MAX_CHARS: usize = 500;

const TRUNCATION_MARKER: &str = "...";

/// Timestamp layout used in the history file (second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted analysis outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub timestamp: DateTime<Utc>,
    pub transcript_excerpt: String,
    pub summary: String,
    pub sentiment: String,
}

impl AnalysisRecord {
    /// Build a record from the raw transcript and the analysis outputs,
    /// stamped with the current time.
    pub fn new(transcript: &str, summary: String, sentiment: String) -> Self {
        let now = Utc::now();
        let timestamp = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        Self {
            timestamp,
            transcript_excerpt: excerpt(transcript),
            summary,
            sentiment,
        }
    }
}

/// Normalize a transcript for storage: line breaks become spaces and anything
/// past `EXCERPT_MAX_CHARS` characters is clipped with a marker.
pub fn excerpt(transcript: &str) -> String {
    let flattened: String = transcript
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    if flattened.chars().count() <= EXCERPT_MAX_CHARS {
        return flattened;
    }

    let mut clipped: String = flattened.chars().take(EXCERPT_MAX_CHARS).collect();
    clipped.push_str(TRUNCATION_MARKER);
    clipped
}
