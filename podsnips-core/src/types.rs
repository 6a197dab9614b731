//! Core domain types for podsnips
//!
//! | Term | Definition |
//! |------|------------|
//! | **Project** | A podcast episode container holding derived tasks |
//! | **Task** | A candidate highlight moment within a project, anchored to a timestamp |
//! | **Clip** | A user-confirmed, time-bounded excerpt created from a task |
//! | **TranscriptSegment** | A timed piece of spoken-word text from the project's source video |
//!
//! Field names follow the API's JSON, so the same types decode server
//! responses and round-trip through the persisted state blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================
// Project
// ============================================

/// A podcast episode awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Server-issued identifier
    pub id: String,
    /// Episode title
    #[serde(default)]
    pub episode: String,
    /// Workflow status (e.g. "Not started")
    #[serde(default)]
    pub status: String,
    /// Name of the show
    #[serde(default)]
    pub podcast_show: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub episode_number: Option<u32>,
    #[serde(default)]
    pub created_date: Option<String>,
    /// Number of snips the source page reports
    #[serde(default, deserialize_with = "lenient_count")]
    pub snips: Option<u32>,
}

/// Accepts a number, a numeric string, an empty string or null.
///
/// The server fills unset numeric properties with `""`.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// ============================================
// Task
// ============================================

/// A candidate highlight moment.
///
/// `id` is not sent by the server; it is derived from `timestamp` when a
/// page of tasks is loaded (see [`Task::with_derived_id`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    /// "HH:MM:SS" or "MM:SS"
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_level: Option<u8>,
    /// Clips cut from this task (append-only)
    #[serde(default)]
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub rejected: bool,
    #[serde(
        default,
        rename = "rejectedAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub rejected_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Assign the cache identity. Tasks are keyed by their timestamp.
    pub fn with_derived_id(mut self) -> Self {
        self.id = self.timestamp.clone();
        self
    }

    /// The first clip, which is the one the UI surfaces.
    pub fn primary_clip(&self) -> Option<&Clip> {
        self.clips.first()
    }

    /// Display title, falling back for untitled tasks.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled Task"
        } else {
            &self.title
        }
    }
}

// ============================================
// Clip
// ============================================

/// A time-bounded excerpt created from a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub title: String,
    /// "HH:MM:SS"
    #[serde(rename = "startTime")]
    pub start_time: String,
    /// "HH:MM:SS"
    #[serde(rename = "endTime")]
    pub end_time: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

// ============================================
// Transcript
// ============================================

/// A timed piece of transcript text. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub text: String,
}

impl TranscriptSegment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}
