//! Request and response bodies of the PodSnips HTTP API

use serde::{Deserialize, Serialize};

use crate::transcript::{build_video_url, seconds_to_time};
use crate::types::{Project, Task, TranscriptSegment};

/// Response from GET /projects
#[derive(Debug, Deserialize)]
pub struct ProjectsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Response from GET /projects/{id}
#[derive(Debug, Deserialize)]
pub struct ProjectDetailResponse {
    #[serde(default)]
    pub success: bool,
    pub project: Option<Project>,
}

/// Response from GET /projects/{id}/tasks
///
/// Only `tasks` and `has_next` drive pagination; the counters are informational.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Response from GET /projects/{id}/transcript
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptResponse {
    #[serde(default)]
    pub success: bool,
    pub video_id: Option<String>,
    #[serde(default)]
    pub transcript: Option<Vec<TranscriptSegment>>,
}

/// Request body for POST /create
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateClipRequest {
    pub title: String,
    pub video_id: String,
    /// "HH:MM:SS"
    pub start: String,
    /// "HH:MM:SS"
    pub end: String,
    /// Watch URL of the source video
    pub video: String,
}

impl CreateClipRequest {
    /// Build a request for the span `[start_secs, end_secs]` of `video_id`.
    pub fn new(title: &str, video_id: &str, start_secs: f64, end_secs: f64) -> Self {
        Self {
            title: title.trim().to_string(),
            video_id: video_id.to_string(),
            start: seconds_to_time(start_secs),
            end: seconds_to_time(end_secs),
            video: build_video_url(Some(video_id), None).unwrap_or_default(),
        }
    }
}

/// Response from POST /create
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClipResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub canva_asset_id: Option<String>,
}

/// Response from GET /health
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Error body the server sends alongside non-success responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub success: Option<bool>,
    pub error: Option<String>,
    pub message: Option<String>,
}
