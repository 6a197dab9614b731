//! PodSnips API access
//!
//! The server exposes projects, paginated tasks and transcripts under a
//! versioned base URL (default `http://localhost:5000/api/v1`):
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/projects` | [`PodSnipsApi::fetch_projects`] |
//! | GET | `/projects/{id}` | [`ApiClient::fetch_project_details`] |
//! | GET | `/projects/{id}/tasks?page&page_size` | [`PodSnipsApi::fetch_project_tasks`] |
//! | GET | `/projects/{id}/transcript` | [`PodSnipsApi::fetch_project_transcript`] |
//! | POST | `/create` | [`PodSnipsApi::create_snippet`] |
//! | GET | `/health` | [`ApiClient::health_check`] |

mod client;
mod payloads;

pub use client::{ApiClient, PodSnipsApi};
pub use payloads::{
    CreateClipRequest, CreateClipResponse, HealthResponse, ProjectDetailResponse,
    ProjectsResponse, TaskPage, TranscriptResponse,
};
