//! HTTP client for the PodSnips API

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::types::Project;

use super::payloads::{
    CreateClipRequest, CreateClipResponse, ErrorBody, HealthResponse, ProjectDetailResponse,
    ProjectsResponse, TaskPage, TranscriptResponse,
};

/// The API operations the caches depend on.
///
/// [`ApiClient`] is the HTTP implementation; tests substitute in-memory fakes.
pub trait PodSnipsApi: Send + Sync + 'static {
    /// GET /projects
    fn fetch_projects(&self) -> impl Future<Output = Result<Vec<Project>>> + Send;

    /// GET /projects/{id}/tasks?page&page_size (pages are 1-indexed)
    fn fetch_project_tasks(
        &self,
        project_id: &str,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<TaskPage>> + Send;

    /// GET /projects/{id}/transcript
    fn fetch_project_transcript(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<TranscriptResponse>> + Send;

    /// POST /create
    fn create_snippet(
        &self,
        request: &CreateClipRequest,
    ) -> impl Future<Output = Result<CreateClipResponse>> + Send;
}

/// HTTP client for the PodSnips API
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn project_url(&self, project_id: &str, suffix: &str) -> String {
        format!(
            "{}/projects/{}{}",
            self.base_url,
            urlencoding::encode(project_id),
            suffix
        )
    }

    /// GET /projects/{id}
    ///
    /// Returns None if the server does not know the project.
    pub async fn fetch_project_details(&self, project_id: &str) -> Result<Option<Project>> {
        let response = self
            .http_client
            .get(self.project_url(project_id, ""))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let detail: ProjectDetailResponse = decode(response).await?;
        Ok(detail.project)
    }

    /// Check if the API is reachable and reports itself healthy
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        match self.http_client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = decode(response).await?;
                tracing::debug!(status = %health.status, message = %health.message, "Health check");
                Ok(health.status.is_empty() || health.status == "healthy")
            }
            Ok(_) => Ok(false),
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                Ok(false)
            }
        }
    }
}

impl PodSnipsApi for ApiClient {
    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        let url = format!("{}/projects", self.base_url);
        let response = self.http_client.get(&url).send().await?;
        let body: ProjectsResponse = decode(response).await?;

        tracing::debug!(count = body.count, received = body.projects.len(), "Fetched projects");
        Ok(body.projects)
    }

    async fn fetch_project_tasks(
        &self,
        project_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<TaskPage> {
        let response = self
            .http_client
            .get(self.project_url(project_id, "/tasks"))
            .query(&[("page", page), ("page_size", page_size)])
            .send()
            .await?;

        decode(response).await
    }

    async fn fetch_project_transcript(&self, project_id: &str) -> Result<TranscriptResponse> {
        let response = self
            .http_client
            .get(self.project_url(project_id, "/transcript"))
            .send()
            .await?;

        decode(response).await
    }

    async fn create_snippet(&self, request: &CreateClipRequest) -> Result<CreateClipResponse> {
        let url = format!("{}/create", self.base_url);
        let response = self.http_client.post(&url).json(request).send().await?;

        decode(response).await
    }
}

/// Decode a JSON body, turning non-success statuses and `{"success": false}`
/// bodies into [`Error::Api`].
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    parse_body(status.as_u16(), status.is_success(), &text)
}

fn parse_body<T: DeserializeOwned>(status: u16, is_success: bool, text: &str) -> Result<T> {
    let error_body = serde_json::from_str::<ErrorBody>(text).ok();

    if !is_success {
        let message = error_body
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| {
                if text.trim().is_empty() {
                    "unknown".to_string()
                } else {
                    text.trim().to_string()
                }
            });
        return Err(Error::Api { status, message });
    }

    if let Some(ErrorBody {
        success: Some(false),
        error,
        message,
    }) = error_body
    {
        return Err(Error::Api {
            status,
            message: error
                .or(message)
                .unwrap_or_else(|| "request unsuccessful".to_string()),
        });
    }

    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_valid_config() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(ApiClient::new(&config).is_err());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let config = ApiConfig {
            base_url: "https://podsnips.example.com/api/v1/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://podsnips.example.com/api/v1");
        assert_eq!(
            client.project_url("a b/c", "/tasks"),
            "https://podsnips.example.com/api/v1/projects/a%20b%2Fc/tasks"
        );
    }

    #[test]
    fn test_parse_body_error_field() {
        let err = parse_body::<ProjectsResponse>(
            500,
            false,
            r#"{"success": false, "error": "notion unavailable"}"#,
        )
        .unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "notion unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_body_plain_text_error() {
        let err = parse_body::<ProjectsResponse>(502, false, "Bad Gateway").unwrap_err();
        assert_eq!(err.to_string(), "API error (502): Bad Gateway");
    }

    #[test]
    fn test_parse_body_success_false_on_ok_status() {
        let err = parse_body::<CreateClipResponse>(
            200,
            true,
            r#"{"success": false, "message": "download failed"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Api { status: 200, .. }));
    }

    #[test]
    fn test_parse_body_success() {
        let body: ProjectsResponse = parse_body(
            200,
            true,
            r#"{"success": true, "count": 1, "projects": [{"id": "p1", "episode": "Ep"}]}"#,
        )
        .unwrap();
        assert_eq!(body.projects[0].id, "p1");
    }

    #[test]
    fn test_parse_body_malformed_json() {
        let err = parse_body::<ProjectsResponse>(200, true, "<html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
