use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::{Job, ResearchResult};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Serialize)]
pub struct ResearchResultResponse {
    pub content: String,
    pub citations: Vec<String>,
    pub model: String,
    pub usage: Option<UsageResponse>,
}

impl From<ResearchResult> for ResearchResultResponse {
    fn from(result: ResearchResult) -> Self {
        Self {
            content: result.content,
            citations: result.citations,
            model: result.model,
            usage: result.usage.map(|u| UsageResponse {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobDataResponse {
    pub query: String,
    pub deep: bool,
    pub model: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: String,
    pub status: String,
    pub progress: u8,
    pub data: JobDataResponse,
    pub result: Option<ResearchResultResponse>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id.to_string(),
            status: job.status.as_str().to_string(),
            progress: job.progress,
            data: JobDataResponse {
                query: job.data.query,
                deep: job.data.options.deep,
                model: job.data.options.model,
                session_id: job.data.session_id,
            },
            result: job.result.map(ResearchResultResponse::from),
            error: job.error,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
            completed_at: job.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobResponse>,
    pub count: usize,
}
