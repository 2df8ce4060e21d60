use std::str::FromStr;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::ports::ResearchProvider;
use crate::application::services::{JobManagerError, PollError};
use crate::domain::{JobId, JobStatus};
use crate::presentation::state::AppState;

use super::responses::{JobListResponse, JobResponse, ResearchResultResponse, error_response};

const MIN_POLL_INTERVAL_MS: u64 = 10;

#[derive(Debug, Deserialize)]
pub struct WaitParams {
    pub max_attempts: Option<u32>,
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    pub status: Option<String>,
}

const ALL_STATUSES: [JobStatus; 4] = [
    JobStatus::Queued,
    JobStatus::Processing,
    JobStatus::Completed,
    JobStatus::Failed,
];

fn parse_job_id(raw: &str) -> Result<JobId, Response> {
    Uuid::parse_str(raw)
        .map(JobId::from_uuid)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, format!("Invalid job ID: {}", raw)))
}

fn job_error_response(error: JobManagerError) -> Response {
    match error {
        JobManagerError::NotFound(id) => {
            error_response(StatusCode::NOT_FOUND, format!("Job not found: {}", id))
        }
        e => {
            tracing::error!(error = %e, "Job lookup failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch job: {}", e),
            )
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler<P>(
    State(state): State<AppState<P>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse
where
    P: ResearchProvider + 'static,
{
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.job_manager.get_job_status(id).await {
        Ok(job) => (StatusCode::OK, Json(JobResponse::from(job))).into_response(),
        Err(e) => job_error_response(e),
    }
}

/// Lists jobs oldest first, optionally narrowed to one status.
#[tracing::instrument(skip(state))]
pub async fn list_jobs_handler<P>(
    State(state): State<AppState<P>>,
    Query(params): Query<ListJobsParams>,
) -> impl IntoResponse
where
    P: ResearchProvider + 'static,
{
    let statuses = match params.status.as_deref() {
        Some(raw) => match JobStatus::from_str(raw) {
            Ok(status) => vec![status],
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
        },
        None => ALL_STATUSES.to_vec(),
    };

    let mut jobs = Vec::new();
    for status in statuses {
        match state.job_manager.list_jobs(status).await {
            Ok(found) => jobs.extend(found),
            Err(e) => return job_error_response(e),
        }
    }
    jobs.sort_by_key(|job| job.created_at);

    let jobs: Vec<JobResponse> = jobs.into_iter().map(JobResponse::from).collect();
    (
        StatusCode::OK,
        Json(JobListResponse {
            count: jobs.len(),
            jobs,
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn delete_job_handler<P>(
    State(state): State<AppState<P>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse
where
    P: ResearchProvider + 'static,
{
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.job_manager.delete_job(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => job_error_response(e),
    }
}

/// Blocks until the job is terminal or the attempt budget runs out.
#[tracing::instrument(skip(state))]
pub async fn wait_for_job_handler<P>(
    State(state): State<AppState<P>>,
    Path(job_id): Path<String>,
    Query(params): Query<WaitParams>,
) -> impl IntoResponse
where
    P: ResearchProvider + 'static,
{
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let research = &state.settings.research;
    let max_attempts = params
        .max_attempts
        .unwrap_or(research.poll_max_attempts)
        .clamp(1, research.poll_max_attempts.max(1));
    let interval = Duration::from_millis(
        params
            .interval_ms
            .unwrap_or(research.poll_interval_ms)
            .max(MIN_POLL_INTERVAL_MS),
    );

    match state
        .job_poller
        .poll_job_status(id, max_attempts, interval)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(ResearchResultResponse::from(result))).into_response(),
        Err(PollError::JobFailed(reason)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, reason)
        }
        Err(PollError::Timeout { attempts }) => error_response(
            StatusCode::REQUEST_TIMEOUT,
            format!("Job {} still running after {} checks", id, attempts),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Polling failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
