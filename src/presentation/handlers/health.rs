use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::ResearchProvider;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub tracked_jobs: Option<usize>,
}

/// Liveness plus a cheap look at the job store; a failing count does not fail the health check.
pub async fn health_handler<P>(State(state): State<AppState<P>>) -> impl IntoResponse
where
    P: ResearchProvider + 'static,
{
    let tracked_jobs = match state.job_manager.job_count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Job count unavailable for health check");
            None
        }
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            provider: state.settings.provider.name.clone(),
            tracked_jobs,
        }),
    )
}
