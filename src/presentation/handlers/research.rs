use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::ports::ResearchProvider;
use crate::application::services::{ResearchError, SubmitOutcome};
use crate::domain::{ResearchOptions, ResearchRequest};
use crate::presentation::state::AppState;

use super::responses::{ResearchResultResponse, error_response};

#[derive(Deserialize)]
pub struct ResearchRequestBody {
    pub query: String,
    #[serde(default)]
    pub deep: bool,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ResearchResponse {
    Sync {
        result: ResearchResultResponse,
    },
    Async {
        job_id: String,
        estimated_time_secs: u64,
    },
}

#[tracing::instrument(skip(state, body), fields(deep = body.deep))]
pub async fn research_handler<P>(
    State(state): State<AppState<P>>,
    Json(body): Json<ResearchRequestBody>,
) -> impl IntoResponse
where
    P: ResearchProvider + 'static,
{
    let mut request = ResearchRequest::new(
        body.query,
        ResearchOptions {
            deep: body.deep,
            model: body.model,
            system_prompt: body.system_prompt,
        },
    );
    if let Some(session_id) = body.session_id {
        request = request.with_session_id(session_id);
    }

    match state.orchestrator.submit_request(request).await {
        Ok(SubmitOutcome::Sync { result }) => (
            StatusCode::OK,
            Json(ResearchResponse::Sync {
                result: result.into(),
            }),
        )
            .into_response(),
        Ok(SubmitOutcome::Async {
            job_id,
            estimated_time,
        }) => {
            tracing::info!(job_id = %job_id, "Research accepted as job");
            (
                StatusCode::ACCEPTED,
                Json(ResearchResponse::Async {
                    job_id: job_id.to_string(),
                    estimated_time_secs: estimated_time.as_secs(),
                }),
            )
                .into_response()
        }
        Err(ResearchError::Validation(e)) => {
            tracing::warn!(error = %e, "Rejected research request");
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(ResearchError::Provider(e)) => {
            error_response(StatusCode::BAD_GATEWAY, format!("Provider error: {}", e))
        }
        Err(e) => {
            tracing::error!(error = %e, "Research submission failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Research failed: {}", e),
            )
        }
    }
}
