use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::ResearchProvider;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ModelUsageResponse {
    pub model: String,
    pub requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub estimated_cost_usd: f64,
}

#[derive(Serialize)]
pub struct UsageSummaryResponse {
    pub models: Vec<ModelUsageResponse>,
    pub total_requests: u64,
    pub total_cost_usd: f64,
}

pub async fn usage_handler<P>(State(state): State<AppState<P>>) -> impl IntoResponse
where
    P: ResearchProvider + 'static,
{
    let snapshot = state.usage_tracker.snapshot();
    let models = snapshot
        .models
        .into_iter()
        .map(|m| ModelUsageResponse {
            model: m.model,
            requests: m.requests,
            input_tokens: m.input_tokens,
            output_tokens: m.output_tokens,
            estimated_cost_usd: m.estimated_cost_usd,
        })
        .collect();

    (
        StatusCode::OK,
        Json(UsageSummaryResponse {
            models,
            total_requests: snapshot.total_requests,
            total_cost_usd: snapshot.total_cost_usd,
        }),
    )
}
