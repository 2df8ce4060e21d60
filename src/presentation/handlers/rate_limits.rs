use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::ResearchProvider;
use crate::presentation::state::AppState;

use super::responses::error_response;

#[derive(Serialize)]
pub struct RateLimitResponse {
    pub key: String,
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: String,
}

pub async fn rate_limit_handler<P>(
    State(state): State<AppState<P>>,
    Path(key): Path<String>,
) -> impl IntoResponse
where
    P: ResearchProvider + 'static,
{
    match state.rate_limiter.get_rate_limit_info(&key) {
        Ok(info) => (
            StatusCode::OK,
            Json(RateLimitResponse {
                key,
                remaining: info.remaining,
                limit: info.limit,
                reset_time: info.reset_time.to_rfc3339(),
            }),
        )
            .into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}
