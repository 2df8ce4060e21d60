use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::ResearchProvider;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    delete_job_handler, health_handler, job_status_handler, list_jobs_handler, rate_limit_handler,
    research_handler, usage_handler, wait_for_job_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<P>(state: AppState<P>) -> Router
where
    P: ResearchProvider + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler::<P>))
        .route("/api/v1/research", post(research_handler::<P>))
        .route("/api/v1/jobs", get(list_jobs_handler::<P>))
        .route(
            "/api/v1/jobs/{job_id}",
            get(job_status_handler::<P>).delete(delete_job_handler::<P>),
        )
        .route("/api/v1/jobs/{job_id}/wait", get(wait_for_job_handler::<P>))
        .route("/api/v1/rate-limits/{key}", get(rate_limit_handler::<P>))
        .route("/api/v1/usage", get(usage_handler::<P>))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
