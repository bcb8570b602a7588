use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    batch_progress_handler, health_handler, merge_handler, retry_batch_handler,
    start_batch_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/batches", post(start_batch_handler))
        .route("/api/v1/batches/{batch_id}", get(batch_progress_handler))
        .route("/api/v1/batches/{batch_id}/retry", post(retry_batch_handler))
        .route("/api/v1/merge", post(merge_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
