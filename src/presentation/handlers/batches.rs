use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::BatchError;
use crate::domain::{BatchId, ClipJob, HighlightPosition, ScriptSegment, TextOverlay};
use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Debug, Deserialize)]
pub struct ClipRequest {
    pub name: String,
    pub source_url: String,
    pub full_text: String,
    #[serde(default)]
    pub highlight_text: String,
    #[serde(default = "default_position")]
    pub highlight_position: HighlightPosition,
    #[serde(default)]
    pub overlay: Option<TextOverlay>,
}

fn default_position() -> HighlightPosition {
    HighlightPosition::None
}

#[derive(Debug, Deserialize)]
pub struct StartBatchRequest {
    pub clips: Vec<ClipRequest>,
    #[serde(default)]
    pub batch_size: Option<usize>,
}

#[derive(Serialize)]
pub struct RetryResponse {
    pub batch_id: String,
    pub retried: usize,
}

fn parse_batch_id(raw: &str) -> Option<BatchId> {
    Uuid::parse_str(raw).ok().map(BatchId::from_uuid)
}

#[tracing::instrument(skip(state, request), fields(clips = request.clips.len()))]
pub async fn start_batch_handler(
    State(state): State<AppState>,
    Json(request): Json<StartBatchRequest>,
) -> impl IntoResponse {
    let mut jobs = Vec::with_capacity(request.clips.len());
    for clip in request.clips {
        let script = match ScriptSegment::new(
            clip.full_text,
            clip.highlight_text,
            clip.highlight_position,
        ) {
            Ok(script) => script,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid script for clip {}: {}", clip.name, e),
                );
            }
        };
        let job = ClipJob::new(clip.name, clip.source_url, script);
        jobs.push(match clip.overlay {
            Some(overlay) => job.with_overlay(overlay),
            None => job,
        });
    }

    let batch_size = request.batch_size.unwrap_or(state.default_batch_size);
    match state.coordinator.start(jobs, batch_size).await {
        Ok(handle) => {
            let snapshot = handle.progress();
            state.register(handle).await;
            (StatusCode::ACCEPTED, Json(snapshot)).into_response()
        }
        Err(e @ (BatchError::NoJobs | BatchError::InvalidBatchSize)) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to start batch");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn batch_progress_handler(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = parse_batch_id(&batch_id) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid batch ID: {}", batch_id),
        );
    };

    match state.batch(id).await {
        Some(handle) => (StatusCode::OK, Json(handle.progress())).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Batch not found: {}", batch_id),
        ),
    }
}

#[tracing::instrument(skip(state))]
pub async fn retry_batch_handler(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = parse_batch_id(&batch_id) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid batch ID: {}", batch_id),
        );
    };
    let Some(handle) = state.batch(id).await else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Batch not found: {}", batch_id),
        );
    };

    match handle.retry_failed().await {
        Ok(retried) => (
            StatusCode::OK,
            Json(RetryResponse {
                batch_id,
                retried,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to retry batch");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
