use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::services::MergeError;
use crate::domain::MergeRequest;
use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Debug, Deserialize)]
pub struct MergeBody {
    pub clip_urls: Vec<String>,
    #[serde(default = "default_true")]
    pub normalize_loudness: bool,
    #[serde(default)]
    pub output_name: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
pub struct MergeResponse {
    pub url: String,
}

#[tracing::instrument(skip(state, body), fields(clips = body.clip_urls.len()))]
pub async fn merge_handler(
    State(state): State<AppState>,
    Json(body): Json<MergeBody>,
) -> impl IntoResponse {
    let mut request = MergeRequest::new(body.clip_urls, body.normalize_loudness);
    if let Some(name) = body.output_name {
        request = request.with_output_name(name);
    }

    match state.merge_engine.merge(&request).await {
        Ok(url) => (StatusCode::OK, Json(MergeResponse { url })).into_response(),
        Err(MergeError::NoClips) => {
            error_response(StatusCode::BAD_REQUEST, MergeError::NoClips.to_string())
        }
        Err(MergeError::Transcode(e)) if e.is_rate_limited() => {
            error_response(StatusCode::TOO_MANY_REQUESTS, e.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "Merge failed");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}
