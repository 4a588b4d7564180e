//! Shared API handlers and error mapping.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use cinesub_core::{AcquireError, MetadataError, SanitizedConfig};

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map an orchestrator error onto an HTTP status and JSON body.
pub fn error_response(error: AcquireError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        AcquireError::UnknownMovie(_)
        | AcquireError::SeriesNotFound(_)
        | AcquireError::UnknownSeries(_)
        | AcquireError::EpisodeUnavailable { .. }
        | AcquireError::Metadata(MetadataError::NotFound(_)) => StatusCode::NOT_FOUND,
        AcquireError::Metadata(MetadataError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
        AcquireError::Metadata(_) | AcquireError::Search(_) | AcquireError::Fetch(_) => {
            StatusCode::BAD_GATEWAY
        }
        AcquireError::Catalog(_) | AcquireError::Package(_) | AcquireError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// Render file paths for a JSON body.
pub fn paths_to_strings(files: &[std::path::PathBuf]) -> Vec<String> {
    files.iter().map(|p| p.display().to_string()).collect()
}
