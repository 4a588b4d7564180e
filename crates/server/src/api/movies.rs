//! Movie API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use cinesub_core::MovieSummary;

use crate::state::AppState;

use super::handlers::{error_response, paths_to_strings, ErrorResponse};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct MovieSearchResponse {
    pub results: Vec<MovieSummary>,
}

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<String>,
}

/// GET /api/movies/search?query=
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<MovieSearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let results = state
        .orchestrator()
        .search_movies(&params.query)
        .await
        .map_err(error_response)?;

    Ok(Json(MovieSearchResponse { results }))
}

/// POST /api/movies/{movie_id}/acquire
pub async fn acquire(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> Result<Json<FilesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let files = state
        .orchestrator()
        .acquire_movie(&movie_id)
        .await
        .map_err(error_response)?;

    Ok(Json(FilesResponse {
        files: paths_to_strings(&files),
    }))
}
