//! Series API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use cinesub_core::{catalog::SeasonNumber, SeasonListing, SeriesOverview, UpdateOutcome};

use crate::state::AppState;

use super::handlers::{error_response, paths_to_strings, ErrorResponse};
use super::movies::FilesResponse;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct PackageResponse {
    pub archive: String,
}

/// GET /api/series/search?query=
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SeriesOverview>, (StatusCode, Json<ErrorResponse>)> {
    let overview = state
        .orchestrator()
        .search_series(&params.query)
        .await
        .map_err(error_response)?;

    Ok(Json(overview))
}

/// GET /api/series/{series_id}
pub async fn overview(
    State(state): State<Arc<AppState>>,
    Path(series_id): Path<String>,
) -> Result<Json<SeriesOverview>, (StatusCode, Json<ErrorResponse>)> {
    let overview = state
        .orchestrator()
        .series_overview(&series_id)
        .await
        .map_err(error_response)?;

    Ok(Json(overview))
}

/// GET /api/series/{series_id}/seasons/{season}
pub async fn season_status(
    State(state): State<Arc<AppState>>,
    Path((series_id, season)): Path<(String, SeasonNumber)>,
) -> Result<Json<SeasonListing>, (StatusCode, Json<ErrorResponse>)> {
    let listing = state
        .orchestrator()
        .season_status(&series_id, season)
        .await
        .map_err(error_response)?;

    Ok(Json(listing))
}

/// POST /api/series/{series_id}/seasons/{season}/acquire
pub async fn acquire_season(
    State(state): State<Arc<AppState>>,
    Path((series_id, season)): Path<(String, SeasonNumber)>,
) -> Result<Json<SeasonListing>, (StatusCode, Json<ErrorResponse>)> {
    let listing = state
        .orchestrator()
        .acquire_season(&series_id, season)
        .await
        .map_err(error_response)?;

    Ok(Json(listing))
}

/// POST /api/series/{series_id}/seasons/{season}/update
pub async fn update_season(
    State(state): State<Arc<AppState>>,
    Path((series_id, season)): Path<(String, SeasonNumber)>,
) -> Result<Json<UpdateOutcome>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = state
        .orchestrator()
        .update_season(&series_id, season)
        .await
        .map_err(error_response)?;

    Ok(Json(outcome))
}

/// POST /api/series/{series_id}/seasons/{season}/package
pub async fn package_season(
    State(state): State<Arc<AppState>>,
    Path((series_id, season)): Path<(String, SeasonNumber)>,
) -> Result<Json<PackageResponse>, (StatusCode, Json<ErrorResponse>)> {
    let archive = state
        .orchestrator()
        .package_season(&series_id, season)
        .await
        .map_err(error_response)?;

    Ok(Json(PackageResponse {
        archive: archive.display().to_string(),
    }))
}

/// GET /api/series/{series_id}/seasons/{season}/episodes/{episode}
pub async fn episode_files(
    State(state): State<Arc<AppState>>,
    Path((series_id, season, episode)): Path<(String, SeasonNumber, u32)>,
) -> Result<Json<FilesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let files = state
        .orchestrator()
        .acquire_episode(&series_id, season, episode)
        .await
        .map_err(error_response)?;

    Ok(Json(FilesResponse {
        files: paths_to_strings(&files),
    }))
}
