use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, movies, series};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Movies
        .route("/movies/search", get(movies::search))
        .route("/movies/{movie_id}/acquire", post(movies::acquire))
        // Series
        .route("/series/search", get(series::search))
        .route("/series/{series_id}", get(series::overview))
        .route(
            "/series/{series_id}/seasons/{season}",
            get(series::season_status),
        )
        .route(
            "/series/{series_id}/seasons/{season}/acquire",
            post(series::acquire_season),
        )
        .route(
            "/series/{series_id}/seasons/{season}/update",
            post(series::update_season),
        )
        .route(
            "/series/{series_id}/seasons/{season}/package",
            post(series::package_season),
        )
        .route(
            "/series/{series_id}/seasons/{season}/episodes/{episode}",
            get(series::episode_files),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
}
