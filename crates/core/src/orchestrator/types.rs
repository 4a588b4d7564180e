//! Types for the acquisition orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogError, SeasonNumber};
use crate::fetcher::FetchError;
use crate::library::PackageError;
use crate::metadata::MetadataError;
use crate::searcher::SearchError;

/// A movie search result ready for presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub movie_id: String,
    pub title: String,
    pub year: String,
    pub overview: String,
}

/// A series with the seasons the catalog knows about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesOverview {
    pub series_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    pub seasons: Vec<SeasonNumber>,
}

/// Availability of one episode within a season listing.
///
/// Availability is derived from directory presence: a populated episode
/// directory means "already fetched".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeStatus {
    pub episode: u32,
    pub available: bool,
}

/// A season's episodes with per-episode availability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonListing {
    pub series_id: String,
    pub series_name: String,
    pub season: SeasonNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    pub episodes: Vec<EpisodeStatus>,
}

/// Result of an explicit season update request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The catalog was already refreshed today; nothing was re-scraped.
    AlreadyFresh,
    /// Stale catalog rows were re-discovered and missing episodes fetched.
    Refreshed(SeasonListing),
}

/// Errors surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// No cached row for the requested movie id.
    #[error("Unknown movie id: {0}")]
    UnknownMovie(String),

    /// The metadata provider had no match for the series name.
    #[error("No series found matching {0:?}")]
    SeriesNotFound(String),

    /// The catalog has no episode rows for the series.
    #[error("No episodes known for series {0}")]
    UnknownSeries(String),

    /// The episode has no populated directory on disk.
    #[error("Subtitles for series {series_id} S{season}E{episode} are not available")]
    EpisodeUnavailable {
        series_id: String,
        season: SeasonNumber,
        episode: u32,
    },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
