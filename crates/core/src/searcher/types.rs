//! Types for subtitle site search results.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::SeasonNumber;

/// A movie content page found on the subtitle site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieHit {
    /// Listing title including the year marker, e.g. "Titanic (1997)".
    pub title: String,
    /// Title stripped for metadata lookup, e.g. "Titanic".
    pub search_title: String,
    /// Year from the listing's "(YYYY)" marker.
    pub year: String,
    /// Content page URL.
    pub page_url: String,
}

/// An episode content page found on the subtitle site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeHit {
    /// Series name as listed, stripped of season/episode markers.
    pub series_title: String,
    /// Season parsed from the "[Sxx" marker.
    pub season: SeasonNumber,
    /// Episode parsed from the "Eyy" marker.
    pub episode: u32,
    /// Content page URL.
    pub page_url: String,
}

/// Errors that can occur during site search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Subtitle site connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Subtitle site returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Request timeout")]
    Timeout,
}
