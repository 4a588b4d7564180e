//! Metadata provider integration.
//!
//! Cross-references scraped catalog titles against an external metadata
//! API (TMDB) to get stable ids, canonical titles, and synopses.

mod tmdb;
mod types;

pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying the metadata provider.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimited,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Trait for metadata lookup backends.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Best movie match for a title, if any.
    async fn search_movie(&self, title: &str) -> Result<Option<MovieMatch>, MetadataError>;

    /// Best series match for a name, if any.
    async fn search_series(&self, name: &str) -> Result<Option<SeriesMatch>, MetadataError>;

    /// Full series record by external id; `NotFound` when unknown.
    async fn series_by_id(&self, series_id: &str) -> Result<SeriesMatch, MetadataError>;
}
