//! Asset fetching - resolves a content page to a normalized directory of
//! subtitle files.

mod http;

pub use http::HttpAssetFetcher;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::extractor::ExtractError;

/// File extensions recognized as subtitle files during normalization.
pub const SUBTITLE_EXTENSIONS: [&str; 10] = [
    "srt", "ass", "ssa", "vtt", "stl", "scc", "ttml", "sbv", "idx", "sub",
];

/// Whether a path has a recognized subtitle extension.
pub fn is_subtitle_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            SUBTITLE_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// Errors that can occur while fetching and normalizing subtitle assets.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level request failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The content page or archive URL answered with a non-success status.
    #[error("Upstream returned HTTP {status} for {url}")]
    Upstream { url: String, status: u16 },

    /// The content page has no recognizable archive download link.
    #[error("No archive download link found on {0}")]
    NoArchiveLink(String),

    /// A URL failed to parse or resolve.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Archive extraction failed; on corruption the destination directory
    /// has already been rolled back.
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    /// I/O error while writing or normalizing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for subtitle asset fetchers.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Resolve `page_url` to its embedded archive, download and extract it
    /// under `dest_dir`, and normalize the result to a flat set of subtitle
    /// files. Returns the final file paths, sorted.
    ///
    /// After a `Corrupt` extraction error the destination directory no
    /// longer exists; callers must not treat it as a cache hit.
    async fn fetch_and_normalize(
        &self,
        page_url: &str,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, FetchError>;
}
