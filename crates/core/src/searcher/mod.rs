//! Subtitle site search.
//!
//! Scrapes the subtitle-hosting site's listing pages for movie content
//! pages and per-episode series pages.

mod baiscope;
mod types;

pub use baiscope::BaiscopeSearcher;
pub use types::*;

use async_trait::async_trait;

/// Trait for subtitle site search backends.
#[async_trait]
pub trait SiteSearcher: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Search the site for movie content pages.
    ///
    /// Only listing entries carrying a "(YYYY)" year marker count as
    /// movies; at most a handful of hits are returned.
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieHit>, SearchError>;

    /// Walk the site's paged search results for every episode page of a
    /// series. Entries are recognized by their "[Sxx : Eyy" title marker.
    async fn discover_series(&self, series_name: &str) -> Result<Vec<EpisodeHit>, SearchError>;
}
