//! Media catalog - a cache of movie and series/episode metadata.
//!
//! The catalog memoizes search-and-match results so future requests can
//! resolve source links locally before hitting the subtitle site again.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

use chrono::{DateTime, Utc};

/// Trait for the movie/episode metadata cache.
pub trait MediaCatalog: Send + Sync {
    /// Store a movie row unless one already exists for its movie_id.
    ///
    /// Movie rows are write-once: a second insert for the same id is a
    /// no-op and the original values win.
    fn insert_movie_if_absent(&self, record: &MovieRecord) -> Result<(), CatalogError>;

    /// Look up the catalog page URL for a movie id.
    fn movie_source_link(&self, movie_id: &str) -> Result<Option<String>, CatalogError>;

    /// Store an episode row, replacing any previous row with the same
    /// source_link.
    fn upsert_episode(&self, record: &EpisodeRecord) -> Result<(), CatalogError>;

    /// All known episodes for a (series, season), sorted by episode ordinal.
    fn episodes_for_season(
        &self,
        series_id: &str,
        season: SeasonNumber,
    ) -> Result<Vec<EpisodeRecord>, CatalogError>;

    /// All known episodes for a series.
    fn episodes_for_series(&self, series_id: &str) -> Result<Vec<EpisodeRecord>, CatalogError>;

    /// Distinct seasons known for a series, ascending.
    fn seasons_for_series(&self, series_id: &str) -> Result<Vec<SeasonNumber>, CatalogError>;

    /// Series name as recorded by discovery, if the series is known.
    fn series_name(&self, series_id: &str) -> Result<Option<String>, CatalogError>;

    /// Timestamp of the most recently refreshed row for a series.
    fn last_updated(&self, series_id: &str) -> Result<Option<DateTime<Utc>>, CatalogError>;

    /// Whether the series was refreshed today (calendar date, not a
    /// rolling window - the update flow relies on this exact semantic).
    fn is_fresh_today(&self, series_id: &str) -> Result<bool, CatalogError>;
}
