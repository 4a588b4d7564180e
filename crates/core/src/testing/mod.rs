//! Test doubles for the orchestrator's collaborators.
//!
//! Used by unit and integration tests; not part of the public pipeline.

mod mock_fetcher;
mod mock_metadata;
mod mock_notifier;
mod mock_searcher;

pub use mock_fetcher::{MockAssetFetcher, MockFetchOutcome};
pub use mock_metadata::MockMetadataProvider;
pub use mock_notifier::MockNotifier;
pub use mock_searcher::MockSiteSearcher;

/// Ready-made records and hits for tests.
pub mod fixtures {
    use chrono::Utc;

    use crate::catalog::{EpisodeRecord, MovieRecord, SeasonNumber};
    use crate::metadata::{MovieMatch, SeriesMatch};
    use crate::searcher::{EpisodeHit, MovieHit};

    pub fn movie_record(movie_id: &str, title: &str) -> MovieRecord {
        MovieRecord {
            movie_id: movie_id.to_string(),
            title: title.to_string(),
            year: "1999".to_string(),
            source_link: format!("https://example.lk/{}", movie_id),
            overview: "An overview".to_string(),
        }
    }

    pub fn episode_record(
        series_id: &str,
        season: u8,
        episode: u32,
        link: &str,
    ) -> EpisodeRecord {
        EpisodeRecord {
            series_id: series_id.to_string(),
            series_name: "Test Series".to_string(),
            year: "2008".to_string(),
            season: SeasonNumber::new(season),
            episode,
            source_link: link.to_string(),
            overview: "A series overview".to_string(),
            updated: Utc::now(),
        }
    }

    pub fn movie_hit(title: &str, year: &str, page_url: &str) -> MovieHit {
        MovieHit {
            title: format!("{} ({})", title, year),
            search_title: title.to_string(),
            year: year.to_string(),
            page_url: page_url.to_string(),
        }
    }

    pub fn episode_hit(series: &str, season: u8, episode: u32, page_url: &str) -> EpisodeHit {
        EpisodeHit {
            series_title: series.to_string(),
            season: SeasonNumber::new(season),
            episode,
            page_url: page_url.to_string(),
        }
    }

    pub fn movie_match(id: &str, title: &str) -> MovieMatch {
        MovieMatch {
            id: id.to_string(),
            title: title.to_string(),
            year: Some("1999".to_string()),
            overview: "An overview".to_string(),
        }
    }

    pub fn series_match(id: &str, name: &str) -> SeriesMatch {
        SeriesMatch {
            id: id.to_string(),
            name: name.to_string(),
            year: Some("2008".to_string()),
            overview: "A series overview".to_string(),
            poster_path: Some("/poster.jpg".to_string()),
        }
    }
}
