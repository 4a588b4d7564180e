//! Mock site searcher for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::searcher::{EpisodeHit, MovieHit, SearchError, SiteSearcher};

/// Mock implementation of the SiteSearcher trait.
///
/// Returns configured hits, records queries for assertions, and can fail
/// the next call with an injected error.
#[derive(Default)]
pub struct MockSiteSearcher {
    movie_hits: RwLock<Vec<MovieHit>>,
    episode_hits: RwLock<Vec<EpisodeHit>>,
    queries: RwLock<Vec<String>>,
    next_error: RwLock<Option<SearchError>>,
}

impl MockSiteSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hits returned by `search_movies`.
    pub async fn set_movie_hits(&self, hits: Vec<MovieHit>) {
        *self.movie_hits.write().await = hits;
    }

    /// Set the hits returned by `discover_series`.
    pub async fn set_episode_hits(&self, hits: Vec<EpisodeHit>) {
        *self.episode_hits.write().await = hits;
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Queries recorded across both operations, in call order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Number of searches performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    async fn take_error(&self) -> Option<SearchError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl SiteSearcher for MockSiteSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieHit>, SearchError> {
        self.queries.write().await.push(query.to_string());
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.movie_hits.read().await.clone())
    }

    async fn discover_series(&self, series_name: &str) -> Result<Vec<EpisodeHit>, SearchError> {
        self.queries.write().await.push(series_name.to_string());
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.episode_hits.read().await.clone())
    }
}
