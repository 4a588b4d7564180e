//! Mock metadata provider for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::metadata::{MetadataError, MetadataProvider, MovieMatch, SeriesMatch};

/// Mock implementation of the MetadataProvider trait.
#[derive(Default)]
pub struct MockMetadataProvider {
    movie: RwLock<Option<MovieMatch>>,
    series: RwLock<Option<SeriesMatch>>,
    series_by_id: RwLock<HashMap<String, SeriesMatch>>,
    lookups: RwLock<Vec<String>>,
}

impl MockMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best match returned by `search_movie` (None means no match).
    pub async fn set_movie_match(&self, movie: Option<MovieMatch>) {
        *self.movie.write().await = movie;
    }

    /// Best match returned by `search_series` (None means no match).
    pub async fn set_series_match(&self, series: Option<SeriesMatch>) {
        *self.series.write().await = series;
    }

    /// Register a series for id lookup.
    pub async fn insert_series(&self, series: SeriesMatch) {
        self.series_by_id
            .write()
            .await
            .insert(series.id.clone(), series);
    }

    /// Titles and ids looked up so far, in call order.
    pub async fn recorded_lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }
}

#[async_trait]
impl MetadataProvider for MockMetadataProvider {
    async fn search_movie(&self, title: &str) -> Result<Option<MovieMatch>, MetadataError> {
        self.lookups.write().await.push(title.to_string());
        Ok(self.movie.read().await.clone())
    }

    async fn search_series(&self, name: &str) -> Result<Option<SeriesMatch>, MetadataError> {
        self.lookups.write().await.push(name.to_string());
        Ok(self.series.read().await.clone())
    }

    async fn series_by_id(&self, series_id: &str) -> Result<SeriesMatch, MetadataError> {
        self.lookups.write().await.push(series_id.to_string());
        self.series_by_id
            .read()
            .await
            .get(series_id)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(format!("TV series ID {}", series_id)))
    }
}
