//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{year_of, MovieMatch, SeriesMatch};
use super::{MetadataError, MetadataProvider};

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Image base URL for posters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_base_url: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, MetadataError> {
        if config.api_key.is_empty() {
            return Err(MetadataError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());

        let image_base_url = config
            .image_base_url
            .unwrap_or_else(|| "https://image.tmdb.org/t/p/original".to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            image_base_url,
        })
    }

    /// Base URL for joining relative poster paths.
    pub fn image_base_url(&self) -> &str {
        &self.image_base_url
    }

    async fn check_status(
        response: reqwest::Response,
        not_found: Option<String>,
    ) -> Result<reqwest::Response, MetadataError> {
        let status = response.status();
        if status == 401 {
            return Err(MetadataError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if status == 429 {
            return Err(MetadataError::RateLimited);
        }
        if status == 404 {
            if let Some(what) = not_found {
                return Err(MetadataError::NotFound(what));
            }
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search_movie(&self, title: &str) -> Result<Option<MovieMatch>, MetadataError> {
        let url = format!("{}/search/movie", self.base_url);

        debug!("TMDB movie search: query='{}'", title);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", title)])
            .send()
            .await?;

        let response = Self::check_status(response, None).await?;

        let search_result: TmdbSearchResponse<TmdbMovieResult> =
            response.json().await.map_err(|e| {
                MetadataError::Parse(format!("Failed to parse movie search response: {}", e))
            })?;

        Ok(search_result.results.into_iter().next().map(|r| r.into()))
    }

    async fn search_series(&self, name: &str) -> Result<Option<SeriesMatch>, MetadataError> {
        let url = format!("{}/search/tv", self.base_url);

        debug!("TMDB TV search: query='{}'", name);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", name)])
            .send()
            .await?;

        let response = Self::check_status(response, None).await?;

        let search_result: TmdbSearchResponse<TmdbTvResult> =
            response.json().await.map_err(|e| {
                MetadataError::Parse(format!("Failed to parse TV search response: {}", e))
            })?;

        Ok(search_result.results.into_iter().next().map(|r| r.into()))
    }

    async fn series_by_id(&self, series_id: &str) -> Result<SeriesMatch, MetadataError> {
        let url = format!("{}/tv/{}", self.base_url, series_id);

        debug!("TMDB get TV: id={}", series_id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let response =
            Self::check_status(response, Some(format!("TV series ID {}", series_id))).await?;

        let series: TmdbTvResult = response.json().await.map_err(|e| {
            MetadataError::Parse(format!("Failed to parse TV response: {}", e))
        })?;

        Ok(series.into())
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: u64,
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvResult {
    id: u64,
    name: String,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
}

impl From<TmdbMovieResult> for MovieMatch {
    fn from(r: TmdbMovieResult) -> Self {
        Self {
            id: r.id.to_string(),
            title: r.title,
            year: year_of(r.release_date.as_deref()),
            overview: r.overview.unwrap_or_default(),
        }
    }
}

impl From<TmdbTvResult> for SeriesMatch {
    fn from(r: TmdbTvResult) -> Self {
        Self {
            id: r.id.to_string(),
            name: r.name,
            year: year_of(r.first_air_date.as_deref()),
            overview: r.overview.unwrap_or_default(),
            poster_path: r.poster_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let result = TmdbClient::new(TmdbConfig {
            api_key: String::new(),
            base_url: None,
            image_base_url: None,
        });
        assert!(matches!(result, Err(MetadataError::NotConfigured(_))));
    }

    #[test]
    fn test_movie_result_conversion() {
        let result = TmdbMovieResult {
            id: 603,
            title: "The Matrix".to_string(),
            release_date: Some("1999-03-30".to_string()),
            overview: Some("A computer hacker...".to_string()),
        };

        let movie: MovieMatch = result.into();
        assert_eq!(movie.id, "603");
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.year, Some("1999".to_string()));
    }

    #[test]
    fn test_tv_result_conversion_without_air_date() {
        let result = TmdbTvResult {
            id: 1396,
            name: "Breaking Bad".to_string(),
            first_air_date: None,
            overview: None,
            poster_path: Some("/poster.jpg".to_string()),
        };

        let series: SeriesMatch = result.into();
        assert_eq!(series.id, "1396");
        assert_eq!(series.year, None);
        assert_eq!(series.overview, "");
        assert_eq!(series.poster_path, Some("/poster.jpg".to_string()));
    }

    #[test]
    fn test_search_response_takes_first_result() {
        let json = r#"{"results": [
            {"id": 1, "title": "First", "release_date": "2001-01-01", "overview": "one"},
            {"id": 2, "title": "Second", "release_date": "2002-01-01", "overview": "two"}
        ]}"#;
        let parsed: TmdbSearchResponse<TmdbMovieResult> = serde_json::from_str(json).unwrap();
        let first: MovieMatch = parsed.results.into_iter().next().unwrap().into();
        assert_eq!(first.title, "First");
    }
}
