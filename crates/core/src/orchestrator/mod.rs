//! Acquisition orchestrator.
//!
//! Drives the whole request workflow: catalog lookup, site discovery,
//! archive fetching, and bulk packaging. Both cache layers - catalog rows
//! and library directories - are read fresh on every operation; nothing is
//! cached in process. Failures are never retried automatically, a new user
//! action is the only retry path.

mod types;

pub use types::*;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::catalog::{EpisodeRecord, MediaCatalog, MovieRecord, SeasonNumber};
use crate::fetcher::AssetFetcher;
use crate::library::SubtitleLibrary;
use crate::metadata::MetadataProvider;
use crate::notify::Notifier;
use crate::searcher::{EpisodeHit, SiteSearcher};

/// Per-fingerprint mutual exclusion, keyed by destination directory.
///
/// Directory existence doubles as the cache-hit signal, so two concurrent
/// requests for the same fingerprint must serialize: the second caller
/// blocks on the first and then observes its completed directory instead of
/// starting a second download.
#[derive(Default)]
struct FingerprintLocks {
    inner: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FingerprintLocks {
    async fn acquire(&self, key: &Path) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(key.to_path_buf()).or_default())
        };
        lock.lock_owned().await
    }
}

/// The acquisition orchestrator.
pub struct SubtitleOrchestrator {
    catalog: Arc<dyn MediaCatalog>,
    metadata: Arc<dyn MetadataProvider>,
    searcher: Arc<dyn SiteSearcher>,
    fetcher: Arc<dyn AssetFetcher>,
    library: SubtitleLibrary,
    notifier: Arc<dyn Notifier>,
    locks: FingerprintLocks,
}

impl SubtitleOrchestrator {
    /// Create a new orchestrator. All collaborators are injected; the
    /// orchestrator holds no global state.
    pub fn new(
        catalog: Arc<dyn MediaCatalog>,
        metadata: Arc<dyn MetadataProvider>,
        searcher: Arc<dyn SiteSearcher>,
        fetcher: Arc<dyn AssetFetcher>,
        library: SubtitleLibrary,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            catalog,
            metadata,
            searcher,
            fetcher,
            library,
            notifier,
            locks: FingerprintLocks::default(),
        }
    }

    /// Search the subtitle site for movies and cross-reference each hit
    /// against the metadata provider. Matches are memoized into the catalog
    /// so a later acquire can resolve the source link without re-scraping.
    pub async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, AcquireError> {
        self.notifier
            .progress(&format!("Searching movies for {:?}", query))
            .await;

        let hits = self.searcher.search_movies(query).await?;
        let mut summaries = Vec::new();

        for hit in hits {
            let Some(found) = self.metadata.search_movie(&hit.search_title).await? else {
                debug!(title = %hit.search_title, "No metadata match, skipping hit");
                continue;
            };

            let record = MovieRecord {
                movie_id: found.id,
                title: found.title,
                year: found.year.unwrap_or_else(|| hit.year.clone()),
                source_link: hit.page_url,
                overview: found.overview,
            };
            self.catalog.insert_movie_if_absent(&record)?;

            summaries.push(MovieSummary {
                movie_id: record.movie_id,
                title: record.title,
                year: record.year,
                overview: record.overview,
            });
        }

        info!(query = query, matches = summaries.len(), "Movie search done");
        Ok(summaries)
    }

    /// Acquire a movie's subtitles: serve the library directory when it
    /// exists, otherwise fetch from the cached source link.
    pub async fn acquire_movie(&self, movie_id: &str) -> Result<Vec<PathBuf>, AcquireError> {
        let dir = self.library.movie_dir(movie_id);
        let _guard = self.locks.acquire(&dir).await;

        if dir.is_dir() {
            debug!(movie_id = movie_id, "Serving movie from library");
            let files = self.library.subtitle_files(&dir).await?;
            self.notifier.result(&files).await;
            return Ok(files);
        }

        let Some(link) = self.catalog.movie_source_link(movie_id)? else {
            return Err(AcquireError::UnknownMovie(movie_id.to_string()));
        };

        self.notifier.progress("Downloading subtitles...").await;
        match self.fetch_into(&link, &dir).await {
            Ok(files) => {
                self.notifier.result(&files).await;
                Ok(files)
            }
            Err(e) => {
                self.notifier.error(&e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Find a series by name. When the catalog has no rows for it yet, run
    /// site discovery and store every episode page found.
    pub async fn search_series(&self, name: &str) -> Result<SeriesOverview, AcquireError> {
        self.notifier
            .progress(&format!("Searching series for {:?}", name))
            .await;

        let Some(found) = self.metadata.search_series(name).await? else {
            return Err(AcquireError::SeriesNotFound(name.to_string()));
        };

        if self.catalog.episodes_for_series(&found.id)?.is_empty() {
            let hits = self.searcher.discover_series(name).await?;
            self.store_episode_hits(
                &found.id,
                found.year.as_deref().unwrap_or_default(),
                &found.overview,
                &hits,
            )?;
        }

        let seasons = self.catalog.seasons_for_series(&found.id)?;
        if seasons.is_empty() {
            return Err(AcquireError::SeriesNotFound(name.to_string()));
        }

        Ok(SeriesOverview {
            series_id: found.id,
            name: found.name,
            year: found.year,
            overview: found.overview,
            poster_path: found.poster_path,
            seasons,
        })
    }

    /// Series overview by external id, for transports that already hold an
    /// id and only need the known seasons.
    pub async fn series_overview(&self, series_id: &str) -> Result<SeriesOverview, AcquireError> {
        let found = self.metadata.series_by_id(series_id).await?;
        let seasons = self.catalog.seasons_for_series(series_id)?;

        Ok(SeriesOverview {
            series_id: found.id,
            name: found.name,
            year: found.year,
            overview: found.overview,
            poster_path: found.poster_path,
            seasons,
        })
    }

    /// Listing of a season's episodes without any fetching.
    pub async fn season_status(
        &self,
        series_id: &str,
        season: SeasonNumber,
    ) -> Result<SeasonListing, AcquireError> {
        let episodes = self.catalog.episodes_for_season(series_id, season)?;
        if episodes.is_empty() {
            return Err(AcquireError::UnknownSeries(series_id.to_string()));
        }
        self.build_listing(series_id, season, &episodes)
    }

    /// Acquire a whole season. When the season directory is absent every
    /// known episode is fetched; one episode failing never aborts its
    /// siblings - it just lists as unavailable. Always returns the listing.
    pub async fn acquire_season(
        &self,
        series_id: &str,
        season: SeasonNumber,
    ) -> Result<SeasonListing, AcquireError> {
        let episodes = self.catalog.episodes_for_season(series_id, season)?;
        if episodes.is_empty() {
            return Err(AcquireError::UnknownSeries(series_id.to_string()));
        }

        let season_dir = self.library.season_dir(series_id, season);
        let _guard = self.locks.acquire(&season_dir).await;

        if !season_dir.is_dir() {
            self.notifier
                .progress(&format!(
                    "Downloading {} episodes of season {}",
                    episodes.len(),
                    season
                ))
                .await;
            for episode in &episodes {
                self.fetch_episode(series_id, season, episode).await;
            }
            // If every fetch failed the season directory is empty; drop it
            // so it cannot pass as a completed season on the next request.
            self.remove_if_empty(&season_dir).await;
        } else {
            debug!(
                series_id = series_id,
                season = %season,
                "Season already on disk"
            );
        }

        self.build_listing(series_id, season, &episodes)
    }

    /// Serve one episode's subtitle files from the library.
    pub async fn acquire_episode(
        &self,
        series_id: &str,
        season: SeasonNumber,
        episode: u32,
    ) -> Result<Vec<PathBuf>, AcquireError> {
        let dir = self.library.episode_dir(series_id, season, episode);
        if !dir.is_dir() {
            return Err(AcquireError::EpisodeUnavailable {
                series_id: series_id.to_string(),
                season,
                episode,
            });
        }

        let files = self.library.subtitle_files(&dir).await?;
        self.notifier.result(&files).await;
        Ok(files)
    }

    /// Explicit refresh of a season. A series already refreshed today is
    /// left alone; otherwise episode rows are re-discovered and only
    /// episodes with no directory are fetched (idempotent over what is
    /// already downloaded).
    pub async fn update_season(
        &self,
        series_id: &str,
        season: SeasonNumber,
    ) -> Result<UpdateOutcome, AcquireError> {
        let rows = self.catalog.episodes_for_series(series_id)?;
        let Some(first) = rows.first() else {
            return Err(AcquireError::UnknownSeries(series_id.to_string()));
        };

        let season_dir = self.library.season_dir(series_id, season);
        let _guard = self.locks.acquire(&season_dir).await;

        // Checked under the lock, so a second stale caller queued behind a
        // running update sees the refresh instead of re-scraping.
        if self.catalog.is_fresh_today(series_id)? {
            info!(series_id = series_id, "Series already refreshed today");
            return Ok(UpdateOutcome::AlreadyFresh);
        }

        self.notifier.progress("Updating episode catalog...").await;
        let hits = self.searcher.discover_series(&first.series_name).await?;
        let (year, overview) = (first.year.clone(), first.overview.clone());
        self.store_episode_hits(series_id, &year, &overview, &hits)?;

        let episodes = self.catalog.episodes_for_season(series_id, season)?;
        for episode in &episodes {
            let dir = self.library.episode_dir(series_id, season, episode.episode);
            if !dir.is_dir() {
                self.fetch_episode(series_id, season, episode).await;
            }
        }
        self.remove_if_empty(&season_dir).await;

        let listing = self.build_listing(series_id, season, &episodes)?;
        Ok(UpdateOutcome::Refreshed(listing))
    }

    /// Build (or reuse) the season's bulk archive.
    pub async fn package_season(
        &self,
        series_id: &str,
        season: SeasonNumber,
    ) -> Result<PathBuf, AcquireError> {
        let Some(name) = self.catalog.series_name(series_id)? else {
            return Err(AcquireError::UnknownSeries(series_id.to_string()));
        };

        let season_dir = self.library.season_dir(series_id, season);
        let _guard = self.locks.acquire(&season_dir).await;

        self.notifier.progress("Packaging season archive...").await;
        let path = self.library.package_season(series_id, season, &name).await?;
        self.notifier.result(std::slice::from_ref(&path)).await;
        Ok(path)
    }

    /// Upsert one catalog row per discovered episode page, all stamped with
    /// the same refresh time.
    fn store_episode_hits(
        &self,
        series_id: &str,
        year: &str,
        overview: &str,
        hits: &[EpisodeHit],
    ) -> Result<(), AcquireError> {
        let now = Utc::now();
        for hit in hits {
            let record = EpisodeRecord {
                series_id: series_id.to_string(),
                series_name: hit.series_title.clone(),
                year: year.to_string(),
                season: hit.season,
                episode: hit.episode,
                source_link: hit.page_url.clone(),
                overview: overview.to_string(),
                updated: now,
            };
            self.catalog.upsert_episode(&record)?;
        }
        info!(series_id = series_id, episodes = hits.len(), "Stored discovery results");
        Ok(())
    }

    /// Fetch one episode; a failure is reported and leaves no directory
    /// behind, so the episode lists as unavailable instead of aborting the
    /// season.
    async fn fetch_episode(&self, series_id: &str, season: SeasonNumber, episode: &EpisodeRecord) {
        let dir = self.library.episode_dir(series_id, season, episode.episode);
        if let Err(e) = self.fetch_into(&episode.source_link, &dir).await {
            warn!(
                series_id = series_id,
                season = %season,
                episode = episode.episode,
                error = %e,
                "Episode fetch failed"
            );
            self.notifier
                .error(&format!("Episode {} failed: {}", episode.episode, e))
                .await;
        }
    }

    /// Fetch into a directory, removing it again on failure so directory
    /// presence keeps meaning "fetch completed".
    async fn fetch_into(&self, link: &str, dir: &Path) -> Result<Vec<PathBuf>, AcquireError> {
        tokio::fs::create_dir_all(dir).await?;
        match self.fetcher.fetch_and_normalize(link, dir).await {
            Ok(files) => Ok(files),
            Err(e) => {
                // On corruption the extractor already rolled the directory
                // back; this covers every other failure path.
                match tokio::fs::remove_dir_all(dir).await {
                    Ok(()) => {}
                    Err(io) if io.kind() == std::io::ErrorKind::NotFound => {}
                    Err(io) => warn!(dir = %dir.display(), error = %io, "Cleanup failed"),
                }
                Err(e.into())
            }
        }
    }

    /// Remove a directory that ended up with no entries at all, so its
    /// presence keeps meaning "fetch completed".
    async fn remove_if_empty(&self, dir: &Path) {
        let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
            return;
        };
        if matches!(entries.next_entry().await, Ok(None)) {
            if let Err(e) = tokio::fs::remove_dir(dir).await {
                warn!(dir = %dir.display(), error = %e, "Failed to remove empty directory");
            }
        }
    }

    fn build_listing(
        &self,
        series_id: &str,
        season: SeasonNumber,
        episodes: &[EpisodeRecord],
    ) -> Result<SeasonListing, AcquireError> {
        let series_name = episodes
            .first()
            .map(|e| e.series_name.clone())
            .or(self.catalog.series_name(series_id)?)
            .unwrap_or_default();

        let statuses = episodes
            .iter()
            .map(|e| EpisodeStatus {
                episode: e.episode,
                available: self
                    .library
                    .episode_dir(series_id, season, e.episode)
                    .is_dir(),
            })
            .collect();

        Ok(SeasonListing {
            series_id: series_id.to_string(),
            series_name,
            season,
            last_updated: self.catalog.last_updated(series_id)?,
            episodes: statuses,
        })
    }
}
