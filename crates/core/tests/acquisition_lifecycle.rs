//! Acquisition lifecycle integration tests.
//!
//! Exercise the orchestrator's movie, season, update, and packaging flows
//! against the SQLite catalog and a real temp-dir library, with the
//! network-facing collaborators mocked.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;

use cinesub_core::{
    catalog::SeasonNumber,
    testing::{fixtures, MockAssetFetcher, MockFetchOutcome, MockMetadataProvider, MockNotifier, MockSiteSearcher},
    AcquireError, MediaCatalog, SqliteCatalog, SubtitleLibrary, SubtitleOrchestrator,
    UpdateOutcome,
};

/// Test helper bundling the orchestrator's collaborators.
struct TestHarness {
    catalog: Arc<SqliteCatalog>,
    metadata: Arc<MockMetadataProvider>,
    searcher: Arc<MockSiteSearcher>,
    fetcher: Arc<MockAssetFetcher>,
    notifier: Arc<MockNotifier>,
    library_root: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let library_root = temp_dir.path().join("subtitles");

        Self {
            catalog: Arc::new(SqliteCatalog::in_memory().expect("Failed to create catalog")),
            metadata: Arc::new(MockMetadataProvider::new()),
            searcher: Arc::new(MockSiteSearcher::new()),
            fetcher: Arc::new(MockAssetFetcher::new()),
            notifier: Arc::new(MockNotifier::new()),
            library_root,
            _temp_dir: temp_dir,
        }
    }

    fn library(&self) -> SubtitleLibrary {
        SubtitleLibrary::new(&self.library_root)
    }

    fn orchestrator(&self) -> SubtitleOrchestrator {
        SubtitleOrchestrator::new(
            Arc::clone(&self.catalog) as Arc<dyn cinesub_core::MediaCatalog>,
            Arc::clone(&self.metadata) as Arc<dyn cinesub_core::MetadataProvider>,
            Arc::clone(&self.searcher) as Arc<dyn cinesub_core::SiteSearcher>,
            Arc::clone(&self.fetcher) as Arc<dyn cinesub_core::AssetFetcher>,
            self.library(),
            Arc::clone(&self.notifier) as Arc<dyn cinesub_core::Notifier>,
        )
    }
}

#[tokio::test]
async fn test_movie_acquisition_and_short_circuit() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    harness
        .catalog
        .insert_movie_if_absent(&fixtures::movie_record("603", "The Matrix"))
        .unwrap();

    let files = orchestrator.acquire_movie("603").await.unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("subtitle.srt"));
    assert_eq!(harness.fetcher.call_count().await, 1);

    // Second call serves the directory without touching the network layer.
    let again = orchestrator.acquire_movie("603").await.unwrap();
    assert_eq!(again, files);
    assert_eq!(harness.fetcher.call_count().await, 1);
}

#[tokio::test]
async fn test_unknown_movie_id_fails() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    let result = orchestrator.acquire_movie("999").await;
    assert!(matches!(result, Err(AcquireError::UnknownMovie(_))));
    assert_eq!(harness.fetcher.call_count().await, 0);
}

#[tokio::test]
async fn test_failed_movie_fetch_leaves_no_directory() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    let record = fixtures::movie_record("603", "The Matrix");
    harness.catalog.insert_movie_if_absent(&record).unwrap();
    harness
        .fetcher
        .set_outcome(&record.source_link, MockFetchOutcome::NoArchiveLink)
        .await;

    let result = orchestrator.acquire_movie("603").await;
    assert!(matches!(result, Err(AcquireError::Fetch(_))));

    // No leftover directory to misread as a cache hit, so a new attempt
    // goes back to the fetcher.
    assert!(!harness.library().movie_dir("603").is_dir());
    harness
        .fetcher
        .set_outcome(
            &record.source_link,
            MockFetchOutcome::Files(vec!["fixed.srt".to_string()]),
        )
        .await;
    let files = orchestrator.acquire_movie("603").await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(harness.fetcher.call_count().await, 2);
}

#[tokio::test]
async fn test_corrupt_archive_keeps_catalog_row_for_retry() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    let record = fixtures::movie_record("603", "The Matrix");
    harness.catalog.insert_movie_if_absent(&record).unwrap();
    harness
        .fetcher
        .set_outcome(&record.source_link, MockFetchOutcome::Corrupt)
        .await;

    let result = orchestrator.acquire_movie("603").await;
    assert!(matches!(result, Err(AcquireError::Fetch(_))));
    assert!(!harness.library().movie_dir("603").is_dir());

    // The cache row survives, so a retry resolves the same source link.
    assert_eq!(
        harness.catalog.movie_source_link("603").unwrap(),
        Some(record.source_link.clone())
    );
}

#[tokio::test]
async fn test_movie_search_memoizes_matches() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    harness
        .searcher
        .set_movie_hits(vec![fixtures::movie_hit(
            "The Matrix",
            "1999",
            "https://example.lk/matrix-1999",
        )])
        .await;
    harness
        .metadata
        .set_movie_match(Some(fixtures::movie_match("603", "The Matrix")))
        .await;

    let summaries = orchestrator.search_movies("matrix").await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].movie_id, "603");

    // Searching again must not overwrite the memoized row.
    orchestrator.search_movies("matrix").await.unwrap();
    assert_eq!(
        harness.catalog.movie_source_link("603").unwrap(),
        Some("https://example.lk/matrix-1999".to_string())
    );
}

#[tokio::test]
async fn test_series_search_discovers_once() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    harness
        .metadata
        .set_series_match(Some(fixtures::series_match("1396", "Breaking Bad")))
        .await;
    harness
        .searcher
        .set_episode_hits(vec![
            fixtures::episode_hit("Breaking Bad", 1, 1, "https://example.lk/bb-s01e01"),
            fixtures::episode_hit("Breaking Bad", 1, 2, "https://example.lk/bb-s01e02"),
            fixtures::episode_hit("Breaking Bad", 2, 1, "https://example.lk/bb-s02e01"),
        ])
        .await;

    let overview = orchestrator.search_series("breaking bad").await.unwrap();
    assert_eq!(overview.series_id, "1396");
    assert_eq!(
        overview.seasons,
        vec![SeasonNumber::new(1), SeasonNumber::new(2)]
    );
    assert_eq!(harness.searcher.query_count().await, 1);

    // Catalog rows now exist, so a second search skips discovery.
    orchestrator.search_series("breaking bad").await.unwrap();
    assert_eq!(harness.searcher.query_count().await, 1);
}

#[tokio::test]
async fn test_series_search_without_match_fails() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    harness.metadata.set_series_match(None).await;

    let result = orchestrator.search_series("nope").await;
    assert!(matches!(result, Err(AcquireError::SeriesNotFound(_))));
}

#[tokio::test]
async fn test_season_acquisition_isolates_episode_failures() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    harness
        .catalog
        .upsert_episode(&fixtures::episode_record("1396", 1, 1, "https://example.lk/e1"))
        .unwrap();
    harness
        .catalog
        .upsert_episode(&fixtures::episode_record("1396", 1, 2, "https://example.lk/e2"))
        .unwrap();
    harness
        .fetcher
        .set_outcome("https://example.lk/e2", MockFetchOutcome::NoArchiveLink)
        .await;

    let listing = orchestrator
        .acquire_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();

    assert_eq!(listing.episodes.len(), 2);
    assert!(listing.episodes[0].available);
    assert!(!listing.episodes[1].available);

    let failure_reports = harness.notifier.error_messages().await;
    assert_eq!(failure_reports.len(), 1);
    assert!(failure_reports[0].contains("Episode 2"));
}

#[tokio::test]
async fn test_fully_failed_season_can_be_retried() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    harness
        .catalog
        .upsert_episode(&fixtures::episode_record("1396", 1, 1, "https://example.lk/e1"))
        .unwrap();
    harness
        .fetcher
        .set_outcome("https://example.lk/e1", MockFetchOutcome::Upstream(503))
        .await;

    let listing = orchestrator
        .acquire_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();
    assert!(!listing.episodes[0].available);

    // The empty season directory was swept away, so a new request goes
    // back to the fetcher instead of trusting a hollow cache hit.
    assert!(!harness
        .library()
        .season_dir("1396", SeasonNumber::new(1))
        .is_dir());

    harness
        .fetcher
        .set_outcome(
            "https://example.lk/e1",
            MockFetchOutcome::Files(vec!["recovered.srt".to_string()]),
        )
        .await;
    let listing = orchestrator
        .acquire_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();
    assert!(listing.episodes[0].available);
    assert_eq!(harness.fetcher.call_count().await, 2);
}

#[tokio::test]
async fn test_season_acquisition_skips_existing_directory() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    harness
        .catalog
        .upsert_episode(&fixtures::episode_record("1396", 1, 1, "https://example.lk/e1"))
        .unwrap();

    orchestrator
        .acquire_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();
    assert_eq!(harness.fetcher.call_count().await, 1);

    // The season directory exists now, so nothing is re-fetched.
    let listing = orchestrator
        .acquire_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();
    assert_eq!(harness.fetcher.call_count().await, 1);
    assert!(listing.episodes[0].available);
}

#[tokio::test]
async fn test_acquire_episode_serves_or_reports_unavailable() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    harness
        .catalog
        .upsert_episode(&fixtures::episode_record("1396", 1, 1, "https://example.lk/e1"))
        .unwrap();
    orchestrator
        .acquire_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();

    let files = orchestrator
        .acquire_episode("1396", SeasonNumber::new(1), 1)
        .await
        .unwrap();
    assert_eq!(files.len(), 1);

    let missing = orchestrator
        .acquire_episode("1396", SeasonNumber::new(1), 9)
        .await;
    assert!(matches!(
        missing,
        Err(AcquireError::EpisodeUnavailable { episode: 9, .. })
    ));
}

#[tokio::test]
async fn test_update_fresh_series_is_a_no_op() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    // Updated just now, so the series is fresh today.
    harness
        .catalog
        .upsert_episode(&fixtures::episode_record("1396", 1, 1, "https://example.lk/e1"))
        .unwrap();

    let outcome = orchestrator
        .update_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();
    assert!(matches!(outcome, UpdateOutcome::AlreadyFresh));
    assert_eq!(harness.searcher.query_count().await, 0);
    assert_eq!(harness.fetcher.call_count().await, 0);
}

#[tokio::test]
async fn test_update_stale_series_fetches_only_missing_episodes() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    let mut stale = fixtures::episode_record("1396", 1, 1, "https://example.lk/e1");
    stale.updated = Utc::now() - chrono::Duration::days(2);
    harness.catalog.upsert_episode(&stale).unwrap();

    // Episode 1 is already on disk from an earlier download.
    let e1_dir = harness
        .library()
        .episode_dir("1396", SeasonNumber::new(1), 1);
    std::fs::create_dir_all(&e1_dir).unwrap();
    std::fs::write(e1_dir.join("old.srt"), "kept").unwrap();

    // Rediscovery now knows a second episode.
    harness
        .searcher
        .set_episode_hits(vec![
            fixtures::episode_hit("Test Series", 1, 1, "https://example.lk/e1"),
            fixtures::episode_hit("Test Series", 1, 2, "https://example.lk/e2"),
        ])
        .await;

    let outcome = orchestrator
        .update_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();

    let UpdateOutcome::Refreshed(listing) = outcome else {
        panic!("expected a refresh");
    };
    assert_eq!(listing.episodes.len(), 2);
    assert!(listing.episodes.iter().all(|e| e.available));

    // Only the missing episode was fetched; episode 1 kept its files.
    assert_eq!(
        harness.fetcher.recorded_calls().await,
        vec!["https://example.lk/e2".to_string()]
    );
    assert!(e1_dir.join("old.srt").exists());
}

#[tokio::test]
async fn test_update_unknown_series_fails() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    let result = orchestrator
        .update_season("unknown", SeasonNumber::new(1))
        .await;
    assert!(matches!(result, Err(AcquireError::UnknownSeries(_))));
}

#[tokio::test]
async fn test_package_season_via_orchestrator() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    harness
        .catalog
        .upsert_episode(&fixtures::episode_record("1396", 1, 1, "https://example.lk/e1"))
        .unwrap();
    orchestrator
        .acquire_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();

    let archive = orchestrator
        .package_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();
    assert!(archive.ends_with("Test Series - Season 1.zip"));
    assert!(archive.exists());

    // A second request reuses the archive byte-for-byte.
    std::fs::write(&archive, b"sentinel").unwrap();
    let again = orchestrator
        .package_season("1396", SeasonNumber::new(1))
        .await
        .unwrap();
    assert_eq!(again, archive);
    assert_eq!(std::fs::read(&archive).unwrap(), b"sentinel");
}

#[tokio::test]
async fn test_package_unknown_series_fails() {
    let harness = TestHarness::new();
    let orchestrator = harness.orchestrator();

    let result = orchestrator
        .package_season("unknown", SeasonNumber::new(1))
        .await;
    assert!(matches!(result, Err(AcquireError::UnknownSeries(_))));
}

#[tokio::test]
async fn test_concurrent_movie_acquisitions_serialize() {
    let harness = TestHarness::new();
    let orchestrator = Arc::new(harness.orchestrator());

    harness
        .catalog
        .insert_movie_if_absent(&fixtures::movie_record("603", "The Matrix"))
        .unwrap();
    harness.fetcher.set_delay(Duration::from_millis(100)).await;

    let first = {
        let orch = Arc::clone(&orchestrator);
        tokio::spawn(async move { orch.acquire_movie("603").await })
    };
    let second = {
        let orch = Arc::clone(&orchestrator);
        tokio::spawn(async move { orch.acquire_movie("603").await })
    };

    let (a, b) = (first.await.unwrap().unwrap(), second.await.unwrap().unwrap());

    // The second caller observed the first one's completed result; only
    // one download ever happened.
    assert_eq!(a, b);
    assert_eq!(harness.fetcher.call_count().await, 1);
}
