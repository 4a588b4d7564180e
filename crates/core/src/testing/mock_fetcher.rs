//! Mock asset fetcher for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::extractor::{ArchiveFormat, ExtractError};
use crate::fetcher::{AssetFetcher, FetchError};

/// Scripted behavior for one page URL.
#[derive(Debug, Clone)]
pub enum MockFetchOutcome {
    /// Write the named files into the destination and return them.
    Files(Vec<String>),
    /// Fail with `FetchError::NoArchiveLink`.
    NoArchiveLink,
    /// Fail with a corrupt-archive error, removing the destination
    /// directory first to mirror the extractor's rollback contract.
    Corrupt,
    /// Fail with an upstream HTTP error.
    Upstream(u16),
}

/// Mock implementation of the AssetFetcher trait.
///
/// Outcomes are scripted per page URL; unscripted URLs succeed with a
/// single `subtitle.srt`. Calls are recorded for assertions, and an
/// optional delay makes concurrency races observable in tests.
#[derive(Default)]
pub struct MockAssetFetcher {
    outcomes: RwLock<HashMap<String, MockFetchOutcome>>,
    calls: RwLock<Vec<String>>,
    delay: RwLock<Option<Duration>>,
}

impl MockAssetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome for a page URL.
    pub async fn set_outcome(&self, page_url: &str, outcome: MockFetchOutcome) {
        self.outcomes
            .write()
            .await
            .insert(page_url.to_string(), outcome);
    }

    /// Delay every fetch, to widen race windows in concurrency tests.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Page URLs fetched so far, in call order.
    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Number of fetches performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl AssetFetcher for MockAssetFetcher {
    async fn fetch_and_normalize(
        &self,
        page_url: &str,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, FetchError> {
        self.calls.write().await.push(page_url.to_string());

        if let Some(delay) = *self.delay.read().await {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .outcomes
            .read()
            .await
            .get(page_url)
            .cloned()
            .unwrap_or_else(|| MockFetchOutcome::Files(vec!["subtitle.srt".to_string()]));

        match outcome {
            MockFetchOutcome::Files(names) => {
                tokio::fs::create_dir_all(dest_dir).await?;
                let mut files = Vec::new();
                for name in names {
                    let path = dest_dir.join(&name);
                    tokio::fs::write(&path, b"subtitle content").await?;
                    files.push(path);
                }
                files.sort();
                Ok(files)
            }
            MockFetchOutcome::NoArchiveLink => {
                Err(FetchError::NoArchiveLink(page_url.to_string()))
            }
            MockFetchOutcome::Corrupt => {
                match tokio::fs::remove_dir_all(dest_dir).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(FetchError::Io(e)),
                }
                Err(FetchError::Extraction(ExtractError::Corrupt {
                    format: ArchiveFormat::Zip,
                    path: dest_dir.join("default.zip"),
                    detail: "scripted corruption".to_string(),
                }))
            }
            MockFetchOutcome::Upstream(status) => Err(FetchError::Upstream {
                url: page_url.to_string(),
                status,
            }),
        }
    }
}
