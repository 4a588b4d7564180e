//! HTTP asset fetcher implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::extractor::extract_archive;

use super::{is_subtitle_file, AssetFetcher, FetchError};

/// Fetches subtitle archives over HTTP and normalizes the extracted tree.
pub struct HttpAssetFetcher {
    client: Client,
    link_marker: String,
}

impl HttpAssetFetcher {
    /// Create a new fetcher from the site configuration.
    pub fn new(config: &SiteConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            link_marker: config.archive_link_marker.clone(),
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    async fn download_archive(
        &self,
        archive_url: &Url,
        dest_dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        let response = self.client.get(archive_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                url: archive_url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let file_name = archive_file_name(archive_url, content_type.as_deref());
        let archive_path = dest_dir.join(&file_name);

        let bytes = response.bytes().await?;
        tokio::fs::write(&archive_path, &bytes).await?;

        debug!(
            archive = %archive_path.display(),
            bytes = bytes.len(),
            "Downloaded archive"
        );
        Ok(archive_path)
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch_and_normalize(
        &self,
        page_url: &str,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, FetchError> {
        info!(page = page_url, dest = %dest_dir.display(), "Fetching subtitles");

        let html = self.fetch_text(page_url).await?;
        let href = find_archive_link(&html, &self.link_marker)
            .ok_or_else(|| FetchError::NoArchiveLink(page_url.to_string()))?;
        let archive_url = resolve_link(page_url, &href)?;

        tokio::fs::create_dir_all(dest_dir).await?;
        let archive_path = self.download_archive(&archive_url, dest_dir).await?;

        extract_archive(&archive_path, dest_dir).await?;

        let dir = dest_dir.to_path_buf();
        let files = tokio::task::spawn_blocking(move || normalize_dir(&dir))
            .await
            .map_err(|e| FetchError::Io(std::io::Error::other(e.to_string())))??;

        info!(files = files.len(), dest = %dest_dir.display(), "Subtitles ready");
        Ok(files)
    }
}

// ============================================================================
// Link scanning and naming (pure)
// ============================================================================

/// First href on the page whose target contains the archive link marker.
pub(crate) fn find_archive_link(html: &str, marker: &str) -> Option<String> {
    let re = Regex::new(r#"(?i)href\s*=\s*['"]([^'"]+)['"]"#).expect("valid href regex");
    re.captures_iter(html)
        .map(|cap| cap[1].to_string())
        .find(|href| href.contains(marker))
}

/// Resolve a possibly-relative href against the content page URL.
pub(crate) fn resolve_link(page_url: &str, href: &str) -> Result<Url, FetchError> {
    let base = Url::parse(page_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    base.join(href)
        .map_err(|e| FetchError::InvalidUrl(e.to_string()))
}

/// Derive the local file name for a downloaded archive.
///
/// The URL's base name wins when it carries a recognized archive extension;
/// otherwise the name falls back to `default.<ext>` with the extension
/// sniffed from the Content-Type header (zip unless the header says rar
/// or 7z).
pub(crate) fn archive_file_name(url: &Url, content_type: Option<&str>) -> String {
    let base_name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| segment.to_string())
        })
        .unwrap_or_default();

    if !base_name.is_empty() {
        let ext = Path::new(&base_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if matches!(ext.as_deref(), Some("zip" | "rar" | "7z")) {
            return base_name;
        }
    }

    format!("default.{}", extension_from_content_type(content_type))
}

fn extension_from_content_type(content_type: Option<&str>) -> &'static str {
    let Some(ct) = content_type else {
        return "zip";
    };
    if ct.contains("zip") {
        "zip"
    } else if ct.contains("x-rar") {
        "rar"
    } else if ct.contains("7z") {
        "7z"
    } else {
        "zip"
    }
}

// ============================================================================
// Normalization (pure, blocking)
// ============================================================================

/// Collapse an extracted tree into a flat directory of subtitle files.
///
/// If the top level holds no subtitle files, subtitle files from nested
/// directories are moved up first (archives commonly wrap their content in
/// a folder). Everything that is not a top-level subtitle file is then
/// removed. Returns the final file list, sorted.
pub(crate) fn normalize_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if top_level_subtitles(dir)?.is_empty() {
        let nested = collect_nested_subtitles(dir)?;
        for source in nested {
            move_to_top_level(&source, dir)?;
        }
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else if !is_subtitle_file(&path) {
            std::fs::remove_file(&path)?;
        }
    }

    let mut files = top_level_subtitles(dir)?;
    files.sort();
    Ok(files)
}

fn top_level_subtitles(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_subtitle_file(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

fn collect_nested_subtitles(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            walk_subtitles(&entry.path(), &mut found)?;
        }
    }
    found.sort();
    Ok(found)
}

fn walk_subtitles(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            walk_subtitles(&path, found)?;
        } else if is_subtitle_file(&path) {
            found.push(path);
        }
    }
    Ok(())
}

/// Move a file to the top of `dir`, suffixing the stem on name collisions.
fn move_to_top_level(source: &Path, dir: &Path) -> std::io::Result<()> {
    let name = source
        .file_name()
        .ok_or_else(|| std::io::Error::other("file without a name"))?;
    let mut target = dir.join(name);

    if target.exists() {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("subtitle");
        let ext = source.extension().and_then(|e| e.to_str()).unwrap_or("srt");
        for n in 1.. {
            let candidate = dir.join(format!("{}_{}.{}", stem, n, ext));
            if !candidate.exists() {
                target = candidate;
                break;
            }
        }
    }

    std::fs::rename(source, &target)
}
