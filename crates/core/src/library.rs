//! On-disk subtitle library.
//!
//! Directory layout is the cache-hit signal for the whole pipeline:
//! `movies/{movie_id}/` and `series/{series_id}/{season}/{episode}/`, each
//! holding only flat subtitle files once a fetch has completed. Season
//! directories also host the bulk package archive.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::SeasonNumber;
use crate::fetcher::is_subtitle_file;

/// Errors that can occur while packaging a season.
#[derive(Debug, Error)]
pub enum PackageError {
    /// The season has no directory on disk.
    #[error("Season directory not found: {0}")]
    SeasonDirMissing(PathBuf),

    /// I/O error while walking or reading files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive writer failed.
    #[error("Failed to build season archive: {0}")]
    Archive(String),
}

/// Path layout and file operations for the subtitle cache root.
#[derive(Debug, Clone)]
pub struct SubtitleLibrary {
    root: PathBuf,
}

impl SubtitleLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `movies/{movie_id}/`
    pub fn movie_dir(&self, movie_id: &str) -> PathBuf {
        self.root.join("movies").join(movie_id)
    }

    /// `series/{series_id}/{season}/` (season two-digit padded)
    pub fn season_dir(&self, series_id: &str, season: SeasonNumber) -> PathBuf {
        self.root
            .join("series")
            .join(series_id)
            .join(season.padded())
    }

    /// `series/{series_id}/{season}/{episode}/`
    pub fn episode_dir(&self, series_id: &str, season: SeasonNumber, episode: u32) -> PathBuf {
        self.season_dir(series_id, season).join(episode.to_string())
    }

    /// `series/{series_id}/{season}/{name} - Season {N}.zip`
    ///
    /// The file name carries the unpadded season ordinal; the directory
    /// component stays padded.
    pub fn season_archive_path(
        &self,
        series_id: &str,
        season: SeasonNumber,
        series_name: &str,
    ) -> PathBuf {
        self.season_dir(series_id, season)
            .join(format!("{} - Season {}.zip", series_name, season.number()))
    }

    /// Top-level subtitle files of a directory, sorted. Empty when the
    /// directory does not exist.
    pub async fn subtitle_files(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_subtitle_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Build the season's bulk archive unless it already exists, and return
    /// its path. An existing archive is reused as-is, never rebuilt.
    pub async fn package_season(
        &self,
        series_id: &str,
        season: SeasonNumber,
        series_name: &str,
    ) -> Result<PathBuf, PackageError> {
        let season_dir = self.season_dir(series_id, season);
        if !tokio::fs::try_exists(&season_dir).await.unwrap_or(false) {
            return Err(PackageError::SeasonDirMissing(season_dir));
        }

        let archive_path = self.season_archive_path(series_id, season, series_name);
        if tokio::fs::try_exists(&archive_path).await.unwrap_or(false) {
            debug!(archive = %archive_path.display(), "Reusing existing season archive");
            return Ok(archive_path);
        }

        info!(archive = %archive_path.display(), "Building season archive");

        let dir = season_dir.clone();
        let target = archive_path.clone();
        tokio::task::spawn_blocking(move || build_season_archive(&dir, &target))
            .await
            .map_err(|e| PackageError::Archive(e.to_string()))??;

        Ok(archive_path)
    }
}

/// Walk the season directory and write every non-archive file into one ZIP,
/// entry names relative to the season directory, in sorted order so the
/// output is deterministic.
fn build_season_archive(season_dir: &Path, archive_path: &Path) -> Result<(), PackageError> {
    let mut files = Vec::new();
    collect_packageable(season_dir, season_dir, &mut files)?;
    files.sort_by(|a, b| a.1.cmp(&b.1));

    let out = std::fs::File::create(archive_path)?;
    let mut writer = zip::ZipWriter::new(out);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (path, name) in files {
        writer
            .start_file(name, options)
            .map_err(|e| PackageError::Archive(e.to_string()))?;
        let mut input = std::fs::File::open(&path)?;
        std::io::copy(&mut input, &mut writer)?;
    }

    writer
        .finish()
        .map_err(|e| PackageError::Archive(e.to_string()))?
        .flush()?;
    Ok(())
}

fn collect_packageable(
    base: &Path,
    dir: &Path,
    files: &mut Vec<(PathBuf, String)>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_packageable(base, &path, files)?;
            continue;
        }

        let is_archive = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_ascii_lowercase().as_str(), "zip" | "rar" | "7z"))
            .unwrap_or(false);
        if is_archive {
            continue;
        }

        let name = path
            .strip_prefix(base)
            .map_err(|e| std::io::Error::other(e.to_string()))?
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        files.push((path, name));
    }
    Ok(())
}
