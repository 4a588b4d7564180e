//! Archive extraction for downloaded subtitle containers.
//!
//! Container format is decided by the file extension the fetcher assigned
//! during download naming. Extraction is all-or-nothing: a failed extraction
//! removes the destination directory so a later directory-existence check
//! never mistakes the leftovers for a completed fetch.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Supported archive container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Rar,
    SevenZ,
}

impl ArchiveFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "zip" => Some(Self::Zip),
            "rar" => Some(Self::Rar),
            "7z" => Some(Self::SevenZ),
            _ => None,
        }
    }

    /// Canonical file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Rar => "rar",
            Self::SevenZ => "7z",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Errors that can occur during archive extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file extension maps to no supported container format.
    #[error("Unrecognized archive format: {path}")]
    UnknownFormat { path: PathBuf },

    /// The archive could not be read as its detected format. The
    /// destination directory has been removed.
    #[error("Corrupt {format} archive {path}: {detail}")]
    Corrupt {
        format: ArchiveFormat,
        path: PathBuf,
        detail: String,
    },

    /// I/O error outside the archive decoding itself.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking extraction task died.
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Expand `archive` under `dest_dir`, which may gain nested subdirectories.
///
/// On any decoding failure `dest_dir` is removed entirely before
/// `ExtractError::Corrupt` is returned. An unrecognized extension returns
/// `ExtractError::UnknownFormat` without touching the destination.
pub async fn extract_archive(archive: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    let Some(format) = ArchiveFormat::from_path(archive) else {
        return Err(ExtractError::UnknownFormat {
            path: archive.to_path_buf(),
        });
    };

    debug!(archive = %archive.display(), format = %format, "Extracting archive");

    let archive_path = archive.to_path_buf();
    let dest = dest_dir.to_path_buf();
    let result = tokio::task::spawn_blocking(move || extract_blocking(format, &archive_path, &dest))
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))?;

    match result {
        Ok(()) => Ok(()),
        Err(detail) => {
            match tokio::fs::remove_dir_all(dest_dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(ExtractError::Io(e)),
            }
            Err(ExtractError::Corrupt {
                format,
                path: archive.to_path_buf(),
                detail,
            })
        }
    }
}

fn extract_blocking(format: ArchiveFormat, archive: &Path, dest: &Path) -> Result<(), String> {
    match format {
        ArchiveFormat::Zip => {
            let file = std::fs::File::open(archive).map_err(|e| e.to_string())?;
            let mut zip = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;
            zip.extract(dest).map_err(|e| e.to_string())
        }
        ArchiveFormat::Rar => {
            let mut rar = unrar::Archive::new(archive)
                .open_for_processing()
                .map_err(|e| e.to_string())?;
            while let Some(header) = rar.read_header().map_err(|e| e.to_string())? {
                rar = if header.entry().is_file() {
                    header.extract_with_base(dest).map_err(|e| e.to_string())?
                } else {
                    header.skip().map_err(|e| e.to_string())?
                };
            }
            Ok(())
        }
        ArchiveFormat::SevenZ => {
            sevenz_rust::decompress_file(archive, dest).map_err(|e| e.to_string())
        }
    }
}
