//! Types for metadata provider responses.

use serde::{Deserialize, Serialize};

/// Best-match movie metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieMatch {
    /// External id, stringly typed because it keys TEXT columns downstream.
    pub id: String,
    /// Canonical title.
    pub title: String,
    /// Release year, when the provider knows a release date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Synopsis.
    #[serde(default)]
    pub overview: String,
}

/// Best-match series metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesMatch {
    /// External id.
    pub id: String,
    /// Canonical name.
    pub name: String,
    /// First-air year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Synopsis.
    #[serde(default)]
    pub overview: String,
    /// Poster path, relative to the provider's image base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
}

/// Extract the year component from a provider date string ("1999-03-30").
pub(crate) fn year_of(date: Option<&str>) -> Option<String> {
    date.and_then(|d| d.split('-').next())
        .filter(|y| y.len() == 4 && y.chars().all(|c| c.is_ascii_digit()))
        .map(|y| y.to_string())
}
