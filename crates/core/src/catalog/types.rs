//! Types for the media catalog (movie and episode metadata cache).

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Serialize};
use thiserror::Error;

/// A season ordinal, always rendered zero-padded to two digits.
///
/// "3" and "03" name the same season; the padded form is what gets stored,
/// sorted, and used for directory names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeasonNumber(u8);

impl SeasonNumber {
    pub fn new(n: u8) -> Self {
        Self(n)
    }

    /// The raw ordinal.
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Two-digit zero-padded form ("03").
    pub fn padded(&self) -> String {
        format!("{:02}", self.0)
    }
}

impl fmt::Display for SeasonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl From<u8> for SeasonNumber {
    fn from(n: u8) -> Self {
        Self(n)
    }
}

impl FromStr for SeasonNumber {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u8>().map(Self)
    }
}

impl Serialize for SeasonNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.padded())
    }
}

impl<'de> Deserialize<'de> for SeasonNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SeasonVisitor;

        impl de::Visitor<'_> for SeasonVisitor {
            type Value = SeasonNumber;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a season number, as integer or string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                u8::try_from(v)
                    .map(SeasonNumber)
                    .map_err(|_| E::custom(format!("season {} out of range", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u8::try_from(v)
                    .map(SeasonNumber)
                    .map_err(|_| E::custom(format!("season {} out of range", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse()
                    .map_err(|_| E::custom(format!("invalid season: {:?}", v)))
            }
        }

        deserializer.deserialize_any(SeasonVisitor)
    }
}

/// A cached movie entry.
///
/// Rows are immutable once inserted: a movie_id is never overwritten, the
/// table acts as a permanent memoization of search-and-match results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    /// External metadata id (unique key).
    pub movie_id: String,
    /// Movie title.
    pub title: String,
    /// Release year.
    pub year: String,
    /// Catalog page URL a later fetch resolves the archive from.
    pub source_link: String,
    /// Synopsis from the metadata provider.
    pub overview: String,
}

/// A cached episode entry, one row per distinct episode page.
///
/// Keyed by `source_link`; re-running discovery for a series replaces rows
/// in place, which is what drives the staleness/refresh model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeRecord {
    /// External series id.
    pub series_id: String,
    /// Series name as parsed from the catalog listing.
    pub series_name: String,
    /// First-air year.
    pub year: String,
    /// Season ordinal.
    pub season: SeasonNumber,
    /// Episode ordinal within the season.
    pub episode: u32,
    /// Episode page URL (unique key).
    pub source_link: String,
    /// Series synopsis.
    pub overview: String,
    /// When this row was last (re)fetched.
    pub updated: DateTime<Utc>,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_number_pads_to_two_digits() {
        assert_eq!(SeasonNumber::new(3).to_string(), "03");
        assert_eq!(SeasonNumber::new(12).to_string(), "12");
        assert_eq!(SeasonNumber::new(3).padded(), "03");
    }

    #[test]
    fn test_season_number_parses_padded_and_bare() {
        let bare: SeasonNumber = "3".parse().unwrap();
        let padded: SeasonNumber = "03".parse().unwrap();
        assert_eq!(bare, padded);
        assert_eq!(bare.number(), 3);
    }

    #[test]
    fn test_season_number_rejects_garbage() {
        assert!("three".parse::<SeasonNumber>().is_err());
        assert!("".parse::<SeasonNumber>().is_err());
    }

    #[test]
    fn test_season_number_serializes_as_padded_string() {
        let json = serde_json::to_string(&SeasonNumber::new(5)).unwrap();
        assert_eq!(json, "\"05\"");
    }

    #[test]
    fn test_season_number_deserializes_from_int_or_string() {
        let from_int: SeasonNumber = serde_json::from_str("7").unwrap();
        let from_str: SeasonNumber = serde_json::from_str("\"07\"").unwrap();
        assert_eq!(from_int, from_str);
    }

    #[test]
    fn test_episode_record_roundtrip() {
        let record = EpisodeRecord {
            series_id: "1396".to_string(),
            series_name: "Breaking Bad".to_string(),
            year: "2008".to_string(),
            season: SeasonNumber::new(1),
            episode: 7,
            source_link: "https://example.com/bb-s01e07".to_string(),
            overview: "A chemistry teacher...".to_string(),
            updated: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: EpisodeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
