//! SQLite-backed media catalog implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use super::{CatalogError, EpisodeRecord, MediaCatalog, MovieRecord, SeasonNumber};

/// SQLite-backed media catalog.
///
/// The schema is shared with earlier deployments of the bot, so column
/// names (including `baiscope_link`) are load-bearing.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- Movie metadata, memoized forever (one row per movie_id)
            CREATE TABLE IF NOT EXISTS movie_details (
                movie_id TEXT UNIQUE,
                movie_name TEXT,
                year TEXT,
                baiscope_link TEXT,
                overview TEXT
            );

            -- Episode metadata, replaced in place on rediscovery
            -- (one row per episode page link)
            CREATE TABLE IF NOT EXISTS tv_details (
                series_id TEXT,
                series_name TEXT,
                year TEXT,
                season TEXT,
                episode INTEGER,
                baiscope_link TEXT UNIQUE,
                overview TEXT,
                updated TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_tv_details_series ON tv_details(series_id, season);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    /// Parse a stored timestamp, tolerating the naive ISO-8601 form that
    /// caches written by earlier deployments contain. Unparseable values
    /// fall back to the epoch so a mangled row reads as stale, not fresh.
    fn parse_updated(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                raw.parse::<NaiveDateTime>()
                    .map(|naive| naive.and_utc())
            })
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    fn row_to_episode(row: &rusqlite::Row) -> rusqlite::Result<EpisodeRecord> {
        let season_raw: String = row.get(3)?;
        let updated_raw: String = row.get(7)?;

        let season = season_raw
            .parse::<SeasonNumber>()
            .unwrap_or_else(|_| SeasonNumber::new(0));

        Ok(EpisodeRecord {
            series_id: row.get(0)?,
            series_name: row.get(1)?,
            year: row.get(2)?,
            season,
            episode: row.get(4)?,
            source_link: row.get(5)?,
            overview: row.get(6)?,
            updated: Self::parse_updated(&updated_raw),
        })
    }
}

impl MediaCatalog for SqliteCatalog {
    fn insert_movie_if_absent(&self, record: &MovieRecord) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO movie_details (movie_id, movie_name, year, baiscope_link, overview)
             VALUES (?, ?, ?, ?, ?)",
            params![
                &record.movie_id,
                &record.title,
                &record.year,
                &record.source_link,
                &record.overview,
            ],
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;
        Ok(())
    }

    fn movie_source_link(&self, movie_id: &str) -> Result<Option<String>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let link = conn
            .query_row(
                "SELECT baiscope_link FROM movie_details WHERE movie_id = ?",
                params![movie_id],
                |row| row.get::<_, String>(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(CatalogError::Database(e.to_string())),
            })?;
        Ok(link)
    }

    fn upsert_episode(&self, record: &EpisodeRecord) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO tv_details
                 (series_id, series_name, year, season, episode, baiscope_link, overview, updated)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                &record.series_id,
                &record.series_name,
                &record.year,
                record.season.padded(),
                record.episode,
                &record.source_link,
                &record.overview,
                record.updated.to_rfc3339(),
            ],
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;
        Ok(())
    }

    fn episodes_for_season(
        &self,
        series_id: &str,
        season: SeasonNumber,
    ) -> Result<Vec<EpisodeRecord>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT series_id, series_name, year, season, episode, baiscope_link, overview, updated
                 FROM tv_details WHERE series_id = ? AND season = ?
                 ORDER BY episode",
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![series_id, season.padded()], Self::row_to_episode)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut episodes = Vec::new();
        for row in rows {
            episodes.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(episodes)
    }

    fn episodes_for_series(&self, series_id: &str) -> Result<Vec<EpisodeRecord>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT series_id, series_name, year, season, episode, baiscope_link, overview, updated
                 FROM tv_details WHERE series_id = ?
                 ORDER BY season, episode",
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![series_id], Self::row_to_episode)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut episodes = Vec::new();
        for row in rows {
            episodes.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(episodes)
    }

    fn seasons_for_series(&self, series_id: &str) -> Result<Vec<SeasonNumber>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT season FROM tv_details WHERE series_id = ? ORDER BY season",
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![series_id], |row| row.get::<_, String>(0))
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut seasons = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| CatalogError::Database(e.to_string()))?;
            if let Ok(season) = raw.parse::<SeasonNumber>() {
                seasons.push(season);
            }
        }
        Ok(seasons)
    }

    fn series_name(&self, series_id: &str) -> Result<Option<String>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let name = conn
            .query_row(
                "SELECT series_name FROM tv_details WHERE series_id = ?",
                params![series_id],
                |row| row.get::<_, String>(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(CatalogError::Database(e.to_string())),
            })?;
        Ok(name)
    }

    fn last_updated(&self, series_id: &str) -> Result<Option<DateTime<Utc>>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT MAX(updated) FROM tv_details WHERE series_id = ?",
                params![series_id],
                |row| row.get(0),
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(raw.map(|s| Self::parse_updated(&s)))
    }

    fn is_fresh_today(&self, series_id: &str) -> Result<bool, CatalogError> {
        let fresh = self
            .last_updated(series_id)?
            .map(|updated| updated.date_naive() == Utc::now().date_naive())
            .unwrap_or(false);
        Ok(fresh)
    }
}
