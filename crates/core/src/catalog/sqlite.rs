//! SQLite-backed episode catalog implementation.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection};

use super::{
    ActiveAttempt, CatalogError, DownloadAttempt, Episode, EpisodeCatalog, NewDownloadAttempt,
    PendingEpisode, Series, SeriesExclusion,
};

/// How long a just-created attempt suppresses re-search of its episode.
const DEBOUNCE_WINDOW_HOURS: i64 = 1;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed episode catalog.
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
            CREATE TABLE IF NOT EXISTS series (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                air_time TEXT,
                air_days TEXT,
                page_cursor INTEGER NOT NULL DEFAULT 0
            );

            -- Episode ids are unique within a series
            CREATE TABLE IF NOT EXISTS episode (
                series_id INTEGER NOT NULL REFERENCES series(id),
                id INTEGER NOT NULL,
                season_number INTEGER NOT NULL,
                episode_number INTEGER NOT NULL,
                name TEXT NOT NULL,
                air_date TEXT,
                overview TEXT,
                PRIMARY KEY (series_id, id)
            );

            -- One row per distinct file pursued for an episode
            -- The episode reference carries both halves of the episode key:
            -- episode ids are only unique within a series
            CREATE TABLE IF NOT EXISTS download_attempt (
                info_hash TEXT PRIMARY KEY,
                series_id INTEGER NOT NULL,
                episode_id INTEGER NOT NULL,
                filename TEXT NOT NULL,
                release_name TEXT NOT NULL,
                archive_member TEXT,
                complete INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                completed_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_download_attempt_filename ON download_attempt(filename);
            CREATE INDEX IF NOT EXISTS idx_download_attempt_episode
                ON download_attempt(series_id, episode_id);

            CREATE TABLE IF NOT EXISTS series_exclusion (
                series_id INTEGER NOT NULL REFERENCES series(id),
                aired_after TEXT,
                filename TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_series_exclusion_series ON series_exclusion(series_id);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_series(row: &rusqlite::Row) -> rusqlite::Result<Series> {
        Ok(Series {
            id: row.get(0)?,
            name: row.get(1)?,
            air_time: row.get(2)?,
            air_days: row.get(3)?,
            page_cursor: row.get(4)?,
        })
    }

    fn row_to_attempt(row: &rusqlite::Row) -> rusqlite::Result<DownloadAttempt> {
        let created_at_str: String = row.get(7)?;
        let completed_at_str: Option<String> = row.get(8)?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        let completed_at = completed_at_str
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(DownloadAttempt {
            info_hash: row.get(0)?,
            series_id: row.get(1)?,
            episode_id: row.get(2)?,
            filename: row.get(3)?,
            release_name: row.get(4)?,
            archive_member: row.get(5)?,
            complete: row.get(6)?,
            created_at,
            completed_at,
        })
    }

    fn parse_date(s: Option<String>) -> Option<NaiveDate> {
        s.as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
    }
}

impl EpisodeCatalog for SqliteCatalog {
    fn upsert_series(&self, series: &Series) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO series (id, name, air_time, air_days, page_cursor)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                air_time = excluded.air_time,
                air_days = excluded.air_days",
            params![
                series.id,
                &series.name,
                &series.air_time,
                &series.air_days,
                series.page_cursor,
            ],
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;
        Ok(())
    }

    fn get_series(&self, id: i64) -> Result<Option<Series>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let series = conn
            .query_row(
                "SELECT id, name, air_time, air_days, page_cursor FROM series WHERE id = ?",
                params![id],
                Self::row_to_series,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(CatalogError::Database(e.to_string())),
            })?;
        Ok(series)
    }

    fn list_series(&self, filter: Option<&[i64]>) -> Result<Vec<Series>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, name, air_time, air_days, page_cursor FROM series ORDER BY id")
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_series)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let wanted: Option<HashSet<i64>> = filter.map(|ids| ids.iter().copied().collect());
        let mut series = Vec::new();
        for row in rows {
            let s = row.map_err(|e| CatalogError::Database(e.to_string()))?;
            if wanted.as_ref().is_none_or(|w| w.contains(&s.id)) {
                series.push(s);
            }
        }
        Ok(series)
    }

    fn set_series_page_cursor(&self, id: i64, page: i64) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE series SET page_cursor = ? WHERE id = ?",
                params![page, id],
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        if updated == 0 {
            return Err(CatalogError::NotFound(format!("series {}", id)));
        }
        Ok(())
    }

    fn insert_episodes(&self, episodes: &[Episode]) -> Result<u32, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut inserted = 0;
        for ep in episodes {
            let changed = conn
                .execute(
                    "INSERT OR IGNORE INTO episode
                     (series_id, id, season_number, episode_number, name, air_date, overview)
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                    params![
                        ep.series_id,
                        ep.id,
                        ep.season_number,
                        ep.episode_number,
                        &ep.name,
                        ep.air_date.map(|d| d.format(DATE_FORMAT).to_string()),
                        &ep.overview,
                    ],
                )
                .map_err(|e| CatalogError::Database(e.to_string()))?;
            inserted += changed as u32;
        }
        Ok(inserted)
    }

    fn pending_episodes(
        &self,
        filter: Option<&[i64]>,
    ) -> Result<Vec<PendingEpisode>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let debounce_cutoff = (Utc::now() - Duration::hours(DEBOUNCE_WINDOW_HOURS)).to_rfc3339();

        // An exclusion row suppresses the episode unless both the row's
        // cutoff and the episode's air date are known and the episode aired
        // strictly after the cutoff.
        let mut stmt = conn
            .prepare(
                "SELECT e.series_id, e.id, e.season_number, e.episode_number,
                        e.name, e.air_date, e.overview, s.name
                 FROM episode e
                 JOIN series s ON s.id = e.series_id
                 WHERE NOT EXISTS (
                     SELECT 1 FROM download_attempt a
                     WHERE a.series_id = e.series_id AND a.episode_id = e.id
                     AND a.complete = 1
                 )
                 AND NOT EXISTS (
                     SELECT 1 FROM download_attempt a
                     WHERE a.series_id = e.series_id AND a.episode_id = e.id
                     AND a.created_at >= ?1
                 )
                 AND NOT EXISTS (
                     SELECT 1 FROM series_exclusion x
                     WHERE x.series_id = e.series_id
                     AND (x.aired_after IS NULL
                          OR e.air_date IS NULL
                          OR e.air_date <= x.aired_after)
                 )
                 ORDER BY e.series_id, e.id",
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![&debounce_cutoff], |row| {
                let air_date: Option<String> = row.get(5)?;
                Ok(PendingEpisode {
                    episode: Episode {
                        series_id: row.get(0)?,
                        id: row.get(1)?,
                        season_number: row.get(2)?,
                        episode_number: row.get(3)?,
                        name: row.get(4)?,
                        air_date: Self::parse_date(air_date),
                        overview: row.get(6)?,
                    },
                    series_name: row.get(7)?,
                })
            })
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let wanted: Option<HashSet<i64>> = filter.map(|ids| ids.iter().copied().collect());
        let mut pending = Vec::new();
        for row in rows {
            let p = row.map_err(|e| CatalogError::Database(e.to_string()))?;
            if wanted.as_ref().is_none_or(|w| w.contains(&p.episode.series_id)) {
                pending.push(p);
            }
        }
        Ok(pending)
    }

    fn excluded_filenames(&self) -> Result<Vec<String>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT filename FROM series_exclusion WHERE filename IS NOT NULL")
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut filenames = Vec::new();
        for row in rows {
            filenames.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(filenames)
    }

    fn add_exclusion(&self, exclusion: &SeriesExclusion) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO series_exclusion (series_id, aired_after, filename) VALUES (?, ?, ?)",
            params![
                exclusion.series_id,
                exclusion.aired_after.map(|d| d.format(DATE_FORMAT).to_string()),
                &exclusion.filename,
            ],
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;
        Ok(())
    }

    fn attempt_exists_for_filename(&self, filename: &str) -> Result<bool, CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT 1 FROM download_attempt WHERE filename = ? LIMIT 1",
            params![filename],
            |_| Ok(true),
        )
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(false),
            _ => Err(CatalogError::Database(e.to_string())),
        })
    }

    fn insert_attempt(&self, attempt: &NewDownloadAttempt) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO download_attempt
             (info_hash, series_id, episode_id, filename, release_name, archive_member,
              complete, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
            params![
                &attempt.info_hash,
                attempt.series_id,
                attempt.episode_id,
                &attempt.filename,
                &attempt.release_name,
                &attempt.archive_member,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;
        Ok(())
    }

    fn get_attempt(&self, info_hash: &str) -> Result<Option<DownloadAttempt>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let attempt = conn
            .query_row(
                "SELECT info_hash, series_id, episode_id, filename, release_name, archive_member,
                        complete, created_at, completed_at
                 FROM download_attempt WHERE info_hash = ?",
                params![info_hash],
                Self::row_to_attempt,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(CatalogError::Database(e.to_string())),
            })?;
        Ok(attempt)
    }

    fn active_attempts(&self) -> Result<Vec<ActiveAttempt>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT a.info_hash, a.series_id, a.episode_id, a.filename, a.release_name,
                        a.archive_member, a.complete, a.created_at, a.completed_at, s.name
                 FROM download_attempt a
                 JOIN series s ON s.id = a.series_id
                 WHERE a.complete = 0
                 ORDER BY a.created_at",
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let attempt = Self::row_to_attempt(row)?;
                let series_name: String = row.get(9)?;
                Ok(ActiveAttempt {
                    attempt,
                    series_name,
                })
            })
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut attempts = Vec::new();
        for row in rows {
            attempts.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(attempts)
    }

    fn mark_attempt_complete(
        &self,
        info_hash: &str,
        completed_at: chrono::DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE download_attempt SET complete = 1, completed_at = ? WHERE info_hash = ?",
                params![completed_at.to_rfc3339(), info_hash],
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        if updated == 0 {
            return Err(CatalogError::NotFound(format!("attempt {}", info_hash)));
        }
        Ok(())
    }
}
