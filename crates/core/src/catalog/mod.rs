//! Episode catalog - the durable record of series, episodes, download
//! attempts and exclusions.
//!
//! The catalog is pure data with referential invariants; the acquisition
//! logic lives in the engine. The one non-trivial read is
//! [`EpisodeCatalog::pending_episodes`], which computes the set of episodes
//! still requiring action.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

use chrono::{DateTime, Utc};

/// Trait for catalog storage.
pub trait EpisodeCatalog: Send + Sync {
    /// Insert a series, or update its mutable fields if it already exists.
    fn upsert_series(&self, series: &Series) -> Result<(), CatalogError>;

    /// Get a series by id.
    fn get_series(&self, id: i64) -> Result<Option<Series>, CatalogError>;

    /// List series, optionally restricted to the given ids.
    fn list_series(&self, filter: Option<&[i64]>) -> Result<Vec<Series>, CatalogError>;

    /// Persist the pagination cursor for a series.
    fn set_series_page_cursor(&self, id: i64, page: i64) -> Result<(), CatalogError>;

    /// Insert episodes, skipping any already present.
    ///
    /// Returns the number of episodes actually inserted.
    fn insert_episodes(&self, episodes: &[Episode]) -> Result<u32, CatalogError>;

    /// Episodes still requiring action, in deterministic (series, episode)
    /// order. An episode is pending iff it has no complete attempt, no
    /// attempt created within the last hour, and is not excluded.
    ///
    /// Pure read; safe to call repeatedly and concurrently.
    fn pending_episodes(&self, filter: Option<&[i64]>)
        -> Result<Vec<PendingEpisode>, CatalogError>;

    /// All filenames suppressed by an exclusion rule.
    fn excluded_filenames(&self) -> Result<Vec<String>, CatalogError>;

    /// Record an operator exclusion.
    fn add_exclusion(&self, exclusion: &SeriesExclusion) -> Result<(), CatalogError>;

    /// Whether any attempt, for any episode, already pursued this filename.
    fn attempt_exists_for_filename(&self, filename: &str) -> Result<bool, CatalogError>;

    /// Record a new download attempt (created now, not complete).
    fn insert_attempt(&self, attempt: &NewDownloadAttempt) -> Result<(), CatalogError>;

    /// Get an attempt by its info hash.
    fn get_attempt(&self, info_hash: &str) -> Result<Option<DownloadAttempt>, CatalogError>;

    /// All attempts not yet marked complete, joined with their series name.
    fn active_attempts(&self) -> Result<Vec<ActiveAttempt>, CatalogError>;

    /// Flip an attempt to complete and stamp the completion time.
    fn mark_attempt_complete(
        &self,
        info_hash: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<(), CatalogError>;
}
