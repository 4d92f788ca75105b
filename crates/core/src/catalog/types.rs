//! Types for the episode catalog (series, episodes, download attempts).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tracked series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// Catalog id as assigned by the metadata provider.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Broadcast time (free-form, provider supplied).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_time: Option<String>,
    /// Broadcast days (free-form, provider supplied).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_days: Option<String>,
    /// Last known episode page, used to resume paged ingestion.
    pub page_cursor: i64,
}

/// A single episode of a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Owning series.
    pub series_id: i64,
    /// Catalog id, unique within the series.
    pub id: i64,
    pub season_number: u32,
    pub episode_number: u32,
    pub name: String,
    /// None when the episode has not aired (or the provider omitted it).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
}

/// An episode joined with its series name, as returned by the pending query.
///
/// The series name is needed to derive search queries and the on-disk
/// destination folder, so the catalog hands it back alongside the episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingEpisode {
    pub episode: Episode,
    pub series_name: String,
}

impl PendingEpisode {
    /// Default search query: `"{series} s{season:02}e{episode:02}"`.
    pub fn indexed_name(&self) -> String {
        format!(
            "{} s{:02}e{:02}",
            self.series_name, self.episode.season_number, self.episode.episode_number
        )
    }

    /// Fallback search query with the series name shortened.
    ///
    /// Strict full-title matches are often too narrow for indexers:
    /// `"Some Show: The Reckoning"` becomes `"Some Show"`, and a name with
    /// no colon drops its last space-separated word. The season token is
    /// dropped entirely, keeping only the zero-padded episode number.
    pub fn shortened_indexed_name(&self) -> String {
        let name = self.series_name.as_str();
        let shortened = if let Some((head, _)) = name.split_once(':') {
            head.trim_end().to_string()
        } else {
            let words: Vec<&str> = name.split_whitespace().collect();
            if words.len() > 1 {
                words[..words.len() - 1].join(" ")
            } else {
                name.to_string()
            }
        };
        format!("{} e{:02}", shortened, self.episode.episode_number)
    }
}

/// One download attempt: a distinct file pursued for an episode.
///
/// Identity is the info hash of the transfer descriptor, which is also what
/// the transfer client reports back in its status output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadAttempt {
    /// Content-derived identity (lowercase hex info hash).
    pub info_hash: String,
    /// Owning series. Episode ids are only unique within a series, so the
    /// episode reference needs both halves of its key.
    pub series_id: i64,
    /// Owning episode.
    pub episode_id: i64,
    /// Source filename as reported by the indexer; used for de-duplication.
    pub filename: String,
    /// Human-readable release name from the torrent metainfo.
    pub release_name: String,
    /// Archive member to extract once the transfer completes, if the
    /// payload is itself a compressed archive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_member: Option<String>,
    pub complete: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields required to record a new download attempt.
#[derive(Debug, Clone)]
pub struct NewDownloadAttempt {
    pub info_hash: String,
    pub series_id: i64,
    pub episode_id: i64,
    pub filename: String,
    pub release_name: String,
    pub archive_member: Option<String>,
}

/// A non-complete attempt joined with its series name, for reconciliation.
#[derive(Debug, Clone)]
pub struct ActiveAttempt {
    pub attempt: DownloadAttempt,
    pub series_name: String,
}

/// Operator rule suppressing auto-acquisition.
///
/// A row with no cutoff stops the whole series; a row with a cutoff stops
/// episodes airing at or before it. The filename field suppresses a
/// specific release during candidate selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesExclusion {
    pub series_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aired_after: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
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

    fn pending(series_name: &str, season: u32, episode: u32) -> PendingEpisode {
        PendingEpisode {
            episode: Episode {
                series_id: 1,
                id: 100,
                season_number: season,
                episode_number: episode,
                name: "Pilot".to_string(),
                air_date: None,
                overview: None,
            },
            series_name: series_name.to_string(),
        }
    }

    #[test]
    fn test_indexed_name_zero_pads() {
        let ep = pending("Some Show", 1, 5);
        assert_eq!(ep.indexed_name(), "Some Show s01e05");
    }

    #[test]
    fn test_indexed_name_double_digits() {
        let ep = pending("Some Show", 12, 23);
        assert_eq!(ep.indexed_name(), "Some Show s12e23");
    }

    #[test]
    fn test_shortened_name_with_colon() {
        let ep = pending("Some Show: The Reckoning", 1, 5);
        assert_eq!(ep.shortened_indexed_name(), "Some Show e05");
    }

    #[test]
    fn test_shortened_name_drops_last_word() {
        let ep = pending("The Long Title", 2, 9);
        assert_eq!(ep.shortened_indexed_name(), "The Long e09");
    }

    #[test]
    fn test_shortened_name_single_word() {
        let ep = pending("Show", 1, 1);
        assert_eq!(ep.shortened_indexed_name(), "Show e01");
    }

    #[test]
    fn test_episode_serialization_skips_empty_air_date() {
        let ep = pending("Show", 1, 1);
        let json = serde_json::to_string(&ep.episode).unwrap();
        assert!(!json.contains("air_date"));
    }
}
