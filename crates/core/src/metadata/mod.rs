//! Series metadata provider abstraction (TVDB-backed).
//!
//! The provider resolves series names to ids and feeds the catalog with
//! episode listings, which arrive paged for long-running series.

mod ingest;
mod tvdb;

pub use ingest::{ingest_episodes, IngestError, IngestReport};
pub use tvdb::TvdbClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Episode, Series};

/// A series as returned by a name search, before the operator picks one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesCandidate {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_aired: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_days: Option<String>,
}

impl SeriesCandidate {
    /// Convert to a catalog series with a fresh pagination cursor.
    pub fn to_series(&self) -> Series {
        Series {
            id: self.id,
            name: self.name.clone(),
            air_time: self.air_time.clone(),
            air_days: self.air_days.clone(),
            page_cursor: 0,
        }
    }
}

/// One page of a series' episode listing.
#[derive(Debug, Clone)]
pub struct EpisodePage {
    pub episodes: Vec<Episode>,
    /// Page to request next, when the listing continues.
    pub next_page: Option<i64>,
}

/// Errors for metadata operations.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Login failed: {0}")]
    Login(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Trait for series metadata providers.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search series by name.
    async fn search_series(&self, name: &str) -> Result<Vec<SeriesCandidate>, MetadataError>;

    /// Fetch one page of a series' episode listing. `page` of `None`
    /// requests the first page.
    async fn episode_page(
        &self,
        series_id: i64,
        page: Option<i64>,
    ) -> Result<EpisodePage, MetadataError>;
}
