//! Release indexer abstraction and the Jackett-backed implementation.
//!
//! The indexer answers free-text queries with release candidates and can
//! materialize a candidate's .torrent descriptor on disk.

mod jackett;
pub mod metainfo;

pub use jackett::JackettIndexer;

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One release candidate returned by a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Release title as published on the tracker.
    pub title: String,
    /// Download link for the .torrent descriptor.
    pub link: String,
    pub seeders: u32,
    pub peers: u32,
}

/// A .torrent descriptor fetched to disk.
#[derive(Debug, Clone)]
pub struct FetchedTorrent {
    /// Where the descriptor was written.
    pub path: PathBuf,
    /// Raw descriptor bytes, for metainfo inspection.
    pub bytes: Vec<u8>,
}

/// Errors for indexer operations.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Trait for release indexers.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Name of this indexer backend.
    fn name(&self) -> &str;

    /// Run a free-text search and return all candidates.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, IndexerError>;

    /// Download a candidate's .torrent descriptor into the series folder.
    ///
    /// The descriptor lands at `{torrent_directory}/{series}/{filename}.torrent`
    /// with whitespace in the filename collapsed to underscores.
    async fn fetch_torrent(
        &self,
        series_name: &str,
        link: &str,
        filename: &str,
    ) -> Result<FetchedTorrent, IndexerError>;

    /// On-disk folder where this series' descriptors and payloads live.
    fn series_folder(&self, series_name: &str) -> PathBuf;
}

/// Extract the source filename from a descriptor link's `file` query
/// parameter. Candidates without one cannot be de-duplicated and are
/// rejected outright.
pub fn filename_from_link(link: &str) -> Option<String> {
    let url = url::Url::parse(link).ok()?;
    let params: HashMap<_, _> = url.query_pairs().collect();
    params.get("file").map(|f| f.to_string())
}
