//! Mock indexer.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::indexer::{FetchedTorrent, Indexer, IndexerError, SearchResult};

/// In-memory indexer that serves canned results per query and records
/// everything it is asked to do.
pub struct MockIndexer {
    root: PathBuf,
    results: Mutex<HashMap<String, Vec<SearchResult>>>,
    torrent_bytes: Mutex<Vec<u8>>,
    torrent_bytes_by_filename: Mutex<HashMap<String, Vec<u8>>>,
    searches: Mutex<Vec<String>>,
    fetches: Mutex<Vec<(String, String)>>,
}

impl MockIndexer {
    pub fn new() -> Self {
        Self {
            root: std::env::temp_dir().join("mock-indexer"),
            results: Mutex::new(HashMap::new()),
            torrent_bytes: Mutex::new(Vec::new()),
            torrent_bytes_by_filename: Mutex::new(HashMap::new()),
            searches: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// Serve these results for an exact query string.
    pub fn add_results(&self, query: &str, results: Vec<SearchResult>) {
        self.results
            .lock()
            .unwrap()
            .insert(query.to_string(), results);
    }

    /// Bytes returned by every subsequent descriptor fetch.
    pub fn set_torrent_bytes(&self, bytes: Vec<u8>) {
        *self.torrent_bytes.lock().unwrap() = bytes;
    }

    /// Bytes returned when fetching this specific filename.
    pub fn set_torrent_bytes_for(&self, filename: &str, bytes: Vec<u8>) {
        self.torrent_bytes_by_filename
            .lock()
            .unwrap()
            .insert(filename.to_string(), bytes);
    }

    /// Queries seen, in order.
    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    /// `(series, filename)` pairs fetched, in order.
    pub fn fetches(&self) -> Vec<(String, String)> {
        self.fetches.lock().unwrap().clone()
    }
}

impl Default for MockIndexer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, IndexerError> {
        self.searches.lock().unwrap().push(query.to_string());
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_torrent(
        &self,
        series_name: &str,
        _link: &str,
        filename: &str,
    ) -> Result<FetchedTorrent, IndexerError> {
        self.fetches
            .lock()
            .unwrap()
            .push((series_name.to_string(), filename.to_string()));

        let bytes = self
            .torrent_bytes_by_filename
            .lock()
            .unwrap()
            .get(filename)
            .cloned()
            .unwrap_or_else(|| self.torrent_bytes.lock().unwrap().clone());

        let flat = filename.split_whitespace().collect::<Vec<_>>().join("_");
        Ok(FetchedTorrent {
            path: self
                .series_folder(series_name)
                .join(format!("{}.torrent", flat)),
            bytes,
        })
    }

    fn series_folder(&self, series_name: &str) -> PathBuf {
        self.root.join(series_name)
    }
}
