//! Jackett indexer backend.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::IndexerConfig;

use super::{FetchedTorrent, Indexer, IndexerError, SearchResult};

/// Jackett indexer backend.
///
/// Queries the aggregate `all` endpoint restricted to the configured
/// trackers. The HTTP client is fully configured at construction and never
/// mutated afterwards.
pub struct JackettIndexer {
    client: Client,
    config: IndexerConfig,
}

impl JackettIndexer {
    /// Create a new JackettIndexer with the given configuration.
    pub fn new(config: IndexerConfig) -> Result<Self, IndexerError> {
        // Some trackers refuse descriptor downloads without browser-ish headers
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                 Chrome/72.0.3626.121 Safari/537.36",
            ),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .default_headers(headers)
            .build()
            .map_err(|e| IndexerError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the Jackett API URL for a search.
    fn build_search_url(&self, query: &str) -> String {
        format!(
            "{}/api/v2.0/indexers/all/results?apikey={}&Query={}&Tracker[]={}",
            self.config.host.trim_end_matches('/'),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(query),
            urlencoding::encode(&self.config.trackers.join(","))
        )
    }

    fn torrent_output_path(&self, series_name: &str, filename: &str) -> PathBuf {
        let flat = filename.split_whitespace().collect::<Vec<_>>().join("_");
        self.series_folder(series_name)
            .join(format!("{}.torrent", flat))
    }

    fn map_request_error(e: reqwest::Error) -> IndexerError {
        if e.is_timeout() {
            IndexerError::Timeout
        } else if e.is_connect() {
            IndexerError::ConnectionFailed(e.to_string())
        } else {
            IndexerError::ApiError(e.to_string())
        }
    }
}

#[async_trait]
impl Indexer for JackettIndexer {
    fn name(&self) -> &str {
        "jackett"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, IndexerError> {
        let url = self.build_search_url(query);
        debug!(query = query, "Searching Jackett");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IndexerError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let jackett_response: JackettResponse = response
            .json()
            .await
            .map_err(|e| IndexerError::ApiError(format!("Failed to parse response: {}", e)))?;

        debug!(
            query = query,
            results = jackett_response.Results.len(),
            "Jackett search complete"
        );

        Ok(jackett_response
            .Results
            .into_iter()
            .filter_map(|r| {
                let link = r.Link?;
                Some(SearchResult {
                    title: r.Title,
                    link,
                    seeders: r.Seeders.unwrap_or(0).max(0) as u32,
                    peers: r.Peers.unwrap_or(0).max(0) as u32,
                })
            })
            .collect())
    }

    async fn fetch_torrent(
        &self,
        series_name: &str,
        link: &str,
        filename: &str,
    ) -> Result<FetchedTorrent, IndexerError> {
        let folder = self.series_folder(series_name);
        tokio::fs::create_dir_all(&folder)
            .await
            .map_err(|e| IndexerError::Io(e.to_string()))?;

        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(IndexerError::ApiError(format!(
                "HTTP {} fetching descriptor",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| IndexerError::ApiError(e.to_string()))?
            .to_vec();

        let path = self.torrent_output_path(series_name, filename);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| IndexerError::Io(e.to_string()))?;

        debug!(path = %path.display(), "Wrote torrent descriptor");

        Ok(FetchedTorrent { path, bytes })
    }

    fn series_folder(&self, series_name: &str) -> PathBuf {
        self.config.torrent_directory.join(series_name)
    }
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    Results: Vec<JackettResult>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    Title: String,
    Link: Option<String>,
    Seeders: Option<i32>,
    Peers: Option<i32>,
}
