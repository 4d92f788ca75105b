//! TVDB API client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::catalog::Episode;
use crate::config::MetadataConfig;

use super::{EpisodePage, MetadataError, MetadataProvider, SeriesCandidate};

/// TVDB API client.
///
/// Authentication happens once in [`TvdbClient::login`]; the bearer token is
/// baked into the HTTP client's default headers and never mutated afterwards.
pub struct TvdbClient {
    client: Client,
    endpoint: String,
}

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    // TVDB rejects unknown user agents
    headers.insert(USER_AGENT, HeaderValue::from_static("curl/7.60.0"));
    headers
}

impl TvdbClient {
    /// Authenticate against the TVDB API and return a ready client.
    pub async fn login(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();

        let login_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .default_headers(base_headers())
            .build()
            .map_err(|e| MetadataError::Login(e.to_string()))?;

        let response = login_client
            .post(format!("{}/login", endpoint))
            .json(&json!({ "apikey": config.api_key }))
            .send()
            .await
            .map_err(|e| MetadataError::Login(e.to_string()))?;

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| MetadataError::Login(e.to_string()))?;

        let token = body
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MetadataError::Login("no token in response".to_string()))?;

        let mut headers = base_headers();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| MetadataError::Login(e.to_string()))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .default_headers(headers)
            .build()
            .map_err(|e| MetadataError::Login(e.to_string()))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl MetadataProvider for TvdbClient {
    async fn search_series(&self, name: &str) -> Result<Vec<SeriesCandidate>, MetadataError> {
        let url = format!("{}/search/series", self.endpoint);
        debug!(name = name, "Searching series");

        let response = self
            .client
            .get(&url)
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| MetadataError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MetadataError::Api(format!("HTTP {}", response.status())));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| MetadataError::Parse(e.to_string()))?;

        Ok(body
            .data
            .into_iter()
            .map(|raw| SeriesCandidate {
                id: raw.id,
                name: raw.seriesName.unwrap_or_default(),
                network: raw.network.filter(|s| !s.is_empty()),
                first_aired: raw.firstAired.filter(|s| !s.is_empty()),
                overview: raw.overview.filter(|s| !s.is_empty()),
                air_time: raw.airsTime.filter(|s| !s.is_empty()),
                air_days: raw.airsDayOfWeek.filter(|s| !s.is_empty()),
            })
            .collect())
    }

    async fn episode_page(
        &self,
        series_id: i64,
        page: Option<i64>,
    ) -> Result<EpisodePage, MetadataError> {
        let url = format!("{}/series/{}/episodes", self.endpoint, series_id);

        let mut request = self.client.get(&url);
        if let Some(page) = page {
            request = request.query(&[("page", page)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MetadataError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MetadataError::Api(format!("HTTP {}", response.status())));
        }

        let body: EpisodesResponse = response
            .json()
            .await
            .map_err(|e| MetadataError::Parse(e.to_string()))?;

        let episodes = body
            .data
            .into_iter()
            .filter_map(|raw| raw_to_episode(series_id, raw))
            .collect();

        Ok(EpisodePage {
            episodes,
            next_page: body.links.and_then(|l| l.next),
        })
    }
}

fn raw_to_episode(series_id: i64, raw: RawEpisode) -> Option<Episode> {
    // Entries without an id cannot be keyed and are dropped
    let id = raw.id?;
    let air_date = raw
        .firstAired
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());

    Some(Episode {
        series_id: raw.seriesId.unwrap_or(series_id),
        id,
        season_number: raw.airedSeason.unwrap_or(0),
        episode_number: raw.airedEpisodeNumber.unwrap_or(0),
        name: raw.episodeName.unwrap_or_default(),
        air_date,
        overview: raw.overview.filter(|s| !s.is_empty()),
    })
}

// TVDB API response types
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct SearchResponse {
    data: Vec<RawSeries>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawSeries {
    id: i64,
    seriesName: Option<String>,
    network: Option<String>,
    firstAired: Option<String>,
    overview: Option<String>,
    airsTime: Option<String>,
    airsDayOfWeek: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EpisodesResponse {
    data: Vec<RawEpisode>,
    links: Option<PageLinks>,
}

#[derive(Debug, Deserialize)]
struct PageLinks {
    next: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawEpisode {
    id: Option<i64>,
    seriesId: Option<i64>,
    airedSeason: Option<u32>,
    airedEpisodeNumber: Option<u32>,
    episodeName: Option<String>,
    firstAired: Option<String>,
    overview: Option<String>,
}
