//! Mock metadata provider.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::catalog::Episode;
use crate::metadata::{EpisodePage, MetadataError, MetadataProvider, SeriesCandidate};

/// Serves scripted search results and episode pages.
pub struct MockMetadataProvider {
    search_results: Mutex<HashMap<String, Vec<SeriesCandidate>>>,
    pages: Mutex<HashMap<(i64, Option<i64>), EpisodePage>>,
    requested: Mutex<Vec<(i64, Option<i64>)>>,
}

impl MockMetadataProvider {
    pub fn new() -> Self {
        Self {
            search_results: Mutex::new(HashMap::new()),
            pages: Mutex::new(HashMap::new()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn add_search_results(&self, name: &str, results: Vec<SeriesCandidate>) {
        self.search_results
            .lock()
            .unwrap()
            .insert(name.to_string(), results);
    }

    /// Script one episode page. Episodes are synthesized from ids.
    pub fn add_episode_page(
        &self,
        series_id: i64,
        page: Option<i64>,
        episode_ids: &[i64],
        next_page: Option<i64>,
    ) {
        let episodes = episode_ids
            .iter()
            .map(|&id| Episode {
                series_id,
                id,
                season_number: 1,
                episode_number: (id % 100) as u32,
                name: format!("Episode {}", id),
                air_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                overview: None,
            })
            .collect();

        self.pages.lock().unwrap().insert(
            (series_id, page),
            EpisodePage {
                episodes,
                next_page,
            },
        );
    }

    /// `(series_id, page)` pairs requested, in order.
    pub fn requested_pages(&self) -> Vec<(i64, Option<i64>)> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for MockMetadataProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataProvider for MockMetadataProvider {
    async fn search_series(&self, name: &str) -> Result<Vec<SeriesCandidate>, MetadataError> {
        Ok(self
            .search_results
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    async fn episode_page(
        &self,
        series_id: i64,
        page: Option<i64>,
    ) -> Result<EpisodePage, MetadataError> {
        self.requested.lock().unwrap().push((series_id, page));
        self.pages
            .lock()
            .unwrap()
            .get(&(series_id, page))
            .cloned()
            .ok_or_else(|| MetadataError::Api(format!("no page scripted for {:?}", (series_id, page))))
    }
}
