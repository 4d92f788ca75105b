//! The acquisition engine.
//!
//! Two passes, both idempotent and safe to re-run on a schedule:
//!
//! - [`AcquisitionEngine::acquire`] walks pending episodes, searches the
//!   indexer, picks the best unseen candidate and starts its transfer.
//! - [`AcquisitionEngine::reconcile`] reads the transfer client's status,
//!   marks finished attempts complete and unpacks archived payloads.

mod selector;
mod types;

pub use selector::{rank_results, select_best, SelectedCandidate, SelectorError};
pub use types::{AcquisitionReport, EngineError, ReconcileReport};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog::{EpisodeCatalog, NewDownloadAttempt, PendingEpisode};
use crate::config::EngineConfig;
use crate::extract::ArchiveExtractor;
use crate::indexer::{metainfo, Indexer, SearchResult};
use crate::transfer::{parse_status, TransferClient};

/// What happened to one pending episode during an acquisition pass.
#[derive(Debug, Default)]
struct EpisodeOutcome {
    recorded: bool,
    transfer_started: bool,
}

/// Drives acquisition and reconciliation over the collaborator seams.
pub struct AcquisitionEngine {
    config: EngineConfig,
    catalog: Arc<dyn EpisodeCatalog>,
    indexer: Arc<dyn Indexer>,
    transfer: Arc<dyn TransferClient>,
    extractor: Arc<dyn ArchiveExtractor>,
}

impl AcquisitionEngine {
    pub fn new(
        config: EngineConfig,
        catalog: Arc<dyn EpisodeCatalog>,
        indexer: Arc<dyn Indexer>,
        transfer: Arc<dyn TransferClient>,
        extractor: Arc<dyn ArchiveExtractor>,
    ) -> Self {
        Self {
            config,
            catalog,
            indexer,
            transfer,
            extractor,
        }
    }

    /// Run one acquisition pass over all pending episodes.
    ///
    /// Per-episode failures are logged and do not stop the pass. With
    /// `pause_transfer` the attempts are recorded but no transfer starts.
    pub async fn acquire(
        &self,
        series_ids: Option<&[i64]>,
        pause_transfer: bool,
    ) -> Result<AcquisitionReport, EngineError> {
        let pending = self.catalog.pending_episodes(series_ids)?;
        let excluded: HashSet<String> = self.catalog.excluded_filenames()?.into_iter().collect();

        let mut report = AcquisitionReport {
            pending: pending.len() as u32,
            started: 0,
        };

        for episode in &pending {
            match self.acquire_episode(episode, &excluded, pause_transfer).await {
                Ok(outcome) => {
                    if outcome.recorded {
                        report.started += 1;
                    }
                    if outcome.transfer_started && self.config.transfer_cooldown_secs > 0 {
                        // Give the client room to settle before the next add
                        tokio::time::sleep(Duration::from_secs(
                            self.config.transfer_cooldown_secs,
                        ))
                        .await;
                    }
                }
                Err(e) => {
                    warn!(
                        episode = %episode.indexed_name(),
                        error = %e,
                        "Episode acquisition failed"
                    );
                }
            }
        }

        Ok(report)
    }

    async fn acquire_episode(
        &self,
        episode: &PendingEpisode,
        excluded: &HashSet<String>,
        pause_transfer: bool,
    ) -> Result<EpisodeOutcome, EngineError> {
        let mut results = self.search_episode(episode).await?;
        if results.is_empty() {
            debug!(episode = %episode.indexed_name(), "No candidates found");
            return Ok(EpisodeOutcome::default());
        }

        rank_results(&mut results);
        let Some(candidate) = select_best(&results, excluded, self.catalog.as_ref())? else {
            debug!(episode = %episode.indexed_name(), "All candidates rejected");
            return Ok(EpisodeOutcome::default());
        };

        let fetched = self
            .indexer
            .fetch_torrent(
                &episode.series_name,
                &candidate.result.link,
                &candidate.filename,
            )
            .await?;

        let summary = metainfo::parse_summary(&fetched.bytes)?;

        self.catalog.insert_attempt(&NewDownloadAttempt {
            info_hash: summary.info_hash.clone(),
            series_id: episode.episode.series_id,
            episode_id: episode.episode.id,
            filename: candidate.filename.clone(),
            release_name: summary.name.clone(),
            archive_member: summary.archive_member.clone(),
        })?;

        info!(
            episode = %episode.indexed_name(),
            release = %summary.name,
            "Recorded download attempt"
        );

        if pause_transfer {
            return Ok(EpisodeOutcome {
                recorded: true,
                transfer_started: false,
            });
        }

        let download_dir = self.indexer.series_folder(&episode.series_name);
        if let Err(e) = self.transfer.start(&fetched.path, &download_dir).await {
            // The attempt row is already committed and must stay counted;
            // the debounce window expiring retries the episode naturally
            warn!(
                episode = %episode.indexed_name(),
                error = %e,
                "Transfer start failed"
            );
            return Ok(EpisodeOutcome {
                recorded: true,
                transfer_started: false,
            });
        }

        Ok(EpisodeOutcome {
            recorded: true,
            transfer_started: true,
        })
    }

    /// Search the indexer for an episode, falling back to a shortened
    /// query when the full one finds nothing.
    async fn search_episode(
        &self,
        episode: &PendingEpisode,
    ) -> Result<Vec<SearchResult>, EngineError> {
        let mut queries = vec![episode.indexed_name()];
        if self.config.shortened_searches {
            queries.push(episode.shortened_indexed_name());
        }

        for query in &queries {
            info!(query = %query, "Searching for episode");
            let results = self.indexer.search(query).await?;
            if !results.is_empty() {
                return Ok(results);
            }
        }
        Ok(Vec::new())
    }

    /// Run one reconciliation pass.
    ///
    /// Reads the transfer client's status once, matches records to active
    /// attempts by info hash, completes anything at 100% and extracts its
    /// archive member. Extraction failures are logged, not fatal; the files
    /// stay on disk for a manual retry.
    pub async fn reconcile(&self) -> Result<ReconcileReport, EngineError> {
        let raw = self.transfer.status().await?;
        let records = parse_status(&raw);

        let mut report = ReconcileReport {
            records: records.len() as u32,
            completed: 0,
        };

        for active in self.catalog.active_attempts()? {
            let attempt = &active.attempt;
            let Some(record) = records
                .iter()
                .find(|r| r.id.as_deref() == Some(attempt.info_hash.as_str()))
            else {
                continue;
            };

            if !record.is_complete() {
                debug!(
                    release = %attempt.release_name,
                    progress = ?record.progress,
                    "Transfer not complete"
                );
                continue;
            }

            self.catalog
                .mark_attempt_complete(&attempt.info_hash, Utc::now())?;
            report.completed += 1;
            info!(release = %attempt.release_name, "Transfer complete");

            if let Some(member) = &attempt.archive_member {
                let folder = self.indexer.series_folder(&active.series_name);
                let archive = folder.join(member);
                if let Err(e) = self.extractor.extract(&archive, &folder).await {
                    warn!(
                        archive = %archive.display(),
                        error = %e,
                        "Archive extraction failed"
                    );
                }
            }
        }

        Ok(report)
    }
}
