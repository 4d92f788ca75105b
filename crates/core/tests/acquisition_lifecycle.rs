//! Acquisition lifecycle integration tests.
//!
//! These tests verify the complete attempt lifecycle through the engine:
//! pending -> searched -> attempt recorded -> transferring -> complete

use std::sync::Arc;

use chrono::NaiveDate;

use episodarr_core::{
    catalog::{Episode, EpisodeCatalog, Series, SeriesExclusion, SqliteCatalog},
    config::EngineConfig,
    indexer::{Indexer, SearchResult},
    testing::{fixtures, MockExtractor, MockIndexer, MockTransferClient},
    AcquisitionEngine,
};
use tempfile::TempDir;

/// Test helper to create all dependencies for engine testing.
struct TestHarness {
    engine: AcquisitionEngine,
    catalog: Arc<SqliteCatalog>,
    indexer: Arc<MockIndexer>,
    transfer: Arc<MockTransferClient>,
    extractor: Arc<MockExtractor>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let catalog = Arc::new(SqliteCatalog::new(&db_path).expect("Failed to create catalog"));
        let indexer = Arc::new(MockIndexer::new());
        let transfer = Arc::new(MockTransferClient::new());
        let extractor = Arc::new(MockExtractor::new());

        let engine = AcquisitionEngine::new(
            EngineConfig {
                shortened_searches: false,
                transfer_cooldown_secs: 0,
            },
            catalog.clone(),
            indexer.clone(),
            transfer.clone(),
            extractor.clone(),
        );

        Self {
            engine,
            catalog,
            indexer,
            transfer,
            extractor,
            _temp_dir: temp_dir,
        }
    }

    fn seed_series(&self, id: i64, name: &str) {
        self.catalog
            .upsert_series(&Series {
                id,
                name: name.to_string(),
                air_time: None,
                air_days: None,
                page_cursor: 0,
            })
            .unwrap();
    }

    fn seed_episode(&self, series_id: i64, id: i64, season: u32, number: u32, air_date: &str) {
        self.catalog
            .insert_episodes(&[Episode {
                series_id,
                id,
                season_number: season,
                episode_number: number,
                name: format!("Episode {}", number),
                air_date: NaiveDate::parse_from_str(air_date, "%Y-%m-%d").ok(),
                overview: None,
            }])
            .unwrap();
    }
}

fn candidate(title: &str, seeders: u32, filename: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        link: format!("http://localhost:9117/dl/tracker?file={}", filename),
        seeders,
        peers: seeders / 3,
    }
}

#[tokio::test]
async fn test_full_lifecycle_to_completion() {
    let h = TestHarness::new();
    h.seed_series(7, "Some Show");
    h.seed_episode(7, 101, 1, 5, "2024-01-01");

    h.indexer.add_results(
        "Some Show s01e05",
        vec![
            candidate("Some.Show.S01E05.720p", 83, "a.mkv"),
            candidate("Some.Show.S01E05.1080p", 100, "b.mkv"),
        ],
    );
    h.indexer
        .set_torrent_bytes(fixtures::single_file_torrent("Some.Show.S01E05.1080p.mkv", 7000));

    // Acquisition pass: the better-seeded candidate wins
    let report = h.engine.acquire(None, false).await.unwrap();
    assert_eq!(report.pending, 1);
    assert_eq!(report.started, 1);

    let active = h.catalog.active_attempts().unwrap();
    assert_eq!(active.len(), 1);
    let attempt = &active[0].attempt;
    assert_eq!(attempt.filename, "b.mkv");
    assert_eq!(attempt.release_name, "Some.Show.S01E05.1080p.mkv");
    assert!(!attempt.complete);

    let starts = h.transfer.starts();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].1, h.indexer.series_folder("Some Show"));

    // The episode is debounced while the transfer runs
    assert!(h.catalog.pending_episodes(None).unwrap().is_empty());

    // Reconciliation pass: still downloading, nothing changes
    h.transfer.set_status_output(&format!(
        "Name: Some.Show.S01E05.1080p\nID: {}\nState: Downloading\nProgress: 42.7%\n",
        attempt.info_hash
    ));
    let report = h.engine.reconcile().await.unwrap();
    assert_eq!(report.completed, 0);

    // Reconciliation pass: done
    h.transfer.set_status_output(&format!(
        "Name: Some.Show.S01E05.1080p\nID: {}\nState: Seeding\nProgress: 100.0%\n",
        attempt.info_hash
    ));
    let report = h.engine.reconcile().await.unwrap();
    assert_eq!(report.completed, 1);

    let stored = h.catalog.get_attempt(&attempt.info_hash).unwrap().unwrap();
    assert!(stored.complete);
    assert!(stored.completed_at.is_some());
    assert!(h.catalog.active_attempts().unwrap().is_empty());

    // Complete attempt keeps the episode out of the pending set for good
    assert!(h.catalog.pending_episodes(None).unwrap().is_empty());
}

#[tokio::test]
async fn test_archived_payload_is_extracted_on_completion() {
    let h = TestHarness::new();
    h.seed_series(7, "Some Show");
    h.seed_episode(7, 101, 1, 5, "2024-01-01");

    h.indexer
        .add_results("Some Show s01e05", vec![candidate("rar release", 10, "a.mkv")]);
    h.indexer.set_torrent_bytes(fixtures::multi_file_torrent(
        "Some.Show.S01E05",
        &[("some.show.rar", 9000), ("some.show.nfo", 12)],
    ));

    h.engine.acquire(None, false).await.unwrap();
    let attempt = h.catalog.active_attempts().unwrap()[0].attempt.clone();
    assert_eq!(
        attempt.archive_member.as_deref(),
        Some("Some.Show.S01E05/some.show.rar")
    );

    h.transfer
        .set_status_output(&format!("ID: {}\nProgress: 100%\n", attempt.info_hash));
    h.engine.reconcile().await.unwrap();

    let extractions = h.extractor.extractions();
    assert_eq!(extractions.len(), 1);
    let folder = h.indexer.series_folder("Some Show");
    assert_eq!(extractions[0].0, folder.join("Some.Show.S01E05/some.show.rar"));
    assert_eq!(extractions[0].1, folder);
}

#[tokio::test]
async fn test_exclusions_and_duplicates_shape_the_pass() {
    let h = TestHarness::new();
    h.seed_series(7, "Some Show");
    h.seed_series(8, "Other Show");
    h.seed_episode(7, 101, 1, 5, "2024-01-01");
    h.seed_episode(8, 201, 3, 1, "2024-02-01");

    // Operator stopped Other Show entirely
    h.catalog
        .add_exclusion(&SeriesExclusion {
            series_id: 8,
            aired_after: None,
            filename: None,
        })
        .unwrap();
    // And blacklisted one specific release
    h.catalog
        .add_exclusion(&SeriesExclusion {
            series_id: 7,
            aired_after: Some(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
            filename: Some("banned.mkv".to_string()),
        })
        .unwrap();

    h.indexer.add_results(
        "Some Show s01e05",
        vec![
            candidate("banned", 500, "banned.mkv"),
            candidate("fine", 10, "fine.mkv"),
        ],
    );
    h.indexer
        .set_torrent_bytes(fixtures::single_file_torrent("fine.mkv", 1000));

    let report = h.engine.acquire(None, false).await.unwrap();
    // Other Show never reached the indexer
    assert_eq!(report.pending, 1);
    assert_eq!(report.started, 1);
    assert_eq!(
        h.catalog.active_attempts().unwrap()[0].attempt.filename,
        "fine.mkv"
    );
    assert_eq!(h.indexer.searches(), vec!["Some Show s01e05".to_string()]);
}

#[tokio::test]
async fn test_repeat_pass_is_idempotent() {
    let h = TestHarness::new();
    h.seed_series(7, "Some Show");
    h.seed_episode(7, 101, 1, 5, "2024-01-01");

    h.indexer
        .add_results("Some Show s01e05", vec![candidate("a", 10, "a.mkv")]);
    h.indexer
        .set_torrent_bytes(fixtures::single_file_torrent("a.mkv", 1000));

    let first = h.engine.acquire(None, false).await.unwrap();
    assert_eq!(first.started, 1);

    // Second pass right away: the fresh attempt debounces the episode
    let second = h.engine.acquire(None, false).await.unwrap();
    assert_eq!(second.pending, 0);
    assert_eq!(second.started, 0);
    assert_eq!(h.transfer.starts().len(), 1);
}

#[tokio::test]
async fn test_series_filter_limits_the_pass() {
    let h = TestHarness::new();
    h.seed_series(7, "Some Show");
    h.seed_series(8, "Other Show");
    h.seed_episode(7, 101, 1, 5, "2024-01-01");
    h.seed_episode(8, 201, 1, 1, "2024-01-01");

    h.indexer
        .add_results("Other Show s01e01", vec![candidate("o", 10, "o.mkv")]);
    h.indexer
        .set_torrent_bytes(fixtures::single_file_torrent("o.mkv", 1000));

    let report = h.engine.acquire(Some(&[8]), false).await.unwrap();
    assert_eq!(report.pending, 1);
    assert_eq!(report.started, 1);
    assert_eq!(h.indexer.searches(), vec!["Other Show s01e01".to_string()]);
}
