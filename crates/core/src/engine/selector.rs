//! Candidate ranking and selection.

use std::collections::HashSet;

use thiserror::Error;

use crate::catalog::{CatalogError, EpisodeCatalog};
use crate::indexer::{filename_from_link, SearchResult};

/// The winning candidate for an episode, with its source filename resolved.
#[derive(Debug, Clone)]
pub struct SelectedCandidate {
    pub result: SearchResult,
    /// Filename from the descriptor link; the de-duplication key.
    pub filename: String,
}

/// Errors for candidate selection.
#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("Search result link has no file parameter: {0}")]
    MissingFileParam(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Order candidates best-first: descending seeder count, ties keeping the
/// indexer's order.
pub fn rank_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.seeders.cmp(&a.seeders));
}

/// Walk ranked candidates and pick the first usable one.
///
/// A candidate is skipped when its filename is operator-excluded or a
/// previous attempt (for any episode) already pursued it. A candidate whose
/// link carries no filename aborts selection; without the filename nothing
/// downstream can be de-duplicated.
pub fn select_best(
    results: &[SearchResult],
    excluded: &HashSet<String>,
    catalog: &dyn EpisodeCatalog,
) -> Result<Option<SelectedCandidate>, SelectorError> {
    for result in results {
        let filename = filename_from_link(&result.link)
            .ok_or_else(|| SelectorError::MissingFileParam(result.link.clone()))?;

        if excluded.contains(&filename) {
            continue;
        }
        if catalog.attempt_exists_for_filename(&filename)? {
            continue;
        }

        return Ok(Some(SelectedCandidate {
            result: result.clone(),
            filename,
        }));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Episode, NewDownloadAttempt, Series, SqliteCatalog};

    fn result(title: &str, seeders: u32, filename: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            link: format!("http://tracker/dl?file={}", filename),
            seeders,
            peers: seeders / 2,
        }
    }

    fn empty_catalog() -> SqliteCatalog {
        SqliteCatalog::in_memory().unwrap()
    }

    #[test]
    fn test_rank_results_descending_seeders() {
        let mut results = vec![
            result("a", 83, "a.mkv"),
            result("b", 100, "b.mkv"),
            result("c", 5, "c.mkv"),
        ];
        rank_results(&mut results);
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_rank_results_ties_keep_order() {
        let mut results = vec![
            result("first", 10, "a.mkv"),
            result("second", 10, "b.mkv"),
            result("third", 10, "c.mkv"),
        ];
        rank_results(&mut results);
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_select_best_takes_first() {
        let catalog = empty_catalog();
        let results = vec![result("a", 100, "a.mkv"), result("b", 50, "b.mkv")];
        let selected = select_best(&results, &HashSet::new(), &catalog)
            .unwrap()
            .unwrap();
        assert_eq!(selected.filename, "a.mkv");
        assert_eq!(selected.result.title, "a");
    }

    #[test]
    fn test_select_best_skips_excluded() {
        let catalog = empty_catalog();
        let results = vec![result("a", 100, "a.mkv"), result("b", 50, "b.mkv")];
        let excluded: HashSet<String> = ["a.mkv".to_string()].into();
        let selected = select_best(&results, &excluded, &catalog).unwrap().unwrap();
        assert_eq!(selected.filename, "b.mkv");
    }

    #[test]
    fn test_select_best_skips_already_attempted() {
        let catalog = empty_catalog();
        catalog
            .upsert_series(&Series {
                id: 1,
                name: "Show".to_string(),
                air_time: None,
                air_days: None,
                page_cursor: 0,
            })
            .unwrap();
        catalog
            .insert_episodes(&[Episode {
                series_id: 1,
                id: 101,
                season_number: 1,
                episode_number: 1,
                name: "Pilot".to_string(),
                air_date: None,
                overview: None,
            }])
            .unwrap();
        catalog
            .insert_attempt(&NewDownloadAttempt {
                info_hash: "hash-a".to_string(),
                series_id: 1,
                episode_id: 101,
                filename: "a.mkv".to_string(),
                release_name: "a".to_string(),
                archive_member: None,
            })
            .unwrap();

        let results = vec![result("a", 100, "a.mkv"), result("b", 50, "b.mkv")];
        let selected = select_best(&results, &HashSet::new(), &catalog)
            .unwrap()
            .unwrap();
        assert_eq!(selected.filename, "b.mkv");
    }

    #[test]
    fn test_select_best_exhausted() {
        let catalog = empty_catalog();
        let results = vec![result("a", 100, "a.mkv")];
        let excluded: HashSet<String> = ["a.mkv".to_string()].into();
        assert!(select_best(&results, &excluded, &catalog).unwrap().is_none());
    }

    #[test]
    fn test_select_best_missing_file_param_is_error() {
        let catalog = empty_catalog();
        let results = vec![SearchResult {
            title: "bad".to_string(),
            link: "http://tracker/dl?path=only".to_string(),
            seeders: 100,
            peers: 10,
        }];
        let result = select_best(&results, &HashSet::new(), &catalog);
        assert!(matches!(result, Err(SelectorError::MissingFileParam(_))));
    }

    #[test]
    fn test_select_best_empty_results() {
        let catalog = empty_catalog();
        assert!(select_best(&[], &HashSet::new(), &catalog)
            .unwrap()
            .is_none());
    }
}
