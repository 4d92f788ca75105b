//! Paged episode ingestion into the catalog.

use tracing::info;

use crate::catalog::EpisodeCatalog;

use super::{MetadataError, MetadataProvider};

/// Outcome of one ingestion run.
#[derive(Debug, Default, Clone)]
pub struct IngestReport {
    /// Series processed.
    pub series: u32,
    /// Episodes newly added to the catalog.
    pub episodes_added: u32,
}

/// Errors surfaced by ingestion.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Catalog(#[from] crate::catalog::CatalogError),
}

/// Pull episode listings for the given series (all tracked series when
/// `series_ids` is `None`) and insert anything new into the catalog.
///
/// Listings are paged; the walk resumes from each series' persisted cursor
/// so long-running series are not re-fetched from page one, and the deepest
/// page seen is persisted afterwards.
pub async fn ingest_episodes(
    provider: &dyn MetadataProvider,
    catalog: &dyn EpisodeCatalog,
    series_ids: Option<&[i64]>,
) -> Result<IngestReport, IngestError> {
    let mut report = IngestReport::default();

    for series in catalog.list_series(series_ids)? {
        let mut page = (series.page_cursor > 0).then_some(series.page_cursor);
        let mut deepest_page = None;
        let mut added = 0;

        loop {
            let listing = provider.episode_page(series.id, page).await?;
            added += catalog.insert_episodes(&listing.episodes)?;

            match listing.next_page {
                Some(next) => {
                    deepest_page = Some(next);
                    page = Some(next);
                }
                None => break,
            }
        }

        if let Some(deepest) = deepest_page {
            catalog.set_series_page_cursor(series.id, deepest)?;
        }

        info!(series = %series.name, added = added, "Ingested episodes");
        report.series += 1;
        report.episodes_added += added;
    }

    Ok(report)
}
