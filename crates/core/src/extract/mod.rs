//! Archive extraction for completed transfers.

mod sevenzip;

pub use sevenzip::SevenZipExtractor;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Errors for archive extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to run extractor: {0}")]
    Spawn(String),

    #[error("Extraction failed: {0}")]
    Failed(String),
}

/// Trait for archive extractors.
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive` into `output_dir`.
    async fn extract(&self, archive: &Path, output_dir: &Path) -> Result<(), ExtractError>;
}
