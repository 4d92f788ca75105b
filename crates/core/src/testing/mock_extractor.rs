//! Mock archive extractor.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::extract::{ArchiveExtractor, ExtractError};

/// Records extraction requests instead of running 7z.
pub struct MockExtractor {
    extractions: Mutex<Vec<(PathBuf, PathBuf)>>,
    fail: AtomicBool,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            extractions: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make subsequent extractions fail.
    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// `(archive, output_dir)` pairs requested, in order.
    pub fn extractions(&self) -> Vec<(PathBuf, PathBuf)> {
        self.extractions.lock().unwrap().clone()
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveExtractor for MockExtractor {
    async fn extract(&self, archive: &Path, output_dir: &Path) -> Result<(), ExtractError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ExtractError::Failed("scripted failure".to_string()));
        }
        self.extractions
            .lock()
            .unwrap()
            .push((archive.to_path_buf(), output_dir.to_path_buf()));
        Ok(())
    }
}
