//! 7-Zip subprocess extractor.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::ExtractorConfig;

use super::{ArchiveExtractor, ExtractError};

/// Extracts archives by shelling out to `7z x`.
pub struct SevenZipExtractor {
    config: ExtractorConfig,
}

impl SevenZipExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ArchiveExtractor for SevenZipExtractor {
    async fn extract(&self, archive: &Path, output_dir: &Path) -> Result<(), ExtractError> {
        // 7z takes the output directory glued to the switch, no space
        let output_switch = format!("-o{}", output_dir.to_string_lossy());

        debug!(archive = %archive.display(), "Extracting archive");

        let output = Command::new(&self.config.command)
            .arg("x")
            .arg(archive)
            .arg(&output_switch)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ExtractError::Spawn(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(ExtractError::Failed(stderr));
        }

        Ok(())
    }
}
