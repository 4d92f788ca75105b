//! Transfer client backed by an external command-line tool.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::TransferConfig;

use super::{TransferClient, TransferError};

/// Drives transfers through a subprocess, one invocation per operation.
///
/// The client signals failure through stderr rather than its exit code, so
/// any stderr output from a mutating command is treated as an error.
pub struct CliTransferClient {
    config: TransferConfig,
}

impl CliTransferClient {
    pub fn new(config: TransferConfig) -> Self {
        Self { config }
    }

    async fn run(&self, args: &[&str]) -> Result<(String, String), TransferError> {
        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.args)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(command = %self.config.command, args = ?args, "Running transfer client");

        let output = command
            .output()
            .await
            .map_err(|e| TransferError::Spawn(e.to_string()))?;

        Ok((
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}

#[async_trait]
impl TransferClient for CliTransferClient {
    async fn status(&self) -> Result<String, TransferError> {
        let (stdout, _stderr) = self.run(&["status", "-v"]).await?;
        Ok(stdout)
    }

    async fn start(&self, torrent_file: &Path, download_dir: &Path) -> Result<(), TransferError> {
        let file = torrent_file.to_string_lossy();
        let dir = download_dir.to_string_lossy();
        let (_stdout, stderr) = self.run(&["add", &file, "-d", &dir]).await?;
        if !stderr.is_empty() {
            return Err(TransferError::Client(stderr));
        }
        Ok(())
    }

    async fn pause(&self, torrent_file: &Path) -> Result<(), TransferError> {
        let file = torrent_file.to_string_lossy();
        let (_stdout, stderr) = self.run(&["pause", &file]).await?;
        if !stderr.is_empty() {
            return Err(TransferError::Client(stderr));
        }
        Ok(())
    }
}
