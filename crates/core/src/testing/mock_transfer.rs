//! Mock transfer client.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::transfer::{TransferClient, TransferError};

/// In-memory transfer client with scripted status output.
pub struct MockTransferClient {
    status_output: Mutex<String>,
    start_error: Mutex<Option<String>>,
    starts: Mutex<Vec<(PathBuf, PathBuf)>>,
    pauses: Mutex<Vec<PathBuf>>,
}

impl MockTransferClient {
    pub fn new() -> Self {
        Self {
            status_output: Mutex::new(String::new()),
            start_error: Mutex::new(None),
            starts: Mutex::new(Vec::new()),
            pauses: Mutex::new(Vec::new()),
        }
    }

    /// Raw text returned by the next `status` calls.
    pub fn set_status_output(&self, output: &str) {
        *self.status_output.lock().unwrap() = output.to_string();
    }

    /// Make the next `start` fail with this message.
    pub fn fail_next_start(&self, message: &str) {
        *self.start_error.lock().unwrap() = Some(message.to_string());
    }

    /// `(torrent_file, download_dir)` pairs started, in order.
    pub fn starts(&self) -> Vec<(PathBuf, PathBuf)> {
        self.starts.lock().unwrap().clone()
    }

    pub fn pauses(&self) -> Vec<PathBuf> {
        self.pauses.lock().unwrap().clone()
    }
}

impl Default for MockTransferClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferClient for MockTransferClient {
    async fn status(&self) -> Result<String, TransferError> {
        Ok(self.status_output.lock().unwrap().clone())
    }

    async fn start(&self, torrent_file: &Path, download_dir: &Path) -> Result<(), TransferError> {
        if let Some(message) = self.start_error.lock().unwrap().take() {
            return Err(TransferError::Client(message));
        }
        self.starts
            .lock()
            .unwrap()
            .push((torrent_file.to_path_buf(), download_dir.to_path_buf()));
        Ok(())
    }

    async fn pause(&self, torrent_file: &Path) -> Result<(), TransferError> {
        self.pauses.lock().unwrap().push(torrent_file.to_path_buf());
        Ok(())
    }
}
