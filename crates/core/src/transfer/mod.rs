//! Transfer client abstraction.
//!
//! Transfers are driven through an external command-line client: start,
//! pause, and a verbose status dump the engine parses to learn progress.

mod cli;
mod status;

pub use cli::CliTransferClient;
pub use status::{parse_status, StatusRecord};

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Errors for transfer client operations.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Failed to run transfer client: {0}")]
    Spawn(String),

    #[error("Transfer client error: {0}")]
    Client(String),
}

/// Trait for the transfer backend.
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Raw verbose status output for all known transfers.
    async fn status(&self) -> Result<String, TransferError>;

    /// Start transferring the given descriptor into the given directory.
    async fn start(&self, torrent_file: &Path, download_dir: &Path) -> Result<(), TransferError>;

    /// Pause the transfer for the given descriptor.
    async fn pause(&self, torrent_file: &Path) -> Result<(), TransferError>;
}
