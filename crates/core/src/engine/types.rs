//! Engine report and error types.

use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::indexer::metainfo::MetainfoError;
use crate::indexer::IndexerError;
use crate::transfer::TransferError;

use super::selector::SelectorError;

/// Outcome of one acquisition pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct AcquisitionReport {
    /// Episodes that were pending when the pass started.
    pub pending: u32,
    /// Attempts recorded during the pass.
    pub started: u32,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ReconcileReport {
    /// Transfers the client reported.
    pub records: u32,
    /// Attempts newly marked complete.
    pub completed: u32,
}

/// Errors for engine passes.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Metainfo(#[from] MetainfoError),
}
