pub mod catalog;
pub mod config;
pub mod engine;
pub mod extract;
pub mod indexer;
pub mod metadata;
pub mod testing;
pub mod transfer;

pub use catalog::{EpisodeCatalog, SqliteCatalog};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use engine::{AcquisitionEngine, AcquisitionReport, ReconcileReport};
pub use extract::{ArchiveExtractor, SevenZipExtractor};
pub use indexer::{Indexer, JackettIndexer};
pub use metadata::{ingest_episodes, MetadataProvider, TvdbClient};
pub use transfer::{CliTransferClient, TransferClient};
