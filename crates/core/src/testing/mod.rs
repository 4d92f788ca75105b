//! Mock implementations of the collaborator traits, for tests.

pub mod fixtures;

mod mock_extractor;
mod mock_indexer;
mod mock_metadata;
mod mock_transfer;

pub use mock_extractor::MockExtractor;
pub use mock_indexer::MockIndexer;
pub use mock_metadata::MockMetadataProvider;
pub use mock_transfer::MockTransferClient;
