use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Metadata provider credentials; series/episode ingestion is
    /// unavailable without them.
    #[serde(default)]
    pub metadata: Option<MetadataConfig>,
    pub indexer: IndexerConfig,
    pub transfer: TransferConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("episodarr.db")
}

/// TVDB metadata provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_metadata_endpoint() -> String {
    "https://api.thetvdb.com".to_string()
}

/// Jackett indexer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
    /// Jackett server URL (e.g., "http://localhost:9117")
    pub host: String,
    pub api_key: String,
    /// Tracker names to restrict the aggregate endpoint to.
    pub trackers: Vec<String>,
    /// Where .torrent descriptors and payloads land, one folder per series.
    pub torrent_directory: PathBuf,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Transfer client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferConfig {
    /// Executable to invoke.
    pub command: String,
    /// Arguments placed before the subcommand, e.g. a script path when the
    /// command is an interpreter.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Archive extractor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_extractor_command")]
    pub command: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            command: default_extractor_command(),
        }
    }
}

fn default_extractor_command() -> String {
    "7z".to_string()
}

/// Engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Also try a shortened series name when the full query finds nothing.
    #[serde(default)]
    pub shortened_searches: bool,
    /// Pause between started transfers (default: 15).
    #[serde(default = "default_cooldown")]
    pub transfer_cooldown_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shortened_searches: false,
            transfer_cooldown_secs: default_cooldown(),
        }
    }
}

fn default_cooldown() -> u64 {
    15
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub database: DatabaseConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SanitizedMetadataConfig>,
    pub indexer: SanitizedIndexerConfig,
    pub transfer: TransferConfig,
    pub extractor: ExtractorConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMetadataConfig {
    pub endpoint: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedIndexerConfig {
    pub host: String,
    pub api_key_configured: bool,
    pub trackers: Vec<String>,
    pub torrent_directory: PathBuf,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            database: config.database.clone(),
            metadata: config.metadata.as_ref().map(|m| SanitizedMetadataConfig {
                endpoint: m.endpoint.clone(),
                api_key_configured: !m.api_key.is_empty(),
                timeout_secs: m.timeout_secs,
            }),
            indexer: SanitizedIndexerConfig {
                host: config.indexer.host.clone(),
                api_key_configured: !config.indexer.api_key.is_empty(),
                trackers: config.indexer.trackers.clone(),
                torrent_directory: config.indexer.torrent_directory.clone(),
                timeout_secs: config.indexer.timeout_secs,
            },
            transfer: config.transfer.clone(),
            extractor: config.extractor.clone(),
            engine: config.engine.clone(),
        }
    }
}
