use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Indexer and transfer sections exist (enforced by serde)
/// - URLs and commands are non-empty and plausible
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !config.indexer.host.starts_with("http://") && !config.indexer.host.starts_with("https://") {
        return Err(ConfigError::ValidationError(
            "indexer.host must be an http(s) URL".to_string(),
        ));
    }
    if config.indexer.api_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "indexer.api_key cannot be empty".to_string(),
        ));
    }
    if config.indexer.trackers.is_empty() {
        return Err(ConfigError::ValidationError(
            "indexer.trackers cannot be empty".to_string(),
        ));
    }
    if config.transfer.command.is_empty() {
        return Err(ConfigError::ValidationError(
            "transfer.command cannot be empty".to_string(),
        ));
    }
    if config.extractor.command.is_empty() {
        return Err(ConfigError::ValidationError(
            "extractor.command cannot be empty".to_string(),
        ));
    }

    if let Some(metadata) = &config.metadata {
        if !metadata.endpoint.starts_with("http://") && !metadata.endpoint.starts_with("https://") {
            return Err(ConfigError::ValidationError(
                "metadata.endpoint must be an http(s) URL".to_string(),
            ));
        }
        if metadata.api_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "metadata.api_key cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
