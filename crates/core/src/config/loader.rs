use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("EPISODARR_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[indexer]
host = "http://localhost:9117"
api_key = "key"
trackers = ["alpha", "beta"]
torrent_directory = "/srv/torrents"

[transfer]
command = "torrent-cli"
"#;

    #[test]
    fn test_load_config_from_str_minimal() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.indexer.trackers.len(), 2);
        assert_eq!(config.indexer.timeout_secs, 30);
        assert_eq!(config.database.path, PathBuf::from("episodarr.db"));
        assert!(config.metadata.is_none());
        assert_eq!(config.engine.transfer_cooldown_secs, 15);
        assert_eq!(config.extractor.command, "7z");
    }

    #[test]
    fn test_load_config_from_str_missing_indexer() {
        let result = load_config_from_str("[transfer]\ncommand = \"x\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_from_str_full() {
        let toml = r#"
[database]
path = "/var/lib/episodarr/catalog.db"

[metadata]
api_key = "tvdb-key"

[indexer]
host = "http://localhost:9117"
api_key = "key"
trackers = ["alpha"]
torrent_directory = "/srv/torrents"
timeout_secs = 10

[transfer]
command = "python3"
args = ["/opt/bit-torrent/torrent_cli.py"]

[engine]
shortened_searches = true
transfer_cooldown_secs = 5
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(
            config.metadata.unwrap().endpoint,
            "https://api.thetvdb.com"
        );
        assert_eq!(config.transfer.args.len(), 1);
        assert!(config.engine.shortened_searches);
        assert_eq!(config.engine.transfer_cooldown_secs, 5);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", MINIMAL).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.indexer.host, "http://localhost:9117");
    }
}
