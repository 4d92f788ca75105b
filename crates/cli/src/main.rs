use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use episodarr_core::{
    catalog::EpisodeCatalog, ingest_episodes, load_config, metadata::MetadataProvider,
    validate_config, AcquisitionEngine, CliTransferClient, Config, JackettIndexer,
    SanitizedConfig, SevenZipExtractor, SqliteCatalog, TvdbClient,
};

const USAGE: &str = "\
Usage: episodarr [OPTIONS]

Options:
      --config <PATH>       Configuration file (default: config.toml)
      --add-series <NAME>   Search for a series by name and track it
      --add-series-id <ID>  Pick this id when the name search is ambiguous
      --add-eps             Pull new episodes for tracked series
      --series-ids <ID>...  Limit --add-eps / --download to these series
      --download            Search and start transfers for pending episodes
      --pause-transfer      Record attempts without starting transfers
      --status              Reconcile transfer status and unpack finished downloads
      --show-config         Print the loaded configuration (secrets redacted)
";

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    add_series: Option<String>,
    add_series_id: Option<i64>,
    add_eps: bool,
    series_ids: Option<Vec<i64>>,
    download: bool,
    pause_transfer: bool,
    status: bool,
    show_config: bool,
}

impl CliArgs {
    fn parse<I: Iterator<Item = String>>(args: I) -> Result<Self> {
        let mut args = args.peekable();
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let value = args.next().context("--config requires a path")?;
                    parsed.config = Some(PathBuf::from(value));
                }
                "--add-series" => {
                    let value = args.next().context("--add-series requires a name")?;
                    parsed.add_series = Some(value);
                }
                "--add-series-id" => {
                    let value = args.next().context("--add-series-id requires an id")?;
                    parsed.add_series_id =
                        Some(value.parse().context("--add-series-id must be numeric")?);
                }
                "--add-eps" => parsed.add_eps = true,
                "--series-ids" => {
                    let mut ids = Vec::new();
                    while let Some(value) = args.peek() {
                        if value.starts_with("--") {
                            break;
                        }
                        let value = args.next().unwrap();
                        ids.push(value.parse().context("--series-ids must be numeric")?);
                    }
                    if ids.is_empty() {
                        bail!("--series-ids requires at least one id");
                    }
                    parsed.series_ids = Some(ids);
                }
                "--download" => parsed.download = true,
                "--pause-transfer" => parsed.pause_transfer = true,
                "--status" => parsed.status = true,
                "--show-config" => parsed.show_config = true,
                "-h" | "--help" => return Ok(Self::default()),
                other => bail!("Unknown argument: {}", other),
            }
        }

        Ok(parsed)
    }

    fn has_action(&self) -> bool {
        self.add_series.is_some()
            || self.add_eps
            || self.download
            || self.status
            || self.show_config
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse(std::env::args().skip(1))?;
    if !args.has_action() {
        print!("{}", USAGE);
        return Ok(());
    }

    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var("EPISODARR_CONFIG").map(PathBuf::from).ok())
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    if args.show_config {
        let sanitized = SanitizedConfig::from(&config);
        println!("{}", serde_json::to_string_pretty(&sanitized)?);
    }

    let catalog: Arc<SqliteCatalog> = Arc::new(
        SqliteCatalog::new(&config.database.path).context("Failed to open catalog")?,
    );
    let series_ids = args.series_ids.as_deref();

    if args.add_series.is_some() || args.add_eps {
        let metadata_config = config
            .metadata
            .as_ref()
            .context("[metadata] section required for --add-series / --add-eps")?;
        let tvdb = TvdbClient::login(metadata_config)
            .await
            .context("Metadata provider login failed")?;

        if let Some(name) = &args.add_series {
            add_series(&tvdb, catalog.as_ref(), name, args.add_series_id).await?;
        }

        if args.add_eps {
            let report = ingest_episodes(&tvdb, catalog.as_ref(), series_ids)
                .await
                .context("Episode ingestion failed")?;
            info!(
                series = report.series,
                episodes = report.episodes_added,
                "Ingestion complete"
            );
        }
    }

    if args.download || args.status {
        let engine = build_engine(&config, catalog.clone())?;

        if args.download {
            let report = engine
                .acquire(series_ids, args.pause_transfer)
                .await
                .context("Acquisition pass failed")?;
            info!(
                pending = report.pending,
                started = report.started,
                "Acquisition pass complete"
            );
        }

        if args.status {
            let report = engine.reconcile().await.context("Reconcile pass failed")?;
            info!(
                records = report.records,
                completed = report.completed,
                "Reconcile pass complete"
            );
        }
    }

    Ok(())
}

fn build_engine(config: &Config, catalog: Arc<SqliteCatalog>) -> Result<AcquisitionEngine> {
    let indexer =
        JackettIndexer::new(config.indexer.clone()).context("Failed to create indexer")?;
    let transfer = CliTransferClient::new(config.transfer.clone());
    let extractor = SevenZipExtractor::new(config.extractor.clone());

    Ok(AcquisitionEngine::new(
        config.engine.clone(),
        catalog,
        Arc::new(indexer),
        Arc::new(transfer),
        Arc::new(extractor),
    ))
}

/// Resolve a series name and start tracking it.
///
/// An ambiguous name prints the candidates; the operator re-runs with
/// `--add-series-id` to pick one.
async fn add_series(
    provider: &dyn MetadataProvider,
    catalog: &dyn EpisodeCatalog,
    name: &str,
    picked_id: Option<i64>,
) -> Result<()> {
    let candidates = provider
        .search_series(name)
        .await
        .context("Series search failed")?;

    if candidates.is_empty() {
        info!(name = name, "No series found");
        return Ok(());
    }

    let candidate = match picked_id {
        Some(id) => candidates
            .iter()
            .find(|c| c.id == id)
            .with_context(|| format!("No search result has id {}", id))?,
        None if candidates.len() == 1 => &candidates[0],
        None => {
            println!("{:-<80}", "");
            for c in &candidates {
                let mut line = format!("ID: {}, name: \"{}\"", c.id, c.name);
                if let Some(network) = &c.network {
                    line.push_str(&format!(", network: \"{}\"", network));
                }
                if let Some(first_aired) = &c.first_aired {
                    line.push_str(&format!(", first aired: {}", first_aired));
                }
                println!("{}", line);
                println!("{:-<80}", "");
            }
            println!("Multiple matches; re-run with --add-series-id <ID> to pick one.");
            return Ok(());
        }
    };

    if catalog.get_series(candidate.id)?.is_some() {
        info!(id = candidate.id, "Series already tracked");
        return Ok(());
    }

    catalog.upsert_series(&candidate.to_series())?;
    info!(id = candidate.id, name = %candidate.name, "Series added");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs> {
        CliArgs::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_empty() {
        let args = parse(&[]).unwrap();
        assert!(!args.has_action());
    }

    #[test]
    fn test_parse_download_with_series_ids() {
        let args = parse(&["--series-ids", "7", "12", "--download", "--pause-transfer"]).unwrap();
        assert!(args.download);
        assert!(args.pause_transfer);
        assert_eq!(args.series_ids, Some(vec![7, 12]));
    }

    #[test]
    fn test_parse_add_series() {
        let args = parse(&["--add-series", "Some Show", "--add-series-id", "42"]).unwrap();
        assert_eq!(args.add_series.as_deref(), Some("Some Show"));
        assert_eq!(args.add_series_id, Some(42));
    }

    #[test]
    fn test_parse_unknown_flag() {
        assert!(parse(&["--bogus"]).is_err());
    }

    #[test]
    fn test_parse_series_ids_requires_values() {
        assert!(parse(&["--download", "--series-ids"]).is_err());
    }

    #[test]
    fn test_parse_non_numeric_series_id() {
        assert!(parse(&["--series-ids", "seven"]).is_err());
    }
}
