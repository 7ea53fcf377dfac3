//! talkfeed CLI
//!
//! Local execution entry point. For AWS Lambda, use `talkfeed-lambda`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use talkfeed::{
    config::{load_config, load_or_default, resolve_environment},
    error::Result,
    models::{Config, Environment},
    pipeline::{self, PipelineContext},
    services::{HttpFetcher, PageSource, TalkExtractor},
};

/// talkfeed - Podcast feed builder for a talk archive
#[derive(Parser, Debug)]
#[command(
    name = "talkfeed",
    version,
    about = "Builds a podcast feed from an audio-talk listing page"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Environment table to apply (development, test, production)
    #[arg(short, long)]
    env: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline once
    Run,

    /// Run the pipeline on the configured interval until Ctrl-C
    Schedule {
        /// Override schedule.interval_secs
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Validate the merged configuration
    Validate,

    /// Fetch the listing and print the parsed talks as JSON without writing anything
    Extract,
}

impl Command {
    /// Commands that write the checksum or the feed.
    fn writes_files(&self) -> bool {
        matches!(self, Command::Run | Command::Schedule { .. })
    }
}

/// Pick the config for a command.
///
/// Only the read-only `extract` dry run may fall back to defaults; every other
/// command reports the load error.
fn resolve_config(
    loaded: Result<Config>,
    command: &Command,
    path: &Path,
    environment: Environment,
) -> Result<Config> {
    match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {} ({})", path.display(), environment);
            Ok(config)
        }
        Err(e) if command.writes_files() || matches!(command, Command::Validate) => {
            log::error!("Config load failed from {}: {}", path.display(), e);
            Err(e)
        }
        Err(_) => Ok(load_or_default(path, environment)),
    }
}

/// Initialize logging with the given default filter.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let environment = resolve_environment(cli.env.as_deref())?;

    // Read the config before logging starts so `logging.level` can apply
    let loaded = load_config(&cli.config, environment);
    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_logging(&level);

    let config = resolve_config(loaded, &cli.command, &cli.config, environment)?;

    match cli.command {
        Command::Run => {
            config.validate()?;
            let ctx = PipelineContext::from_config(config).await?;
            pipeline::run_and_report(&ctx).await?;
        }

        Command::Schedule { interval } => {
            config.validate()?;
            let mut schedule = config.schedule.clone();
            if let Some(secs) = interval.filter(|secs| *secs > 0) {
                schedule.interval_secs = secs;
            }

            let ctx = PipelineContext::from_config(config).await?;
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            pipeline::run_scheduled(ctx, &schedule, shutdown).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Listing URL: {}", config.source.listing_url()?);
            log::info!("✓ Feed URL: {}", config.feed.feed_url()?);
            log_remote(&config);

            log::info!("All validations passed!");
        }

        Command::Extract => {
            config.validate()?;
            let fetcher = HttpFetcher::new(&config.fetcher)?;
            let html = fetcher.fetch(config.source.listing_url()?.as_str()).await?;
            let extraction = TalkExtractor::new(&config.source)?.extract(&html);

            println!("{}", serde_json::to_string_pretty(&extraction)?);
        }
    }

    log::info!("Done!");

    Ok(())
}

fn log_remote(config: &Config) {
    if !config.remote.enabled {
        log::info!("✓ Remote upload disabled");
    } else if config.environment.is_production() {
        log::info!(
            "✓ Remote upload to s3://{}/{}",
            config.remote.bucket,
            config.remote.object_key(&config.feed.file_name().unwrap_or_default())
        );
    } else {
        log::warn!(
            "Remote upload is enabled but will be skipped in {}",
            config.environment
        );
    }
}
