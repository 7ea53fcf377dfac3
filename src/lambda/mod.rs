// src/lambda/mod.rs

//! AWS Lambda handler for scheduled feed runs.
//!
//! Intended for an EventBridge schedule. Each invocation:
//! 1. Loads the bundled config for the `production` environment
//! 2. Applies environment overrides (bucket, prefix, writable paths)
//! 3. Runs the pipeline once and reports the outcome as JSON
//!
//! Only `/tmp` is writable in Lambda, so the checksum and output default
//! there. The checksum survives only while the execution environment is warm;
//! a cold start rebuilds the feed.

use std::path::PathBuf;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::load_config;
use crate::error::Result;
use crate::models::{Config, Environment, RunOutcome};
use crate::pipeline::{PipelineContext, run_and_report};

/// Config file bundled with the function.
const DEFAULT_CONFIG_PATH: &str = "data/config.toml";
const DEFAULT_CHECKSUM_PATH: &str = "/tmp/talkfeed/checksum.txt";
const DEFAULT_OUTPUT_DIR: &str = "/tmp/talkfeed/output";

/// Lambda invocation payload. EventBridge fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    /// Rebuild even when the listing is unchanged
    #[serde(default)]
    pub force: bool,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct RunResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RunOutcome>,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<RunRequest>,
) -> std::result::Result<RunResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, context) = event.into_parts();
    info!(request_id = %context.request_id, force = request.force, "Starting feed run");

    match run_once(&request).await {
        Ok(outcome) => {
            let execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                published = outcome.is_published(),
                execution_time_ms, "Feed run completed"
            );
            Ok(RunResponse {
                success: true,
                outcome: Some(outcome),
                error: None,
                execution_time_ms,
            })
        }
        Err(e) => {
            error!("Feed run failed: {}", e);
            Ok(RunResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

async fn run_once(request: &RunRequest) -> Result<RunOutcome> {
    let config = load_lambda_config()?;
    config.validate()?;

    if request.force {
        match tokio::fs::remove_file(&config.checksum.path).await {
            Ok(()) => info!("Forced run; cleared stored checksum"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(crate::error::AppError::checksum_io(&config.checksum.path, e)),
        }
    }

    let ctx = PipelineContext::from_config(config).await?;
    run_and_report(&ctx).await
}

/// Load the bundled config and apply the Lambda environment overrides.
fn load_lambda_config() -> Result<Config> {
    let path = std::env::var("TALKFEED_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut config = load_config(&PathBuf::from(&path), Environment::Production)?;
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Apply overrides from a variable lookup.
fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(bucket) = var("S3_BUCKET") {
        config.remote.enabled = true;
        config.remote.bucket = bucket;
    }
    if let Some(prefix) = var("S3_PREFIX") {
        config.remote.prefix = prefix;
    }
    if let Some(region) = var("AWS_REGION") {
        config.remote.region.get_or_insert(region);
    }

    config.checksum.path = var("CHECKSUM_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CHECKSUM_PATH));

    let file_name = config
        .feed
        .output_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "feed.xml".into());
    config.feed.output_path = var("OUTPUT_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR).join(file_name));
}
