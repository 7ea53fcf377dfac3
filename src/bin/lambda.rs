//! AWS Lambda entry point for the feed builder.
//!
//! Deploy with `cargo lambda build --release --features lambda` and attach an
//! EventBridge schedule.

use lambda_runtime::{Error as LambdaError, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use talkfeed::lambda::handler;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    // `init` also bridges `log` records from the library into tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("talkfeed Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}
