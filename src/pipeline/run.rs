// src/pipeline/run.rs

//! One end-to-end run: fetch, detect, extract, render, publish.

use std::sync::Arc;
use std::time::Instant;

use crate::error::Result;
use crate::models::{
    CommitPolicy, Config, FeedContext, PublishReport, RenderOptions, RunOutcome,
};
use crate::services::{FeedTemplate, HttpFetcher, PageSource, TalkExtractor, render};
use crate::storage::{ChecksumStore, RemoteSink, RunLock, remote_sink};
use crate::utils::progress;

use super::detect::ChangeDetector;
use super::publish::Publisher;

const TOTAL_STEPS: usize = 5;

/// Everything a run needs. Cheap to clone; shared between scheduled runs.
#[derive(Clone)]
pub struct PipelineContext {
    pub config: Arc<Config>,
    pub source: Arc<dyn PageSource>,
    pub sink: Option<Arc<dyn RemoteSink>>,
}

impl PipelineContext {
    pub fn new(
        config: Arc<Config>,
        source: Arc<dyn PageSource>,
        sink: Option<Arc<dyn RemoteSink>>,
    ) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    /// Build the HTTP fetcher and the configured remote sink.
    pub async fn from_config(config: Config) -> Result<Self> {
        let source = Arc::new(HttpFetcher::new(&config.fetcher)?);
        let sink = remote_sink(&config.remote).await;
        Ok(Self::new(Arc::new(config), source, sink))
    }
}

/// Run the pipeline once.
///
/// Returns [`RunOutcome::Unchanged`] when the listing matches the stored
/// checksum, and [`RunOutcome::Locked`] when another run (in this or another
/// process) is in progress. Nothing is written in either case.
pub async fn run_pipeline(ctx: &PipelineContext) -> Result<RunOutcome> {
    let config = &ctx.config;
    let lock_path = RunLock::path_for(&config.checksum.path);
    let Some(_lock) = RunLock::try_acquire(&lock_path)? else {
        log::warn!(
            "Another run holds {}; skipping this run",
            lock_path.display()
        );
        return Ok(RunOutcome::Locked { lock_path });
    };

    progress::header(&format!("Feed run ({})", config.environment));

    progress::step(1, TOTAL_STEPS, "Fetch - Requesting listing page");
    let url = config.source.listing_url()?;
    let html = ctx.source.fetch(url.as_str()).await?;

    progress::step(2, TOTAL_STEPS, "Detect - Comparing checksum");
    let store = ChecksumStore::new(&config.checksum.path);
    let detector = ChangeDetector::new(&store);
    let detection = detector.detect(&html).await?;
    if !detection.has_changes() {
        return Ok(RunOutcome::Unchanged {
            checksum: detection.checksum,
        });
    }
    if config.checksum.commit == CommitPolicy::OnChange {
        detector.commit(&detection).await?;
    }

    progress::step(3, TOTAL_STEPS, "Extract - Parsing talk links");
    let extraction = TalkExtractor::new(&config.source)?.extract(&html);
    let talk_count = extraction.len();
    let skipped_links = extraction.skipped;

    progress::step(4, TOTAL_STEPS, "Render - Building feed document");
    let template = FeedTemplate::load(&config.feed.template_path).await?;
    let context = FeedContext::new(
        config.feed.feed_url()?,
        extraction.talks,
        RenderOptions {
            pretty: config.feed.pretty,
        },
    );
    let bytes = render(context, &template)?;

    progress::step(5, TOTAL_STEPS, "Publish - Writing feed");
    let publisher = Publisher::new(config, ctx.sink.clone())?;
    let publication = publisher.publish(bytes).await?;
    if config.checksum.commit == CommitPolicy::AfterPublish {
        detector.commit(&detection).await?;
    }

    Ok(RunOutcome::Published(PublishReport {
        checksum: detection.checksum,
        talk_count,
        skipped_links,
        publication,
    }))
}

/// Run once and log the outcome or the error. Errors are returned unchanged.
pub async fn run_and_report(ctx: &PipelineContext) -> Result<RunOutcome> {
    let start = Instant::now();
    let result = run_pipeline(ctx).await;
    let elapsed = format!("{:.2}s", start.elapsed().as_secs_f64());

    match &result {
        Ok(RunOutcome::Unchanged { checksum }) => progress::summary(
            "No changes",
            &[("checksum", checksum.clone()), ("elapsed", elapsed)],
        ),
        Ok(RunOutcome::Locked { lock_path }) => progress::summary(
            "Skipped",
            &[
                ("reason", format!("{} is held", lock_path.display())),
                ("elapsed", elapsed),
            ],
        ),
        Ok(RunOutcome::Published(report)) => progress::summary(
            "Feed published",
            &[
                ("talks", report.talk_count.to_string()),
                ("skipped links", report.skipped_links.to_string()),
                ("output", report.publication.local_path.display().to_string()),
                ("remote", report.publication.remote.to_string()),
                ("checksum", report.checksum.clone()),
                ("elapsed", elapsed),
            ],
        ),
        Err(e) => log::error!("Run failed after {}: {}", elapsed, e),
    }
    result
}
