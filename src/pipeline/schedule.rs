// src/pipeline/schedule.rs

//! In-process interval trigger.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::error::Result;
use crate::models::{RunOutcome, ScheduleConfig};

use super::guard::RunGuard;
use super::run::{PipelineContext, run_and_report};

/// Spawn one run unless another is still in progress.
///
/// The permit moves into the task, so the guard is released when the run
/// ends even if it fails.
pub fn trigger(
    ctx: &PipelineContext,
    guard: &RunGuard,
) -> Option<JoinHandle<Result<RunOutcome>>> {
    let Some(permit) = guard.try_acquire() else {
        log::warn!("Previous run still in progress; skipping this trigger");
        return None;
    };

    let ctx = ctx.clone();
    Some(tokio::spawn(async move {
        let _permit = permit;
        run_and_report(&ctx).await
    }))
}

/// Trigger runs on a fixed interval until `shutdown` resolves.
///
/// Run failures are logged by the run itself and never stop the loop. On
/// shutdown the run in progress, if any, is awaited before returning.
pub async fn run_scheduled<F>(
    ctx: PipelineContext,
    schedule: &ScheduleConfig,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let period = Duration::from_secs(schedule.interval_secs);
    let guard = RunGuard::new();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    if !schedule.run_immediately {
        // The first tick completes immediately
        ticker.tick().await;
    }

    log::info!("Scheduler started; running every {}s", period.as_secs());
    tokio::pin!(shutdown);
    let mut current: Option<JoinHandle<Result<RunOutcome>>> = None;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Shutdown requested; stopping scheduler");
                break;
            }
            _ = ticker.tick() => {
                if let Some(handle) = trigger(&ctx, &guard) {
                    current = Some(handle);
                }
            }
        }
    }

    if let Some(handle) = current.filter(|handle| !handle.is_finished()) {
        log::info!("Waiting for the run in progress to finish");
        if let Err(e) = handle.await {
            log::error!("Run task failed: {}", e);
        }
    }
    Ok(())
}
