// src/utils/progress.rs

//! Run progress reporting on top of the `log` facade.
//!
//! Keeps the stage banners consistent between the CLI, the scheduler and
//! the Lambda handler.

use log::info;

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    info!("{border}");
    info!("  {title}");
    info!("{border}");
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    info!("[STEP {step_num}/{total}] {message}");
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    info!("[SUMMARY] {title}");
    for (key, value) in items {
        info!("    {key}: {value}");
    }
}
