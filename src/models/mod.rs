// src/models/mod.rs

//! Domain models for the feed builder.

mod config;
mod feed;
mod outcome;
mod talk;

// Re-export all public types
pub use config::{
    ChecksumConfig, CommitPolicy, Config, Environment, FeedConfig, FetcherConfig, LoggingConfig,
    RemoteConfig, ScheduleConfig, SourceConfig,
};
pub use feed::{FeedContext, RenderOptions};
pub use outcome::{Publication, PublishReport, RemoteStatus, RunOutcome};
pub use talk::{Extraction, TalkRecord};
