//! Run outcome types.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// What happened to the remote copy of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemoteStatus {
    /// No remote sink is configured
    Disabled,
    /// Upload deliberately not attempted
    Skipped { reason: String },
    Uploaded { location: String },
    /// Upload attempted and failed; the local file is still in place
    Failed { error: String },
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteStatus::Disabled => write!(f, "disabled"),
            RemoteStatus::Skipped { reason } => write!(f, "skipped ({reason})"),
            RemoteStatus::Uploaded { location } => write!(f, "uploaded to {location}"),
            RemoteStatus::Failed { error } => write!(f, "failed ({error})"),
        }
    }
}

/// Result of the publish stage.
#[derive(Debug, Clone, Serialize)]
pub struct Publication {
    pub local_path: PathBuf,
    pub bytes: usize,
    pub remote: RemoteStatus,
}

/// Summary of a run that rebuilt the feed.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub checksum: String,
    pub talk_count: usize,
    pub skipped_links: usize,
    pub publication: Publication,
}

/// Terminal state of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Page content matched the stored checksum; nothing was rebuilt
    Unchanged { checksum: String },
    /// Another run held the lock; this one did nothing
    Locked { lock_path: PathBuf },
    Published(PublishReport),
}

impl RunOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, RunOutcome::Published(_))
    }
}
