//! Storage for the checksum and the rendered feed.
//!
//! ```text
//! local disk
//! ├── data/checksum.txt          # checksum of the last processed page
//! ├── data/checksum.txt.lock     # held by the run in progress
//! └── data/output/<feed>.xml     # rendered feed, overwritten per change
//!
//! remote sink (production only)
//! └── {prefix}/<feed>.xml        # public-read, application/xml
//! ```

pub mod local;
pub mod lock;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RemoteConfig;

// Re-export for convenience
pub use local::{ChecksumStore, read_optional, write_atomic, write_feed};
pub use lock::RunLock;
#[cfg(feature = "s3")]
pub use s3::S3Sink;

/// Content type of the uploaded feed.
pub const FEED_CONTENT_TYPE: &str = "application/xml";

/// One object to upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub public_read: bool,
}

/// Remote object store that receives the published feed.
#[async_trait]
pub trait RemoteSink: Send + Sync {
    /// Store the object and return its location.
    async fn put_object(&self, upload: Upload) -> Result<String>;
}

/// Build the configured remote sink, if any.
#[cfg(feature = "s3")]
pub async fn remote_sink(config: &RemoteConfig) -> Option<Arc<dyn RemoteSink>> {
    if !config.enabled {
        return None;
    }
    Some(Arc::new(S3Sink::from_config(config).await))
}

/// Build the configured remote sink, if any.
///
/// This build has no S3 support, so an enabled remote is reported and ignored.
#[cfg(not(feature = "s3"))]
pub async fn remote_sink(config: &RemoteConfig) -> Option<Arc<dyn RemoteSink>> {
    if config.enabled {
        log::warn!(
            "remote.enabled is set but this build has no S3 support; bucket {} will not be used",
            config.bucket
        );
    }
    None
}
