//! Change detection for the listing page.
//!
//! The page is fingerprinted with SHA-256 and compared against the checksum
//! stored by the previous run. The fingerprint only tells snapshots apart;
//! it is not used for integrity.

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::storage::ChecksumStore;

/// Hex-encoded checksum of page content.
pub fn checksum(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Outcome of comparing a fetched page with the stored checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Checksum of the page just fetched
    pub checksum: String,
    /// Checksum stored by the previous run, if any
    pub previous: Option<String>,
}

impl Detection {
    /// Compare content against a previously stored checksum.
    pub fn evaluate(content: &[u8], previous: Option<String>) -> Self {
        Self {
            checksum: checksum(content),
            previous,
        }
    }

    /// First runs count as changed.
    pub fn has_changes(&self) -> bool {
        self.previous.as_deref() != Some(self.checksum.as_str())
    }

    pub fn is_first_run(&self) -> bool {
        self.previous.is_none()
    }
}

/// Reads and commits checksums through a [`ChecksumStore`].
#[derive(Debug, Clone)]
pub struct ChangeDetector<'a> {
    store: &'a ChecksumStore,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(store: &'a ChecksumStore) -> Self {
        Self { store }
    }

    /// Compare the fetched content with the stored checksum.
    pub async fn detect(&self, content: &str) -> Result<Detection> {
        let previous = self.store.load().await?;
        let detection = Detection::evaluate(content.as_bytes(), previous);

        if detection.is_first_run() {
            log::info!("No checksum exists; treating page as changed");
        } else if detection.has_changes() {
            log::info!(
                "Changes detected (old {}, new {})",
                detection.previous.as_deref().unwrap_or("-"),
                detection.checksum
            );
        } else {
            log::info!("Checksum unchanged ({})", detection.checksum);
        }
        Ok(detection)
    }

    /// Persist the new checksum. Unchanged detections write nothing.
    pub async fn commit(&self, detection: &Detection) -> Result<()> {
        if !detection.has_changes() {
            return Ok(());
        }
        self.store.save(&detection.checksum).await
    }
}
