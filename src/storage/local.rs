//! Local filesystem storage.
//!
//! Every write goes to its own temp file in the target directory, which is
//! then renamed over the target. Readers see either the old file or the new
//! one, and concurrent writers never share a temp file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{AppError, Result};

/// Ensure parent directory exists.
async fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Write bytes atomically (write to a unique temp file, then rename).
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    ensure_dir(path).await?;

    let path = path.to_path_buf();
    let bytes = bytes.to_vec();
    tokio::task::spawn_blocking(move || persist_new(&path, &bytes))
        .await
        .map_err(std::io::Error::other)?
}

fn persist_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read bytes, returning None if file doesn't exist.
pub async fn read_optional(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write the rendered feed, replacing any previous file.
pub async fn write_feed(path: &Path, bytes: &[u8]) -> Result<()> {
    write_atomic(path, bytes)
        .await
        .map_err(|e| AppError::local_write(path, e))?;
    log::info!("Saved podcast feed to {}", path.display());
    Ok(())
}

/// Single-value store for the checksum of the last processed page.
#[derive(Debug, Clone)]
pub struct ChecksumStore {
    path: PathBuf,
}

impl ChecksumStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored checksum; `None` before the first run.
    pub async fn load(&self) -> Result<Option<String>> {
        let bytes = read_optional(&self.path)
            .await
            .map_err(|e| AppError::checksum_io(&self.path, e))?;

        Ok(bytes
            .map(|b| String::from_utf8_lossy(&b).trim().to_string())
            .filter(|checksum| !checksum.is_empty()))
    }

    /// Replace the stored checksum.
    pub async fn save(&self, checksum: &str) -> Result<()> {
        write_atomic(&self.path, checksum.as_bytes())
            .await
            .map_err(|e| AppError::checksum_io(&self.path, e))?;
        log::info!("Checksum saved to {}", self.path.display());
        Ok(())
    }
}
