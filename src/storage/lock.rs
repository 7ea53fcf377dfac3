//! Cross-process run lock.
//!
//! A run holds an exclusive advisory lock on `<checksum>.lock` for its whole
//! duration, so two processes started by cron never touch the checksum or the
//! feed file at the same time. The OS drops the lock if the process dies.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::error::{AppError, Result};

/// Exclusive lock held for the duration of a run.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Lock file path used for a given checksum file.
    pub fn path_for(checksum_path: &Path) -> PathBuf {
        let mut name = checksum_path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        checksum_path.with_file_name(name)
    }

    /// Take the lock, or `None` if another run holds it.
    pub fn try_acquire(path: impl Into<PathBuf>) -> Result<Option<Self>> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| AppError::checksum_io(&path, e))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| AppError::checksum_io(&path, e))?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(true) => Ok(Some(Self { file, path })),
            Ok(false) => Ok(None),
            Err(e) => Err(AppError::checksum_io(&path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("Failed to release {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_path_for_checksum() {
        assert_eq!(
            RunLock::path_for(Path::new("data/checksum.txt")),
            PathBuf::from("data/checksum.txt.lock")
        );
    }

    #[test]
    fn test_second_holder_is_refused() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state").join("checksum.txt.lock");

        let first = RunLock::try_acquire(&path).unwrap();
        assert!(first.is_some());
        assert!(RunLock::try_acquire(&path).unwrap().is_none());

        drop(first);
        assert!(RunLock::try_acquire(&path).unwrap().is_some());
    }
}
