// SPDX-License-Identifier: MIT

//! Sibling-file advisory locking, modeled on the teacher's
//! `fs2::FileExt::try_lock_exclusive` startup-lock idiom, but blocking:
//! spec.md §5 requires the state lock to block indefinitely under
//! contention rather than fail fast.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::StorageError;

/// Holds an exclusive lock on `<target>.lock` for as long as it lives.
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

/// Derive the sibling lock path for a given target file, e.g.
/// `state.json` -> `state.json.lock`.
pub fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    target.with_file_name(name)
}

/// Acquire the exclusive lock for `target`, blocking until it is free.
///
/// Uses `OpenOptions::create(true).truncate(false)` so the lock file's
/// contents (unused here, but harmless) are never clobbered before the
/// lock is held.
pub fn acquire(target: &Path) -> Result<LockGuard, StorageError> {
    let lock_path = lock_path_for(target);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| StorageError::LockFailed(lock_path.clone(), e))?;
    file.lock_exclusive().map_err(|e| StorageError::LockFailed(lock_path.clone(), e))?;
    Ok(LockGuard { file, path: lock_path })
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
