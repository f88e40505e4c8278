// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the State Store and Ralph state file.
///
/// Per spec.md §7, corruption is *not* an error kind here — it is recovered
/// silently (rename + warning + empty registry) inside `load`. What remains
/// are genuine I/O failures and the `Conflict` case for duplicate names.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create state directory {0:?}: {1}")]
    CreateDir(PathBuf, #[source] std::io::Error),
    #[error("I/O error on {0:?}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to serialize state for {0:?}: {1}")]
    Serialize(PathBuf, #[source] serde_json::Error),
    #[error("failed to acquire lock on {0:?}: {1}")]
    LockFailed(PathBuf, #[source] std::io::Error),
    #[error("worker {0:?} already exists")]
    Conflict(String),
    #[error("worker {0:?} not found")]
    NotFound(String),
}
