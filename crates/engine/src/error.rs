// SPDX-License-Identifier: MIT

use swarm_storage::StorageError;
use swarm_tmux::TmuxError;
use swarm_worktree::WorktreeError;
use thiserror::Error;

/// Errors from worker lifecycle operations and the ralph monitor loop.
///
/// Maps onto spec.md §7's error taxonomy; `Storage`/`Tmux`/`Worktree`
/// already carry their own kind from the crate that raised them.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("worker {0:?} not found")]
    NotFound(String),
    #[error("worker {0:?} already exists")]
    Conflict(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("process error: {0}")]
    Process(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Tmux(#[from] TmuxError),
    #[error(transparent)]
    Worktree(#[from] WorktreeError),
}

impl EngineError {
    /// True for the `NotFound` kind, which maps to exit code 2 for
    /// `status`/`peek` per spec.md §6.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }
}
