// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the Worktree Manager (spec.md §4.2/§7 `GitError`).
#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("{0:?} is not inside a git checkout")]
    NotAGitRepo(PathBuf),
    #[error("branch {0:?} already exists")]
    BranchExists(String),
    #[error("path {0:?} already exists")]
    PathExists(PathBuf),
    #[error("worktree {0:?} has uncommitted changes; pass force to discard")]
    Dirty(PathBuf),
    #[error("refusing to remove {0:?}: it is the main working tree")]
    RefusedToDeleteMain(PathBuf),
    #[error("git {0} failed: {1}")]
    GitFailed(&'static str, String),
    #[error("I/O error on {0:?}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}
