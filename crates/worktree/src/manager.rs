// SPDX-License-Identifier: MIT

//! Worktree Manager: safe create/inspect/remove of per-worker git worktrees
//! (spec.md §4.2). Every removal is checked against the main working tree
//! first — deleting the clone a user actually works in is not recoverable
//! by anything downstream.

use std::path::Path;

use crate::error::WorktreeError;
use crate::git;

/// Create a new worktree at `path` on a fresh branch `branch`, based on the
/// current HEAD of `base_repo`.
pub fn create(path: &Path, branch: &str, base_repo: &Path) -> Result<(), WorktreeError> {
    if !git::is_inside_work_tree(base_repo) {
        return Err(WorktreeError::NotAGitRepo(base_repo.to_path_buf()));
    }
    if path.exists() {
        return Err(WorktreeError::PathExists(path.to_path_buf()));
    }

    let branches = git::run("branch", base_repo, &["branch", "--list", branch])?;
    if !branches.trim().is_empty() {
        return Err(WorktreeError::BranchExists(branch.to_string()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| WorktreeError::Io(parent.to_path_buf(), e))?;
    }

    let path_str = path.to_string_lossy().to_string();
    git::run("worktree add", base_repo, &["worktree", "add", "-b", branch, &path_str, "HEAD"])?;
    Ok(())
}

/// True if `path` has staged, unstaged, or untracked changes.
pub fn is_dirty(path: &Path) -> Result<bool, WorktreeError> {
    let status = git::run("status", path, &["status", "--porcelain"])?;
    Ok(!status.trim().is_empty())
}

/// Remove the worktree at `path`. Without `force`, refuses a dirty
/// worktree. Always refuses to remove the main working tree.
pub fn remove(path: &Path, force: bool) -> Result<(), WorktreeError> {
    if git::is_main_working_tree(path) {
        return Err(WorktreeError::RefusedToDeleteMain(path.to_path_buf()));
    }
    if !force && is_dirty(path)? {
        return Err(WorktreeError::Dirty(path.to_path_buf()));
    }

    let repo_root = git::repo_root_from_worktree(path).ok_or_else(|| WorktreeError::NotAGitRepo(path.to_path_buf()))?;
    let path_str = path.to_string_lossy().to_string();
    let mut args = vec!["worktree", "remove"];
    if force {
        args.push("--force");
    }
    args.push(&path_str);
    git::run("worktree remove", &repo_root, &args)?;

    if path.exists() {
        if let Err(e) = std::fs::remove_dir_all(path) {
            tracing::warn!(path = %path.display(), error = %e, "swarm: warning: worktree directory left behind after git worktree remove");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
