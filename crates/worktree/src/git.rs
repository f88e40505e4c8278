// SPDX-License-Identifier: MIT

//! Thin synchronous `git` subprocess wrapper, modeled on the teacher's
//! `git -C <repo> worktree add/remove` invocations in
//! `crates/engine/src/workspace.rs`, scaled down to the blocking call style
//! the spawn transaction (§4.5) needs.

use std::path::Path;
use std::process::Command;

use crate::error::WorktreeError;

pub fn run(label: &'static str, repo: &Path, args: &[&str]) -> Result<String, WorktreeError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .output()
        .map_err(|e| WorktreeError::Io(repo.to_path_buf(), e))?;

    if !output.status.success() {
        return Err(WorktreeError::GitFailed(label, String::from_utf8_lossy(&output.stderr).trim().to_string()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

pub fn is_inside_work_tree(repo: &Path) -> bool {
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["rev-parse", "--is-inside-work-tree"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Resolve the parent repository root from an auxiliary worktree's `.git`
/// gitdir file, e.g. `gitdir: /repo/.git/worktrees/w1` -> `/repo`.
pub fn repo_root_from_worktree(worktree_path: &Path) -> Option<std::path::PathBuf> {
    let dot_git = worktree_path.join(".git");
    let contents = std::fs::read_to_string(dot_git).ok()?;
    let gitdir = contents.trim().strip_prefix("gitdir: ")?;
    let gitdir_path = Path::new(gitdir);
    gitdir_path.parent()?.parent()?.parent().map(Path::to_path_buf)
}

/// True if `path/.git` is a plain directory (the main working tree) rather
/// than a gitdir-file (an auxiliary worktree).
pub fn is_main_working_tree(path: &Path) -> bool {
    path.join(".git").is_dir()
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
