// SPDX-License-Identifier: MIT

//! `WorkerRecord` — the unit tracked by the state store registry.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current liveness status of a worker, as last observed.
///
/// Status is always refreshed from the OS/tmux before display; it is never
/// trusted as persisted truth (see `refresh_status` in `swarm-engine`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Running,
    Stopped,
    Unknown,
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The tmux session/window a worker runs under, when tmux-isolated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmuxTarget {
    pub session: String,
    pub window: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,
}

/// The isolated git worktree a worker runs in, when worktree-isolated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeInfo {
    pub path: PathBuf,
    pub branch: String,
    pub base_repo: PathBuf,
}

/// A supervised child: the record the State Store persists per worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub name: String,
    pub status: WorkerStatus,
    pub cmd: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub cwd: PathBuf,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmux: Option<TmuxTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree: Option<WorktreeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl WorkerRecord {
    /// True when this record carries a ralph-managed loop, per the
    /// `metadata["ralph"]` convention in spec.md §3.
    pub fn is_ralph(&self) -> bool {
        self.metadata.get("ralph").and_then(|v| v.as_bool()).unwrap_or(false)
    }

    /// `Err` describing the invariant violated, if any.
    ///
    /// Exactly one of `tmux`/`pid` must be set while `status == Running`;
    /// a worktree path must live strictly inside a worktree directory
    /// adjacent to its `base_repo`.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.status == WorkerStatus::Running && self.tmux.is_some() == self.pid.is_some() {
            return Err(format!(
                "worker {:?}: exactly one of tmux/pid must be set while running",
                self.name
            ));
        }
        if let Some(wt) = &self.worktree {
            let parent = wt.base_repo.parent().map(|p| {
                let name = wt.base_repo.file_name().and_then(|n| n.to_str()).unwrap_or("repo");
                p.join(format!("{name}-worktrees"))
            });
            let inside_sibling_dir =
                parent.as_ref().map(|p| wt.path.starts_with(p)).unwrap_or(false);
            if !inside_sibling_dir || wt.path == wt.base_repo {
                return Err(format!(
                    "worker {:?}: worktree path {:?} is not strictly inside a worktree dir adjacent to {:?}",
                    self.name, wt.path, wt.base_repo
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "worker_record_tests.rs"]
mod tests;
