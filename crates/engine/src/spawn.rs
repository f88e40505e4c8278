// SPDX-License-Identifier: MIT

//! Spawn transactionality (spec.md §4.5): worktree create, then window or
//! process create, then registry add, as one logical unit. Any failure
//! rolls back every already-completed step so a failed spawn never leaves
//! a half-built worker visible.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use swarm_core::{TmuxTarget, WorkerRecord, WorkerStatus, WorktreeInfo};
use swarm_storage::StateStore;
use swarm_tmux::{readiness, Tmux};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::process;
use crate::shell_quote::build_command_line;

#[derive(Debug, Clone)]
pub struct WorktreeRequest {
    pub branch: String,
    pub base_repo: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub name: String,
    pub cmd: Vec<String>,
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
    pub tags: BTreeSet<String>,
    pub use_tmux: bool,
    pub worktree: Option<WorktreeRequest>,
    pub ready_wait: bool,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// One already-completed side effect, kept so a later failure can be
/// unwound in reverse order.
enum UndoStep {
    RemoveWorktree(PathBuf),
    KillWindow { session: String, window: String },
    KillProcess(u32),
}

async fn rollback(steps: Vec<UndoStep>, tmux: &Tmux) {
    for step in steps.into_iter().rev() {
        match step {
            UndoStep::RemoveWorktree(path) => {
                let _ = tokio::task::spawn_blocking(move || swarm_worktree::remove(&path, true)).await;
            }
            UndoStep::KillWindow { session, window } => {
                let _ = tmux.kill_window(&session, &window).await;
            }
            UndoStep::KillProcess(pid) => {
                let _ = process::kill_escalate(pid).await;
            }
        }
    }
}

pub async fn spawn(
    cfg: &EngineConfig,
    store: &StateStore,
    tmux: &Tmux,
    req: SpawnRequest,
) -> Result<WorkerRecord, EngineError> {
    if store.get(&req.name)?.is_some() {
        return Err(EngineError::Conflict(req.name));
    }

    let mut undo = Vec::new();
    let result = spawn_inner(cfg, tmux, &req, &mut undo).await;

    let (cwd, tmux_target, pid, worktree_info) = match result {
        Ok(v) => v,
        Err(e) => {
            rollback(undo, tmux).await;
            return Err(e);
        }
    };

    let record = WorkerRecord {
        name: req.name.clone(),
        status: WorkerStatus::Running,
        cmd: req.cmd,
        started_at: Utc::now(),
        cwd,
        env: req.env,
        tags: req.tags,
        tmux: tmux_target,
        worktree: worktree_info,
        pid,
        metadata: req.metadata,
    };

    if let Err(e) = record.check_invariants() {
        rollback(undo, tmux).await;
        return Err(EngineError::InvalidArgument(e));
    }

    if let Err(e) = store.add(record.clone()) {
        rollback(undo, tmux).await;
        return Err(e.into());
    }

    Ok(record)
}

#[allow(clippy::type_complexity)]
async fn spawn_inner(
    cfg: &EngineConfig,
    tmux: &Tmux,
    req: &SpawnRequest,
    undo: &mut Vec<UndoStep>,
) -> Result<(PathBuf, Option<TmuxTarget>, Option<u32>, Option<WorktreeInfo>), EngineError> {
    let (cwd, worktree_info) = match &req.worktree {
        Some(wt) => {
            let path = wt.base_repo.parent().map(|p| {
                let name = wt.base_repo.file_name().and_then(|n| n.to_str()).unwrap_or("repo");
                p.join(format!("{name}-worktrees")).join(&req.name)
            });
            let path = path.ok_or_else(|| EngineError::InvalidArgument("base_repo has no parent".to_string()))?;

            let branch = wt.branch.clone();
            let base_repo = wt.base_repo.clone();
            let create_path = path.clone();
            tokio::task::spawn_blocking(move || swarm_worktree::create(&create_path, &branch, &base_repo))
                .await
                .map_err(|e| EngineError::Process(e.to_string()))??;
            undo.push(UndoStep::RemoveWorktree(path.clone()));

            (path.clone(), Some(WorktreeInfo { path, branch: wt.branch.clone(), base_repo: wt.base_repo.clone() }))
        }
        None => (req.cwd.clone(), None),
    };

    if req.use_tmux {
        let session = cfg.default_session_name();
        let window = req.name.clone();
        tmux.ensure_session(&session).await?;
        tmux.create_window(&session, &window, &cwd.to_string_lossy()).await?;
        undo.push(UndoStep::KillWindow { session: session.clone(), window: window.clone() });

        let command_line = build_command_line(&req.cmd, &req.env);
        tmux.send_keys(&session, &window, &command_line, true, false).await?;

        if req.ready_wait {
            let outcome =
                readiness::wait_until_ready(tmux, &session, &window, Duration::from_secs(readiness::DEFAULT_TIMEOUT_SECS))
                    .await?;
            if outcome == readiness::Readiness::Timeout {
                return Err(EngineError::Process(format!("worker {:?} did not become ready in time", req.name)));
            }
        }

        Ok((cwd, Some(TmuxTarget { session, window, socket: cfg.tmux_socket.clone() }), None, worktree_info))
    } else {
        let logs_dir = cfg.logs_dir();
        tokio::fs::create_dir_all(&logs_dir).await.map_err(|e| EngineError::Process(e.to_string()))?;
        let stdout_path = logs_dir.join(format!("{}.stdout", req.name));
        let stderr_path = logs_dir.join(format!("{}.stderr", req.name));

        let pid = process::spawn_bare(&req.cmd, &cwd, &req.env, &stdout_path, &stderr_path).await?;
        undo.push(UndoStep::KillProcess(pid));

        Ok((cwd, None, Some(pid), worktree_info))
    }
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
