// SPDX-License-Identifier: MIT

//! Worker lifecycle operations beyond spawn: status refresh, send/interrupt/
//! eof, logs/peek, kill, wait, clean, respawn (spec.md §4.5, §4.8).

use std::time::Duration;

use swarm_core::{WorkerRecord, WorkerStatus};
use swarm_storage::StateStore;
use swarm_tmux::Tmux;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::process;
use crate::spawn::{spawn, SpawnRequest, WorktreeRequest};
use crate::status::refresh_status;

/// Every worker, with status refreshed from tmux/OS rather than trusted
/// from disk.
pub async fn ls(store: &StateStore, tmux: &Tmux) -> Result<Vec<WorkerRecord>, EngineError> {
    let registry = store.snapshot()?;
    let mut out = Vec::new();
    for record in registry.iter() {
        let mut record = record.clone();
        record.status = refresh_status(&record, tmux).await;
        out.push(record);
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

async fn require_record(store: &StateStore, tmux: &Tmux, name: &str) -> Result<WorkerRecord, EngineError> {
    let mut record = store.get(name)?.ok_or_else(|| EngineError::NotFound(name.to_string()))?;
    record.status = refresh_status(&record, tmux).await;
    Ok(record)
}

pub async fn worker_status(store: &StateStore, tmux: &Tmux, name: &str) -> Result<WorkerRecord, EngineError> {
    require_record(store, tmux, name).await
}

fn require_tmux_target(record: &WorkerRecord) -> Result<&swarm_core::TmuxTarget, EngineError> {
    record.tmux.as_ref().ok_or_else(|| {
        EngineError::InvalidArgument(format!("worker {:?} is not multiplexer-backed", record.name))
    })
}

/// Send literal text, clearing any in-progress input line first.
pub async fn send(store: &StateStore, tmux: &Tmux, name: &str, text: &str, append_enter: bool) -> Result<(), EngineError> {
    let record = require_record(store, tmux, name).await?;
    let target = require_tmux_target(&record)?;
    tmux.send_keys(&target.session, &target.window, text, append_enter, true).await?;
    Ok(())
}

pub async fn interrupt(store: &StateStore, tmux: &Tmux, name: &str) -> Result<(), EngineError> {
    let record = require_record(store, tmux, name).await?;
    let target = require_tmux_target(&record)?;
    tmux.send_control_key(&target.session, &target.window, "C-c").await?;
    Ok(())
}

pub async fn eof(store: &StateStore, tmux: &Tmux, name: &str) -> Result<(), EngineError> {
    let record = require_record(store, tmux, name).await?;
    let target = require_tmux_target(&record)?;
    tmux.send_control_key(&target.session, &target.window, "C-d").await?;
    Ok(())
}

/// A one-shot snapshot of a worker's current pane, for `peek`.
pub async fn peek(store: &StateStore, tmux: &Tmux, name: &str, history_lines: u32) -> Result<String, EngineError> {
    let record = require_record(store, tmux, name).await?;
    let target = require_tmux_target(&record)?;
    let raw = tmux.capture_pane(&target.session, &target.window, history_lines).await?;
    Ok(swarm_core::strip_ansi(&raw))
}

/// Contents of a bare process's redirected stdout/stderr, for `logs` on
/// non-multiplexer workers.
pub async fn logs(cfg: &EngineConfig, store: &StateStore, name: &str) -> Result<(String, String), EngineError> {
    store.get(name)?.ok_or_else(|| EngineError::NotFound(name.to_string()))?;
    let dir = cfg.logs_dir();
    let stdout = tokio::fs::read_to_string(dir.join(format!("{name}.stdout"))).await.unwrap_or_default();
    let stderr = tokio::fs::read_to_string(dir.join(format!("{name}.stderr"))).await.unwrap_or_default();
    Ok((stdout, stderr))
}

/// Kill escalation (spec.md §4.5): SIGTERM→SIGKILL for bare processes, or
/// kill the window (and the session, if now empty) for multiplexer
/// workers. Does not remove the registry record — that's `clean`'s job.
pub async fn kill(store: &StateStore, tmux: &Tmux, name: &str) -> Result<(), EngineError> {
    let record = store.get(name)?.ok_or_else(|| EngineError::NotFound(name.to_string()))?;
    match (&record.tmux, record.pid) {
        (Some(target), _) => {
            tmux.kill_window(&target.session, &target.window).await?;
            let registry = store.snapshot()?;
            if !tmux.session_has_other_workers(&target.session, &target.window, registry.iter()) {
                tmux.kill_session(&target.session).await?;
            }
        }
        (None, Some(pid)) => process::kill_escalate(pid).await?,
        (None, None) => {}
    }
    store.update(name, |r| r.status = WorkerStatus::Stopped)?;
    Ok(())
}

/// Poll until a worker reports stopped, or `timeout` elapses.
pub async fn wait(store: &StateStore, tmux: &Tmux, name: &str, timeout: Duration, poll_interval: Duration) -> Result<WorkerStatus, EngineError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let record = require_record(store, tmux, name).await?;
        if record.status != WorkerStatus::Running {
            return Ok(record.status);
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(record.status);
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Requires status=stopped. Removes the worktree (forcibly) and the
/// registry record plus its log files.
pub async fn clean(cfg: &EngineConfig, store: &StateStore, tmux: &Tmux, name: &str) -> Result<(), EngineError> {
    let record = require_record(store, tmux, name).await?;
    if record.status == WorkerStatus::Running {
        return Err(EngineError::Conflict(format!("worker {name:?} is still running; kill it first")));
    }
    if let Some(wt) = &record.worktree {
        let path = wt.path.clone();
        tokio::task::spawn_blocking(move || swarm_worktree::remove(&path, true))
            .await
            .map_err(|e| EngineError::Process(e.to_string()))??;
    }
    store.remove(name)?;
    let dir = cfg.logs_dir();
    let _ = tokio::fs::remove_file(dir.join(format!("{name}.stdout"))).await;
    let _ = tokio::fs::remove_file(dir.join(format!("{name}.stderr"))).await;
    Ok(())
}

/// Spawns a worker again with its saved cmd/cwd/env/tags/isolation mode and
/// metadata, optionally cleaning its worktree first. The name must already
/// be free (the caller is expected to `kill` + `clean` first, or pass
/// `--replace` semantics at the CLI layer).
pub async fn respawn(cfg: &EngineConfig, store: &StateStore, tmux: &Tmux, name: &str) -> Result<WorkerRecord, EngineError> {
    let record = store.get(name)?.ok_or_else(|| EngineError::NotFound(name.to_string()))?;
    let worktree = record.worktree.as_ref().map(|wt| WorktreeRequest { branch: wt.branch.clone(), base_repo: wt.base_repo.clone() });
    if let Some(wt) = &record.worktree {
        let path = wt.path.clone();
        tokio::task::spawn_blocking(move || swarm_worktree::remove(&path, true))
            .await
            .map_err(|e| EngineError::Process(e.to_string()))??;
    }
    store.remove(name)?;

    let req = SpawnRequest {
        name: record.name.clone(),
        cmd: record.cmd.clone(),
        cwd: record.cwd.clone(),
        env: record.env.clone(),
        tags: record.tags.clone(),
        use_tmux: record.tmux.is_some(),
        worktree,
        ready_wait: false,
        metadata: record.metadata.clone(),
    };
    spawn(cfg, store, tmux, req).await
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
