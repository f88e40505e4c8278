// SPDX-License-Identifier: MIT

//! Ralph control surface: pause/resume/status/list/clean/stop, operated
//! from any process against the same `RalphStore`/`IterationLog` the
//! outer loop writes (spec.md §4.6 "pause/resume").

use chrono::Utc;
use swarm_core::{IterationEvent, IterationEventKind, RalphState, RalphStatus};
use swarm_storage::{IterationLog, RalphStore};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::process;

fn require_state(ralph_store: &RalphStore, name: &str) -> Result<RalphState, EngineError> {
    ralph_store.load().ok_or_else(|| EngineError::NotFound(name.to_string()))
}

/// Stop starting new iterations once the current one completes. Uses
/// `mutate` so this read-modify-write is serialized against the outer
/// loop's own per-iteration write instead of racing it.
pub fn pause(name: &str, ralph_store: &RalphStore, log: &IterationLog) -> Result<RalphState, EngineError> {
    let existing = require_state(ralph_store, name)?;
    let state = ralph_store.mutate(
        || existing.clone(),
        |s| {
            if s.status == RalphStatus::Running {
                s.status = RalphStatus::Paused;
            }
        },
    )?;
    log.append(&IterationEvent::new(Utc::now(), IterationEventKind::Pause, state.iteration, Some("paused by operator")))?;
    Ok(state)
}

pub fn resume(name: &str, ralph_store: &RalphStore) -> Result<RalphState, EngineError> {
    let existing = require_state(ralph_store, name)?;
    let state = ralph_store.mutate(
        || existing.clone(),
        |s| {
            if s.status == RalphStatus::Paused {
                s.status = RalphStatus::Running;
            }
        },
    )?;
    Ok(state)
}

pub fn status(name: &str, ralph_store: &RalphStore) -> Result<RalphState, EngineError> {
    require_state(ralph_store, name)
}

/// Every ralph worker with persisted state under `<state_dir>/ralph/`.
pub fn list(cfg: &EngineConfig) -> Result<Vec<RalphState>, EngineError> {
    let root = cfg.state_dir.join("ralph");
    let mut out = Vec::new();
    let entries = match std::fs::read_dir(&root) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(EngineError::Process(format!("reading {}: {e}", root.display()))),
    };
    for entry in entries {
        let entry = entry.map_err(|e| EngineError::Process(e.to_string()))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let store = RalphStore::open(&cfg.state_dir, &name)?;
        if let Some(state) = store.load() {
            out.push(state);
        }
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

/// Set status=stopped and, if a detached monitor process is recorded, kill it.
pub async fn stop(name: &str, ralph_store: &RalphStore, log: &IterationLog) -> Result<RalphState, EngineError> {
    let existing = require_state(ralph_store, name)?;
    let state = ralph_store.mutate(
        || existing.clone(),
        |s| {
            s.status = RalphStatus::Stopped;
            s.exit_reason = Some(swarm_core::ExitReason::Killed);
        },
    )?;
    log.append(&IterationEvent::new(Utc::now(), IterationEventKind::Pause, state.iteration, Some("stopped by operator")))?;
    if let Some(pid) = state.monitor_pid {
        process::kill_escalate(pid).await?;
    }
    Ok(state)
}

/// Remove a ralph worker's persisted state and iteration log entirely.
pub fn clean(ralph_store: &RalphStore) -> Result<(), EngineError> {
    ralph_store.clean()?;
    Ok(())
}

pub fn logs(log: &IterationLog, tail_lines: Option<usize>) -> Result<String, EngineError> {
    match tail_lines {
        Some(n) => Ok(log.tail(n)?.join("\n")),
        None => Ok(log.read_all()?),
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
