// SPDX-License-Identifier: MIT

//! Bare-process spawn, liveness probing, and kill escalation (spec.md
//! §4.5). Generalizes the teacher's process-control surface (nix already
//! used there for terminal control) to direct SIGTERM/SIGKILL escalation,
//! since a bare-spawned worker has no sidecar API to ask nicely.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::Command;

use crate::error::EngineError;

pub const KILL_GRACE: Duration = Duration::from_secs(5);

/// Spawn `cmd` with stdout/stderr redirected to `stdout_path`/`stderr_path`,
/// returning its PID. The child is never awaited — it outlives this
/// process, becoming a normal orphan once we exit.
pub async fn spawn_bare(
    cmd: &[String],
    cwd: &Path,
    env: &BTreeMap<String, String>,
    stdout_path: &Path,
    stderr_path: &Path,
) -> Result<u32, EngineError> {
    let Some((program, args)) = cmd.split_first() else {
        return Err(EngineError::InvalidArgument("cmd must not be empty".to_string()));
    };

    let stdout = File::create(stdout_path).map_err(|e| EngineError::Process(format!("{e}")))?;
    let stderr = File::create(stderr_path).map_err(|e| EngineError::Process(format!("{e}")))?;

    let mut command = Command::new(program);
    command.args(args).current_dir(cwd).envs(env).stdin(Stdio::null()).stdout(stdout).stderr(stderr);
    // New session group so the worker survives the launching terminal's
    // SIGHUP/SIGINT once `swarm spawn` returns.
    command.process_group(0);

    let child = command.spawn().map_err(|e| EngineError::Process(format!("failed to spawn {program:?}: {e}")))?;
    child.id().ok_or_else(|| EngineError::Process("spawned child has no PID".to_string()))
}

/// Zero-signal liveness probe: `true` iff the process still exists.
pub fn is_alive(pid: u32) -> bool {
    signal::kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// SIGTERM, then SIGKILL after `KILL_GRACE` if the process is still alive.
/// Already-dead processes are treated as a successful kill (idempotent).
pub async fn kill_escalate(pid: u32) -> Result<(), EngineError> {
    let target = Pid::from_raw(pid as i32);
    if signal::kill(target, Signal::SIGTERM).is_err() {
        return Ok(());
    }

    let deadline = tokio::time::Instant::now() + KILL_GRACE;
    while tokio::time::Instant::now() < deadline {
        if !is_alive(pid) {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    if is_alive(pid) {
        let _ = signal::kill(target, Signal::SIGKILL);
    }
    Ok(())
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
