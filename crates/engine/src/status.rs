// SPDX-License-Identifier: MIT

//! Ephemeral status refresh (spec.md §4.5): never persisted, recomputed
//! from the OS/tmux every time a caller needs a liveness answer.

use swarm_core::{WorkerRecord, WorkerStatus};
use swarm_tmux::Tmux;

use crate::process;

pub async fn refresh_status(record: &WorkerRecord, tmux: &Tmux) -> WorkerStatus {
    if let Some(target) = &record.tmux {
        let exists = tmux.window_exists(&target.session, &target.window).await.unwrap_or(false);
        return if exists { WorkerStatus::Running } else { WorkerStatus::Stopped };
    }
    if let Some(pid) = record.pid {
        return if process::is_alive(pid) { WorkerStatus::Running } else { WorkerStatus::Stopped };
    }
    WorkerStatus::Stopped
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
