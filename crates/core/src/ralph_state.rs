// SPDX-License-Identifier: MIT

//! `RalphState` — per-worker autonomous-loop state.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a ralph loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RalphStatus {
    Running,
    Paused,
    Stopped,
    Failed,
    Done,
}

impl std::fmt::Display for RalphStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// Which signal the inactivity detector watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InactivityMode {
    Output,
    Ready,
    Both,
}

/// Why a ralph loop stopped, recorded for operator diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Done,
    MaxIterations,
    ConsecutiveFailures,
    Compaction,
    ContextThreshold,
    Sigterm,
    MonitorDisconnected,
    Killed,
}

/// Per-worker autonomous-loop state, persisted at `ralph/<name>/state.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RalphState {
    pub name: String,
    pub iteration: u32,
    pub max_iterations: u32,
    pub status: RalphStatus,
    pub prompt_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_pattern: Option<String>,
    pub inactivity_timeout_secs: u64,
    pub inactivity_mode: InactivityMode,
    pub check_done_continuous: bool,
    pub consecutive_failures: u32,
    pub total_failures: u32,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub last_iteration_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_screen_change_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub monitor_pid: Option<u32>,
    #[serde(default)]
    pub prompt_baseline_lines: usize,
    #[serde(default)]
    pub max_context: Option<u8>,
    #[serde(default)]
    pub context_nudge_sent: bool,
    #[serde(default)]
    pub exit_reason: Option<ExitReason>,
}

impl RalphState {
    /// Construct a fresh state for iteration 1, as `spawn(ralph=true)` does.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        max_iterations: u32,
        prompt_file: PathBuf,
        done_pattern: Option<String>,
        inactivity_timeout_secs: u64,
        inactivity_mode: InactivityMode,
        max_context: Option<u8>,
        now: DateTime<Utc>,
    ) -> Self {
        let check_done_continuous = done_pattern.is_some();
        Self {
            name: name.into(),
            iteration: 1,
            max_iterations,
            status: RalphStatus::Running,
            prompt_file,
            done_pattern,
            inactivity_timeout_secs,
            inactivity_mode,
            check_done_continuous,
            consecutive_failures: 0,
            total_failures: 0,
            started_at: now,
            last_iteration_at: None,
            last_screen_change_at: None,
            monitor_pid: None,
            prompt_baseline_lines: 0,
            max_context,
            context_nudge_sent: false,
            exit_reason: None,
        }
    }

    /// Exponential backoff in whole seconds after `n` consecutive failures,
    /// capped at 300s (spec.md §4.6 / §8 "Ralph backoff").
    pub fn backoff_secs(consecutive_failures: u32) -> u64 {
        if consecutive_failures == 0 {
            return 0;
        }
        let pow = consecutive_failures.saturating_sub(1).min(62);
        (1u64 << pow).min(300)
    }
}

#[cfg(test)]
#[path = "ralph_state_tests.rs"]
mod tests;
