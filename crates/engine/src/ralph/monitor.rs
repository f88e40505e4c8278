// SPDX-License-Identifier: MIT

//! Inner monitor loop: polls one tmux pane at a fixed cadence and classifies
//! what it sees until a result terminates the current iteration.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use regex::Regex;
use swarm_core::InactivityMode;
use swarm_tmux::{readiness, Readiness, Tmux};

use crate::error::EngineError;
use crate::ralph::poll;

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
const PREFLIGHT_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    Done,
    Compaction,
    ContextThreshold,
    Exited(Option<i32>),
    Inactivity,
    PreflightStuck,
}

pub struct MonitorConfig {
    pub iteration: u32,
    pub baseline_lines: usize,
    pub done_pattern: Option<Regex>,
    pub check_done_continuous: bool,
    pub max_context: Option<u8>,
    pub inactivity_timeout: Duration,
    pub inactivity_mode: InactivityMode,
    pub poll_interval: Duration,
}

/// Watch `session:window` until one of the result cases in the handling
/// table fires. Mutates nothing in `RalphState`; the caller persists
/// `last_screen_change_at` / `context_nudge_sent` from the returned side
/// channel if it cares to.
pub async fn run_inner(tmux: &Tmux, session: &str, window: &str, cfg: MonitorConfig) -> Result<MonitorOutcome, EngineError> {
    let mut last_hash: Option<u64> = None;
    let mut last_change_at = Instant::now();
    let mut ready_since: Option<Instant> = None;
    let mut warned: HashSet<&'static str> = HashSet::new();
    let mut context_nudge_sent = false;
    let started_at = Instant::now();
    let mut last_text = String::new();
    let mut first_poll_stuck = false;
    let mut poll_count = 0u32;

    loop {
        if !tmux.window_exists(session, window).await? {
            if let Some(pattern) = &cfg.done_pattern {
                if poll::matches_done(&last_text, cfg.baseline_lines, pattern) {
                    return Ok(MonitorOutcome::Done);
                }
            }
            let exit_code = poll::parse_exit_sentinel(&last_text);
            return Ok(MonitorOutcome::Exited(exit_code));
        }

        let raw = tmux.capture_pane(session, window, 0).await?;
        let text = swarm_core::strip_ansi(&raw);
        last_text = text.clone();
        poll_count += 1;

        let hash = poll::hash_pane(&text);
        if last_hash != Some(hash) {
            last_hash = Some(hash);
            last_change_at = Instant::now();
        }

        if poll::matches_fatal(&text) {
            return Ok(MonitorOutcome::Compaction);
        }

        let stuck = poll::matched_stuck(&text);
        if poll_count == 1 && !stuck.is_empty() {
            first_poll_stuck = true;
        }
        for name in &stuck {
            if warned.insert(name) {
                tracing::warn!(pattern = name, iteration = cfg.iteration, "ralph monitor: stuck pattern visible");
            }
        }

        if cfg.check_done_continuous {
            if let Some(pattern) = &cfg.done_pattern {
                if poll::matches_done(&text, cfg.baseline_lines, pattern) {
                    return Ok(MonitorOutcome::Done);
                }
            }
        }

        if let Some(max_context) = cfg.max_context {
            if let Some(pct) = poll::context_percent(&text, 3) {
                if pct >= max_context.saturating_add(15) {
                    return Ok(MonitorOutcome::ContextThreshold);
                }
                if pct >= max_context && !context_nudge_sent {
                    tmux.send_keys(session, window, "context usage is high; please wrap up soon.", true, false).await?;
                    context_nudge_sent = true;
                }
            }
        }

        let ready_now = matches!(readiness::poll_pane(&text), Readiness::Ready);
        match cfg.inactivity_mode {
            InactivityMode::Output => {
                if last_change_at.elapsed() >= cfg.inactivity_timeout {
                    return Ok(MonitorOutcome::Inactivity);
                }
            }
            InactivityMode::Ready => {
                if ready_now {
                    let since = *ready_since.get_or_insert_with(Instant::now);
                    if since.elapsed() >= cfg.inactivity_timeout {
                        return Ok(MonitorOutcome::Inactivity);
                    }
                } else {
                    ready_since = None;
                }
            }
            InactivityMode::Both => {
                if last_change_at.elapsed() >= cfg.inactivity_timeout {
                    return Ok(MonitorOutcome::Inactivity);
                }
                if ready_now {
                    let since = *ready_since.get_or_insert_with(Instant::now);
                    if since.elapsed() >= cfg.inactivity_timeout {
                        return Ok(MonitorOutcome::Inactivity);
                    }
                } else {
                    ready_since = None;
                }
            }
        }

        if cfg.iteration == 1 && first_poll_stuck && started_at.elapsed() >= PREFLIGHT_WINDOW {
            return Ok(MonitorOutcome::PreflightStuck);
        }

        tokio::time::sleep(cfg.poll_interval).await;
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
