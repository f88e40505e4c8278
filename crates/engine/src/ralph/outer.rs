// SPDX-License-Identifier: MIT

//! Outer ralph loop: re-reads the prompt every iteration, drives the inner
//! monitor, and applies the result-handling table (spec.md §4.6).

use std::time::Duration;

use chrono::Utc;
use regex::Regex;
use swarm_core::{ExitReason, IterationEvent, IterationEventKind, RalphState, RalphStatus};
use swarm_storage::{IterationLog, RalphStore, StateStore};
use swarm_tmux::{readiness, Tmux};

use crate::error::EngineError;
use crate::ralph::monitor::{self, MonitorConfig, MonitorOutcome};
use crate::shell_quote::build_command_line;

/// Re-launch a worker's tmux window with its original command, used both
/// for the initial iteration and whenever a later iteration finds the
/// window missing.
async fn respawn_window(tmux: &Tmux, session: &str, window: &str, cwd: &str, cmd: &[String]) -> Result<(), EngineError> {
    tmux.create_window(session, window, cwd).await?;
    let wrapped = super::patterns::wrap_with_exit_sentinel(cmd);
    let command_line = build_command_line(&wrapped, &Default::default());
    tmux.send_keys(session, window, &command_line, true, false).await?;
    let outcome = readiness::wait_until_ready(tmux, session, window, Duration::from_secs(readiness::DEFAULT_TIMEOUT_SECS)).await?;
    if outcome == readiness::Readiness::Timeout {
        tracing::warn!(session, window, "ralph: respawned worker did not signal readiness in time, continuing anyway");
    }
    Ok(())
}

/// Drive one ralph worker's outer loop to completion (done, failure-stop,
/// or exhausted `max_iterations`). Returns once the loop is no longer
/// `Running`, including a clean stop after a pause request.
pub async fn run_loop(
    store: &StateStore,
    ralph_store: &RalphStore,
    log: &IterationLog,
    tmux: &Tmux,
    name: &str,
) -> Result<(), EngineError> {
    let mut state = ralph_store.load().ok_or_else(|| EngineError::NotFound(name.to_string()))?;

    while state.iteration <= state.max_iterations && state.status == RalphStatus::Running {
        let record = store.get(name)?.ok_or_else(|| EngineError::NotFound(name.to_string()))?;
        let target = record.tmux.clone().ok_or_else(|| EngineError::InvalidArgument("ralph requires a tmux-backed worker".to_string()))?;
        let cwd = record.cwd.to_string_lossy().to_string();

        if !tmux.window_exists(&target.session, &target.window).await? {
            respawn_window(tmux, &target.session, &target.window, &cwd, &record.cmd).await?;
        }

        let prompt = tokio::fs::read_to_string(&state.prompt_file)
            .await
            .map_err(|e| EngineError::Process(format!("reading prompt_file: {e}")))?;
        tmux.send_keys(&target.session, &target.window, &prompt, true, false).await?;

        let baseline_raw = tmux.capture_pane(&target.session, &target.window, 0).await?;
        let baseline_lines = swarm_core::strip_ansi(&baseline_raw).lines().count();
        state.prompt_baseline_lines = baseline_lines;

        log.append(&IterationEvent::new(Utc::now(), IterationEventKind::Start, state.iteration, None::<String>))?;

        let done_pattern = state
            .done_pattern
            .as_ref()
            .map(|p| Regex::new(p))
            .transpose()
            .map_err(|e| EngineError::InvalidArgument(format!("invalid done_pattern: {e}")))?;

        let mcfg = MonitorConfig {
            iteration: state.iteration,
            baseline_lines,
            done_pattern,
            check_done_continuous: state.check_done_continuous,
            max_context: state.max_context,
            inactivity_timeout: Duration::from_secs(state.inactivity_timeout_secs),
            inactivity_mode: state.inactivity_mode,
            poll_interval: monitor::POLL_INTERVAL,
        };

        let outcome = monitor::run_inner(tmux, &target.session, &target.window, mcfg).await?;
        apply_outcome(&mut state, &target, tmux, log, outcome).await?;
        state.last_iteration_at = Some(Utc::now());

        // Persist under the same lock `pause`/`resume`/`stop` use, so a
        // concurrent status change landing mid-iteration is preserved
        // instead of being clobbered by this iteration's own write.
        let computed = state.clone();
        state = ralph_store.mutate(
            || computed.clone(),
            |persisted| {
                let external_status = (persisted.status != RalphStatus::Running).then_some(persisted.status);
                *persisted = computed.clone();
                if let Some(status) = external_status {
                    persisted.status = status;
                }
            },
        )?;
    }

    if state.iteration > state.max_iterations && state.status == RalphStatus::Running {
        state.status = RalphStatus::Failed;
        state.exit_reason = Some(ExitReason::MaxIterations);
        ralph_store.save(&state)?;
    }

    Ok(())
}

async fn apply_outcome(
    state: &mut RalphState,
    target: &swarm_core::TmuxTarget,
    tmux: &Tmux,
    log: &IterationLog,
    outcome: MonitorOutcome,
) -> Result<(), EngineError> {
    match outcome {
        MonitorOutcome::Done => {
            log.append(&IterationEvent::new(Utc::now(), IterationEventKind::Done, state.iteration, None::<String>))?;
            state.status = RalphStatus::Done;
            state.exit_reason = Some(ExitReason::Done);
        }
        MonitorOutcome::Compaction => {
            tmux.kill_window(&target.session, &target.window).await?;
            log.append(&IterationEvent::new(Utc::now(), IterationEventKind::Fatal, state.iteration, Some("compaction")))?;
            state.iteration += 1;
        }
        MonitorOutcome::ContextThreshold => {
            tmux.kill_window(&target.session, &target.window).await?;
            log.append(&IterationEvent::new(Utc::now(), IterationEventKind::Fatal, state.iteration, Some("context_threshold")))?;
            state.status = RalphStatus::Failed;
            state.exit_reason = Some(ExitReason::ContextThreshold);
        }
        MonitorOutcome::Exited(Some(0)) => {
            log.append(&IterationEvent::new(Utc::now(), IterationEventKind::End, state.iteration, None::<String>))?;
            state.consecutive_failures = 0;
            state.iteration += 1;
        }
        MonitorOutcome::Exited(code) => {
            let reason = code.map(|c| c.to_string()).unwrap_or_else(|| "unknown (sentinel not found)".to_string());
            log.append(&IterationEvent::new(Utc::now(), IterationEventKind::Fail, state.iteration, Some(reason)))?;
            state.consecutive_failures += 1;
            state.total_failures += 1;
            if state.consecutive_failures >= 5 {
                state.status = RalphStatus::Failed;
                state.exit_reason = Some(ExitReason::ConsecutiveFailures);
            } else {
                let backoff = RalphState::backoff_secs(state.consecutive_failures);
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                state.iteration += 1;
            }
        }
        MonitorOutcome::Inactivity => {
            tmux.kill_window(&target.session, &target.window).await?;
            log.append(&IterationEvent::new(Utc::now(), IterationEventKind::Timeout, state.iteration, None::<String>))?;
            state.iteration += 1;
        }
        MonitorOutcome::PreflightStuck => {
            tmux.kill_window(&target.session, &target.window).await?;
            log.append(&IterationEvent::new(
                Utc::now(),
                IterationEventKind::Warn,
                state.iteration,
                Some("preflight auth prompt never resolved"),
            ))?;
            state.status = RalphStatus::Failed;
            state.exit_reason = Some(ExitReason::MonitorDisconnected);
        }
    }
    Ok(())
}
