// SPDX-License-Identifier: MIT

//! Readiness Detector: polls a pane until it shows a ready pattern, sends
//! Enter through benign interstitials, and gives up after a not-ready
//! interstitial that never resolves (spec.md §4.4).

use std::time::Duration;

use regex::Regex;
use swarm_core::strip_ansi;

use crate::error::TmuxError;
use crate::facade::Tmux;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Outcome of a single pane poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Polling should continue; `String` names why (a dismissible
    /// interstitial was sent an Enter, or simply no ready pattern yet).
    NotReady(String),
    Timeout,
}

/// One interstitial pattern the detector dismisses by sending Enter, rather
/// than treating as terminal. Examples are the theme picker's banner text.
fn dismissible_patterns() -> Vec<Regex> {
    [r"[Cc]hoose the text style", r"looks best with your terminal"]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

/// Interstitials that never resolve on their own — an OAuth login picker
/// needs a human, so the detector waits out the timeout rather than
/// treating it as dismissible.
fn stuck_patterns() -> Vec<Regex> {
    [r"[Ss]elect login method", r"[Pp]aste code here"]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

fn ready_patterns() -> Vec<Regex> {
    [r"(?m)^>\s", r"\$\s*$", r"(?i)\bv\d+\.\d+\.\d+\b"].iter().filter_map(|p| Regex::new(p).ok()).collect()
}

/// Classify one already-captured pane snapshot, matched against
/// ANSI-stripped text so color codes around a prompt never defeat line
/// anchoring.
pub fn poll_pane(pane: &str) -> Readiness {
    let stripped = strip_ansi(pane);
    if let Some(p) = stuck_patterns().iter().find(|p| p.is_match(&stripped)) {
        return Readiness::NotReady(format!("stuck: {}", p.as_str()));
    }
    if let Some(p) = dismissible_patterns().iter().find(|p| p.is_match(&stripped)) {
        return Readiness::NotReady(format!("dismissible: {}", p.as_str()));
    }
    if ready_patterns().iter().any(|p| p.is_match(&stripped)) {
        return Readiness::Ready;
    }
    Readiness::NotReady("no ready pattern matched".to_string())
}

/// Poll `session:window` until ready, dismissing theme pickers along the
/// way, until `timeout` elapses.
pub async fn wait_until_ready(
    tmux: &Tmux,
    session: &str,
    window: &str,
    timeout: Duration,
) -> Result<Readiness, TmuxError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let pane = tmux.capture_pane(session, window, 0).await?;
        match poll_pane(&pane) {
            Readiness::Ready => return Ok(Readiness::Ready),
            Readiness::NotReady(reason) if reason.starts_with("dismissible") => {
                tmux.send_keys(session, window, "", true, false).await?;
            }
            Readiness::NotReady(_) | Readiness::Timeout => {}
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(Readiness::Timeout);
        }
        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
