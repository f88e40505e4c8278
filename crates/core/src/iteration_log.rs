// SPDX-License-Identifier: MIT

//! Iteration log event kinds, appended one per line to
//! `ralph/<name>/iterations.log`.

use chrono::{DateTime, Utc};
use std::fmt;

/// One event kind in the append-only iteration log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationEventKind {
    Start,
    End,
    Fail,
    Timeout,
    Done,
    Pause,
    Fatal,
    Warn,
}

impl fmt::Display for IterationEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "START",
            Self::End => "END",
            Self::Fail => "FAIL",
            Self::Timeout => "TIMEOUT",
            Self::Done => "DONE",
            Self::Pause => "PAUSE",
            Self::Fatal => "FATAL",
            Self::Warn => "WARN",
        };
        write!(f, "{s}")
    }
}

/// A single formatted iteration-log line: `<timestamp> [<kind>] iteration <n> -- <reason>`.
#[derive(Debug, Clone)]
pub struct IterationEvent {
    pub at: DateTime<Utc>,
    pub kind: IterationEventKind,
    pub iteration: u32,
    pub reason: Option<String>,
}

impl IterationEvent {
    pub fn new(
        at: DateTime<Utc>,
        kind: IterationEventKind,
        iteration: u32,
        reason: Option<impl Into<String>>,
    ) -> Self {
        Self { at, kind, iteration, reason: reason.map(Into::into) }
    }
}

impl fmt::Display for IterationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(
                f,
                "{} [{}] iteration {} -- {}",
                self.at.to_rfc3339(),
                self.kind,
                self.iteration,
                reason
            ),
            None => write!(f, "{} [{}] iteration {}", self.at.to_rfc3339(), self.kind, self.iteration),
        }
    }
}

#[cfg(test)]
#[path = "iteration_log_tests.rs"]
mod tests;
