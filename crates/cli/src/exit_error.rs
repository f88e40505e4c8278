// SPDX-License-Identifier: MIT

//! Carries a process exit code so `main()`, not individual commands,
//! decides how the process terminates.

use std::fmt;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Exit code 2 is reserved for `status`/`peek`-style lookups (spec.md §7);
/// every other command surfaces `NotFound` as a generic error (code 1).
/// Callers that want code 2 convert `EngineError::NotFound` explicitly
/// rather than relying on this blanket conversion.
impl From<swarm_engine::EngineError> for CliError {
    fn from(e: swarm_engine::EngineError) -> Self {
        CliError::generic(e.to_string())
    }
}
