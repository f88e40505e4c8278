// SPDX-License-Identifier: MIT

//! Worker identifier.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Unique identifier for a supervised worker.
///
/// Worker names are printable and must not contain path separators, since
/// they are embedded directly into log file names and worktree directory
/// names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(String);

/// Reason a candidate worker name was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidWorkerName {
    #[error("worker name must not be empty")]
    Empty,
    #[error("worker name must not contain path separators: {0:?}")]
    PathSeparator(String),
    #[error("worker name must not contain whitespace or control characters: {0:?}")]
    NotPrintable(String),
}

impl WorkerId {
    /// Validate and construct a `WorkerId`.
    pub fn parse(name: impl Into<String>) -> Result<Self, InvalidWorkerName> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidWorkerName::Empty);
        }
        if name.contains('/') || name.contains('\\') {
            return Err(InvalidWorkerName::PathSeparator(name));
        }
        if !name.chars().all(|c| c.is_ascii_graphic() || c == '-' || c == '_' || c == '.') {
            return Err(InvalidWorkerName::NotPrintable(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for WorkerId {
    type Error = InvalidWorkerName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for WorkerId {
    type Error = InvalidWorkerName;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialEq<str> for WorkerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WorkerId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for WorkerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "worker_id_tests.rs"]
mod tests;
