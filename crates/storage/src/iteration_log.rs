// SPDX-License-Identifier: MIT

//! Append-only writer for `ralph/<name>/iterations.log` (spec.md §4.6/§6).
//! Each append opens the file in append mode and writes one line; unlike
//! the state files this is not rename-atomic, since an in-flight operator
//! `tail -f` needs to see lines as they land rather than a file that
//! disappears and reappears.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use swarm_core::IterationEvent;

use crate::error::StorageError;

pub struct IterationLog {
    path: PathBuf,
}

impl IterationLog {
    pub fn open(ralph_dir: impl AsRef<Path>) -> Self {
        Self { path: ralph_dir.as_ref().join("iterations.log") }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, event: &IterationEvent) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::Io(self.path.clone(), e))?;
        writeln!(file, "{event}").map_err(|e| StorageError::Io(self.path.clone(), e))?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<String, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(StorageError::Io(self.path.clone(), e)),
        }
    }

    /// Last `n` lines, for `ralph logs --tail`.
    pub fn tail(&self, n: usize) -> Result<Vec<String>, StorageError> {
        let contents = self.read_all()?;
        let lines: Vec<String> = contents.lines().map(str::to_string).collect();
        let start = lines.len().saturating_sub(n);
        Ok(lines[start..].to_vec())
    }
}

#[cfg(test)]
#[path = "iteration_log_tests.rs"]
mod tests;
