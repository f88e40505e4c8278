// SPDX-License-Identifier: MIT

//! Per-worker ralph state persisted at `<state_dir>/ralph/<name>/state.json`,
//! guarded by a sibling lock file. Same locking and atomic-write discipline
//! as the State Store (spec.md §4.6).

use std::fs;
use std::path::{Path, PathBuf};

use swarm_core::RalphState;
use tracing::warn;

use crate::atomic::write_json_atomic;
use crate::error::StorageError;
use crate::lock;

pub struct RalphStore {
    dir: PathBuf,
}

impl RalphStore {
    /// `state_dir` is the same root the `StateStore` uses; ralph state lives
    /// under `<state_dir>/ralph/<name>/`.
    pub fn open(state_dir: impl AsRef<Path>, name: &str) -> Result<Self, StorageError> {
        let dir = state_dir.as_ref().join("ralph").join(name);
        fs::create_dir_all(&dir).map_err(|e| StorageError::CreateDir(dir.clone(), e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self) -> PathBuf {
        self.dir.join("state.json")
    }

    pub fn load(&self) -> Option<RalphState> {
        let path = self.path();
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(state) => Some(state),
            Err(e) => {
                let corrupted = path.with_extension("json.corrupted");
                let _ = fs::rename(&path, &corrupted);
                warn!(path = %path.display(), error = %e, "swarm: warning: ralph state was corrupted; starting fresh");
                None
            }
        }
    }

    pub fn save(&self, state: &RalphState) -> Result<(), StorageError> {
        let path = self.path();
        let _guard = lock::acquire(&path)?;
        write_json_atomic(&path, state)
    }

    pub fn mutate<F>(&self, default: impl FnOnce() -> RalphState, f: F) -> Result<RalphState, StorageError>
    where
        F: FnOnce(&mut RalphState),
    {
        let path = self.path();
        let _guard = lock::acquire(&path)?;
        let mut state = self.load().unwrap_or_else(default);
        f(&mut state);
        write_json_atomic(&path, &state)?;
        Ok(state)
    }

    pub fn clean(&self) -> Result<(), StorageError> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir).map_err(|e| StorageError::Io(self.dir.clone(), e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "ralph_store_tests.rs"]
mod tests;
