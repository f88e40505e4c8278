// SPDX-License-Identifier: MIT

//! The State Store: a crash-safe, lock-serialized worker registry shared by
//! concurrent CLI invocations. See spec.md §4.1.

use std::fs;
use std::path::{Path, PathBuf};

use swarm_core::{Registry, WorkerRecord};
use tracing::warn;

use crate::atomic::write_json_atomic;
use crate::error::StorageError;
use crate::lock;

/// Registry persisted at `<state_dir>/state.json`, guarded by
/// `state.json.lock`.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Open (creating the state directory if needed) the store at
    /// `state_dir/state.json`.
    pub fn open(state_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let state_dir = state_dir.into();
        fs::create_dir_all(&state_dir)
            .map_err(|e| StorageError::CreateDir(state_dir.clone(), e))?;
        Ok(Self { path: state_dir.join("state.json") })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only snapshot. Atomic rename on write means a reader never
    /// observes a partial file, so this does not need the lock.
    pub fn snapshot(&self) -> Result<Registry, StorageError> {
        Ok(load_registry(&self.path))
    }

    /// Read-modify-write under the exclusive lock for the whole window.
    pub fn mutate<F>(&self, f: F) -> Result<Registry, StorageError>
    where
        F: FnOnce(&mut Registry) -> Result<(), StorageError>,
    {
        let _guard = lock::acquire(&self.path)?;
        let mut registry = load_registry(&self.path);
        f(&mut registry)?;
        write_json_atomic(&self.path, &registry)?;
        Ok(registry)
    }

    pub fn add(&self, record: WorkerRecord) -> Result<(), StorageError> {
        let name = record.name.clone();
        self.mutate(move |reg| {
            if !reg.insert(record.clone()) {
                return Err(StorageError::Conflict(name.clone()));
            }
            Ok(())
        })?;
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<Option<WorkerRecord>, StorageError> {
        let mut removed = None;
        self.mutate(|reg| {
            removed = reg.remove(name);
            Ok(())
        })?;
        Ok(removed)
    }

    pub fn update(
        &self,
        name: &str,
        f: impl FnOnce(&mut WorkerRecord),
    ) -> Result<bool, StorageError> {
        let mut found = false;
        self.mutate(|reg| {
            found = reg.update(name, f);
            Ok(())
        })?;
        Ok(found)
    }

    pub fn get(&self, name: &str) -> Result<Option<WorkerRecord>, StorageError> {
        Ok(self.snapshot()?.get(name).cloned())
    }
}

/// Load the registry, recovering from a corrupted file per spec.md §4.1:
/// rename with a `.corrupted` suffix, warn, and substitute an empty
/// registry. I/O errors other than "missing file" are treated the same
/// way — "otherwise all errors are recovered" (spec.md §4.1).
fn load_registry(path: &Path) -> Registry {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Registry::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "swarm: warning: failed to read state store, starting empty");
            return Registry::new();
        }
    };

    match serde_json::from_str::<Registry>(&contents) {
        Ok(registry) => registry,
        Err(e) => {
            let corrupted_path = corrupted_path_for(path);
            if let Err(rename_err) = fs::rename(path, &corrupted_path) {
                warn!(path = %path.display(), error = %rename_err, "swarm: warning: failed to rename corrupted state store");
            } else {
                warn!(
                    original = %path.display(),
                    corrupted = %corrupted_path.display(),
                    error = %e,
                    "swarm: warning: state store was corrupted; recovered with an empty registry"
                );
            }
            Registry::new()
        }
    }
}

fn corrupted_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".corrupted");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
