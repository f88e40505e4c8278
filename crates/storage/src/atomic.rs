// SPDX-License-Identifier: MIT

//! Atomic JSON persistence: write to a sibling temp file, then rename over
//! the target. A crash mid-write leaves either the old file or nothing —
//! never a partial target, per spec.md §4.1.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::StorageError;

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let body = serde_json::to_vec_pretty(value)
        .map_err(|e| StorageError::Serialize(path.to_path_buf(), e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| StorageError::Io(path.to_path_buf(), e))?;
    tmp.write_all(&body).map_err(|e| StorageError::Io(path.to_path_buf(), e))?;
    tmp.as_file().sync_all().map_err(|e| StorageError::Io(path.to_path_buf(), e))?;
    tmp.persist(path)
        .map_err(|e| StorageError::Io(path.to_path_buf(), e.error))?;
    Ok(())
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
