// SPDX-License-Identifier: MIT

//! Default tmux session naming: a stable digest of the state-store
//! directory so repeated invocations by the same user land in the same
//! session, environments never collide, and the supervisor never touches a
//! user's pre-existing interactive session (spec.md §4.3).

use std::path::Path;

use sha2::{Digest, Sha256};

/// `swarm-<first 12 hex chars of sha256(state_dir)>`.
pub fn default_session_name(state_dir: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(state_dir.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    format!("swarm-{hex}")
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
