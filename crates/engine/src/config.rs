// SPDX-License-Identifier: MIT

//! Engine configuration: where the state directory lives and how the tmux
//! facade is scoped. Resolution order per spec.md §6: `--state-dir` flag >
//! `SWARM_STATE_DIR` env var > `~/.swarm`.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub state_dir: PathBuf,
    /// Private tmux socket name; `None` uses the user's default server.
    pub tmux_socket: Option<String>,
}

impl EngineConfig {
    pub fn resolve(state_dir_flag: Option<PathBuf>) -> Self {
        let state_dir = state_dir_flag
            .or_else(|| std::env::var_os("SWARM_STATE_DIR").map(PathBuf::from))
            .unwrap_or_else(default_state_dir);
        Self { state_dir, tmux_socket: None }
    }

    pub fn with_tmux_socket(mut self, socket: impl Into<String>) -> Self {
        self.tmux_socket = Some(socket.into());
        self
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    pub fn ralph_dir(&self, name: &str) -> PathBuf {
        self.state_dir.join("ralph").join(name)
    }

    pub fn default_session_name(&self) -> String {
        swarm_tmux::default_session_name(&self.state_dir)
    }
}

fn default_state_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".swarm")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
