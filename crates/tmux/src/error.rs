// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from the Tmux Facade (spec.md §4.3/§7 `MultiplexerError`).
#[derive(Debug, Error)]
pub enum TmuxError {
    #[error("failed to run tmux: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("session {0:?} not found")]
    NoSuchSession(String),
    #[error("window {0:?} not found in session {1:?}")]
    NoSuchWindow(String, String),
    #[error("tmux {0} failed: {1}")]
    CommandFailed(&'static str, String),
}
