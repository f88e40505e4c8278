// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `swarm-engine`: the worker lifecycle and autonomous ralph loop built on
//! top of the state store, tmux facade, and worktree manager.

mod config;
mod error;
mod lifecycle;
mod process;
pub mod ralph;
mod shell_quote;
mod spawn;
mod status;

pub use config::EngineConfig;
pub use error::EngineError;
pub use lifecycle::{clean, eof, interrupt, kill, logs, ls, peek, respawn, send, wait, worker_status};
pub use process::{is_alive, kill_escalate, spawn_bare};
pub use spawn::{spawn, SpawnRequest, WorktreeRequest};
pub use status::refresh_status;
