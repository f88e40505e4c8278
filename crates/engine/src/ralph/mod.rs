// SPDX-License-Identifier: MIT

//! The autonomous ralph loop: spawn once, then re-prompt a tmux-backed
//! worker with a fresh context every iteration until a done pattern, a
//! failure budget, or an operator stop ends it (spec.md §4.6).

mod control;
mod monitor;
mod outer;
mod patterns;
mod poll;

pub use control::{clean, list, logs, pause, resume, status, stop};
pub use monitor::{MonitorConfig, MonitorOutcome};
pub use outer::run_loop;
pub use patterns::{wrap_with_exit_sentinel, EXIT_SENTINEL_PREFIX};
