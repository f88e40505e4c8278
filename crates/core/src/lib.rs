// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! swarm-core: domain types shared across the swarm workspace.
//!
//! This crate has no I/O — it is pure data and small pure functions (ANSI
//! stripping, backoff math, invariant checks). Everything that touches the
//! filesystem, tmux, or git lives in `swarm-storage`, `swarm-tmux`, and
//! `swarm-worktree`.

pub mod ansi;
pub mod iteration_log;
pub mod ralph_state;
pub mod registry;
pub mod worker_id;
pub mod worker_record;

pub use ansi::strip_ansi;
pub use iteration_log::{IterationEvent, IterationEventKind};
pub use ralph_state::{ExitReason, InactivityMode, RalphState, RalphStatus};
pub use registry::Registry;
pub use worker_id::{InvalidWorkerName, WorkerId};
pub use worker_record::{TmuxTarget, WorkerRecord, WorkerStatus, WorktreeInfo};
