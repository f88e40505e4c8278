// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! swarm-storage: the crash-safe, file-backed state shared by every `swarm`
//! invocation — the worker registry, per-worker ralph state, and the
//! append-only ralph iteration log. Every write is lock-serialized and
//! rename-atomic so that two CLI processes racing on the same state
//! directory never corrupt it, and a killed-mid-write process leaves the
//! previous good state behind rather than a half-written file.

pub mod atomic;
pub mod error;
pub mod iteration_log;
pub mod lock;
pub mod ralph_store;
pub mod store;

pub use error::StorageError;
pub use iteration_log::IterationLog;
pub use lock::{acquire, LockGuard};
pub use ralph_store::RalphStore;
pub use store::StateStore;
