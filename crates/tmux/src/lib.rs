// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! swarm-tmux: the terminal-multiplexer facade and readiness detector.
//!
//! Every operation optionally accepts a private socket name so tests (and
//! isolated environments) never touch a user's real tmux server. Session
//! and window lifecycle calls are idempotent where tmux itself allows it.

pub mod error;
pub mod facade;
pub mod naming;
pub mod readiness;

pub use error::TmuxError;
pub use facade::Tmux;
pub use naming::default_session_name;
pub use readiness::{poll_pane, wait_until_ready, Readiness, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT_SECS};
