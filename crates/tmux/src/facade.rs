// SPDX-License-Identifier: MIT

//! The Tmux Facade: every multiplexer operation the rest of swarm needs,
//! each optionally scoped to a private socket. Modeled on the teacher's
//! `tmux.rs` subprocess-invocation idiom (`tokio::process::Command`,
//! capture-then-match-exit-status), extended to the full set of session,
//! window, and send-keys operations spec.md §4.3 requires.

use swarm_core::WorkerRecord;
use tokio::process::Command;

use crate::error::TmuxError;

/// A handle to tmux, optionally pinned to a private server via `-L`.
///
/// Using a socket gives each test (or each isolated CLI environment) its
/// own multiplexer server, so parallel runs never collide and the
/// supervisor never adds windows to a user's interactive session unless
/// explicitly told to via the default socket.
#[derive(Debug, Clone, Default)]
pub struct Tmux {
    socket: Option<String>,
}

impl Tmux {
    pub fn new() -> Self {
        Self { socket: None }
    }

    pub fn with_socket(socket: impl Into<String>) -> Self {
        Self { socket: Some(socket.into()) }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("tmux");
        if let Some(socket) = &self.socket {
            cmd.arg("-L").arg(socket);
        }
        cmd.args(args);
        cmd
    }

    async fn run(&self, label: &'static str, args: &[&str]) -> Result<String, TmuxError> {
        let output = self.command(args).output().await.map_err(TmuxError::Spawn)?;
        if !output.status.success() {
            return Err(TmuxError::CommandFailed(label, String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Idempotent: does nothing if the session already exists.
    pub async fn ensure_session(&self, session: &str) -> Result<(), TmuxError> {
        let has = self.command(&["has-session", "-t", session]).output().await.map_err(TmuxError::Spawn)?;
        if has.status.success() {
            return Ok(());
        }
        self.run("new-session", &["new-session", "-d", "-s", session]).await?;
        Ok(())
    }

    pub async fn create_window(&self, session: &str, window: &str, cwd: &str) -> Result<(), TmuxError> {
        self.run("new-window", &["new-window", "-t", session, "-n", window, "-c", cwd]).await?;
        Ok(())
    }

    /// `pre_clear=true` dismisses any autocomplete menu and clears the
    /// current input line first (escape, then kill-line); used only by the
    /// user-facing `send` command. Internal callers (prompt injection,
    /// interrupt, EOF) pass `pre_clear=false` and send the text literally,
    /// or they would interleave escape keys into the payload.
    pub async fn send_keys(
        &self,
        session: &str,
        window: &str,
        text: &str,
        append_enter: bool,
        pre_clear: bool,
    ) -> Result<(), TmuxError> {
        let target = format!("{session}:{window}");
        if pre_clear {
            self.run("send-keys", &["send-keys", "-t", &target, "Escape"]).await?;
            self.run("send-keys", &["send-keys", "-t", &target, "C-u"]).await?;
        }
        self.run("send-keys", &["send-keys", "-t", &target, "-l", text]).await?;
        if append_enter {
            self.run("send-keys", &["send-keys", "-t", &target, "Enter"]).await?;
        }
        Ok(())
    }

    /// Send a named key (e.g. `C-c`, `C-d`) rather than literal text, for
    /// `interrupt`/`eof`.
    pub async fn send_control_key(&self, session: &str, window: &str, key: &str) -> Result<(), TmuxError> {
        let target = format!("{session}:{window}");
        self.run("send-keys", &["send-keys", "-t", &target, key]).await?;
        Ok(())
    }

    pub async fn window_exists(&self, session: &str, window: &str) -> Result<bool, TmuxError> {
        let output = self
            .command(&["list-windows", "-t", session, "-F", "#{window_name}"])
            .output()
            .await
            .map_err(TmuxError::Spawn)?;
        if !output.status.success() {
            return Ok(false);
        }
        let names = String::from_utf8_lossy(&output.stdout);
        Ok(names.lines().any(|n| n == window))
    }

    /// Returns the pane content including ANSI escapes — stripping is the
    /// Readiness Detector's job, not this one's (spec.md §4.3).
    pub async fn capture_pane(
        &self,
        session: &str,
        window: &str,
        history_lines: u32,
    ) -> Result<String, TmuxError> {
        let target = format!("{session}:{window}");
        let start = format!("-{history_lines}");
        let mut args = vec!["capture-pane", "-t", target.as_str(), "-p", "-e"];
        if history_lines > 0 {
            args.push("-S");
            args.push(&start);
        }
        self.run("capture-pane", &args).await
    }

    /// True if any *other* worker record in `registry` points at this
    /// session — used to decide whether killing a window should also tear
    /// down the now-empty session.
    pub fn session_has_other_workers(
        &self,
        session: &str,
        self_window: &str,
        registry: impl IntoIterator<Item = impl std::borrow::Borrow<WorkerRecord>>,
    ) -> bool {
        registry.into_iter().any(|r| {
            let r = r.borrow();
            r.tmux.as_ref().is_some_and(|t| t.session == session && t.window != self_window)
        })
    }

    pub async fn kill_window(&self, session: &str, window: &str) -> Result<(), TmuxError> {
        let target = format!("{session}:{window}");
        let output = self.command(&["kill-window", "-t", &target]).output().await.map_err(TmuxError::Spawn)?;
        if !output.status.success() {
            return Err(TmuxError::NoSuchWindow(window.to_string(), session.to_string()));
        }
        Ok(())
    }

    /// Idempotent: tolerates the session already being gone.
    pub async fn kill_session(&self, session: &str) -> Result<(), TmuxError> {
        let _ = self.command(&["kill-session", "-t", session]).output().await.map_err(TmuxError::Spawn)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
