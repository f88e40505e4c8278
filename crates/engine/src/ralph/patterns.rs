// SPDX-License-Identifier: MIT

//! Fixed pane-text patterns the ralph monitor reacts to.

use regex::Regex;
use std::sync::LazyLock;

/// Renders the current iteration's output useless; not counted as a
/// failure, the agent is killed and a fresh iteration begins.
#[allow(clippy::expect_used)]
static FATAL: LazyLock<Regex> = LazyLock::new(|| Regex::new("Compacting conversation").expect("constant regex pattern is valid"));

pub fn fatal_patterns() -> &'static [Regex] {
    std::slice::from_ref(&FATAL)
}

/// Benign interstitials the monitor only warns about, once per pattern per
/// iteration — unlike the readiness detector, the monitor does not try to
/// dismiss them.
#[allow(clippy::expect_used)]
static STUCK: LazyLock<[(&str, Regex); 3]> = LazyLock::new(|| {
    [
        ("login_picker", Regex::new("[Ss]elect login method").expect("constant regex pattern is valid")),
        ("theme_picker", Regex::new("[Cc]hoose the text style").expect("constant regex pattern is valid")),
        ("oauth_paste", Regex::new("[Pp]aste code here").expect("constant regex pattern is valid")),
    ]
});

pub fn stuck_patterns() -> &'static [(&'static str, Regex)] {
    STUCK.as_slice()
}

/// A percentage figure in the last few lines of pane output, read as
/// context-window usage for the `max_context` threshold.
#[allow(clippy::expect_used)]
static CONTEXT_PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,3})%").expect("constant regex pattern is valid"));

pub fn context_percent_pattern() -> &'static Regex {
    &CONTEXT_PERCENT
}

/// The sentinel swarm appends to every ralph-managed invocation so the
/// monitor can recover an exit code after the tmux window closes.
pub const EXIT_SENTINEL_PREFIX: &str = "__SWARM_EXIT_CODE__:";

#[allow(clippy::expect_used)]
static EXIT_SENTINEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__SWARM_EXIT_CODE__:(-?\d+)").expect("constant regex pattern is valid"));

pub fn exit_sentinel_pattern() -> &'static Regex {
    &EXIT_SENTINEL
}

/// Wrap `cmd` in a shell invocation that prints the exit sentinel after it
/// finishes, so the monitor can recover an exit code even after the tmux
/// window that ran it has already closed. The trailing `sleep 1` buys the
/// next poll a chance to capture the sentinel before the pane's shell exits
/// and tmux tears the window down.
pub fn wrap_with_exit_sentinel(cmd: &[String]) -> Vec<String> {
    let inner = crate::shell_quote::build_command_line(cmd, &Default::default());
    let script = format!("{inner} ; printf '\\n{EXIT_SENTINEL_PREFIX}%s\\n' \"$?\"; sleep 1");
    vec!["sh".to_string(), "-c".to_string(), script]
}

#[cfg(test)]
#[path = "patterns_tests.rs"]
mod tests;
