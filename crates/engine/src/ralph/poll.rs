// SPDX-License-Identifier: MIT

//! Pure pane-text classification for one inner-monitor poll. No I/O: the
//! monitor loop captures the pane and passes the text in, so this module is
//! exercised without tmux or a subprocess.

use regex::Regex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::patterns;

/// A stable hash of pane content, used to detect screen changes cheaply.
pub fn hash_pane(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

pub fn matches_fatal(text: &str) -> bool {
    patterns::fatal_patterns().iter().any(|re| re.is_match(text))
}

/// Names of STUCK patterns present in `text`, for once-per-iteration WARN logging.
pub fn matched_stuck(text: &str) -> Vec<&'static str> {
    patterns::stuck_patterns().iter().filter(|(_, re)| re.is_match(text)).map(|(name, _)| *name).collect()
}

/// Scan the pane from `baseline` lines onward for `done_pattern`, so the
/// prompt text itself (which may contain the pattern) can never self-match.
pub fn matches_done(text: &str, baseline_lines: usize, done_pattern: &Regex) -> bool {
    let tail: Vec<&str> = text.lines().skip(baseline_lines).collect();
    done_pattern.is_match(&tail.join("\n"))
}

/// Last non-empty percent figure in the final `window` lines of the pane.
pub fn context_percent(text: &str, window: usize) -> Option<u8> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(window);
    for line in lines[start..].iter().rev() {
        if let Some(caps) = patterns::context_percent_pattern().captures(line) {
            if let Ok(pct) = caps[1].parse::<u8>() {
                return Some(pct);
            }
        }
    }
    None
}

/// Parse the `__SWARM_EXIT_CODE__:<n>` sentinel from the last captured pane
/// content, used once the multiplexer window has vanished.
pub fn parse_exit_sentinel(text: &str) -> Option<i32> {
    patterns::exit_sentinel_pattern().captures(text).and_then(|caps| caps[1].parse::<i32>().ok())
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
