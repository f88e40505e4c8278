// SPDX-License-Identifier: MIT

//! Minimal POSIX single-quote escaping for building the command line a tmux
//! window's shell receives. Not a parser — just enough quoting for the
//! literal argv swarm was given.

pub fn quote(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_alphanumeric() || "-_./:=@".contains(c)) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Build `ENV1=val1 ENV2=val2 argv0 argv1 ...`, quoting every piece.
pub fn build_command_line(cmd: &[String], env: &std::collections::BTreeMap<String, String>) -> String {
    let mut parts = Vec::with_capacity(env.len() + cmd.len());
    for (k, v) in env {
        parts.push(format!("{k}={}", quote(v)));
    }
    parts.extend(cmd.iter().map(|a| quote(a)));
    parts.join(" ")
}

#[cfg(test)]
#[path = "shell_quote_tests.rs"]
mod tests;
