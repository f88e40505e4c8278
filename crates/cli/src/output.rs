// SPDX-License-Identifier: MIT

//! Plain-text table rendering for `ls` and `ralph list`.

use swarm_core::{RalphState, WorkerRecord};

fn pad(s: &str, width: usize) -> String {
    if s.len() >= width {
        s.to_string()
    } else {
        format!("{s:<width$}")
    }
}

pub fn print_workers(workers: &[WorkerRecord]) {
    if workers.is_empty() {
        println!("no workers");
        return;
    }
    println!("{}  {}  {}  {}", pad("NAME", 20), pad("STATUS", 10), pad("MODE", 8), "CMD");
    for w in workers {
        let mode = if w.tmux.is_some() {
            "tmux"
        } else if w.pid.is_some() {
            "process"
        } else {
            "-"
        };
        println!("{}  {}  {}  {}", pad(&w.name, 20), pad(&w.status.to_string(), 10), pad(mode, 8), w.cmd.join(" "));
    }
}

pub fn print_ralph_states(states: &[RalphState]) {
    if states.is_empty() {
        println!("no ralph workers");
        return;
    }
    println!(
        "{}  {}  {}  {}",
        pad("NAME", 20),
        pad("STATUS", 10),
        pad("ITERATION", 12),
        "FAILURES"
    );
    for s in states {
        println!(
            "{}  {}  {}  {}",
            pad(&s.name, 20),
            pad(&s.status.to_string(), 10),
            pad(&format!("{}/{}", s.iteration, s.max_iterations), 12),
            s.consecutive_failures
        );
    }
}
