// SPDX-License-Identifier: MIT

//! `swarm ralph ...`: spawn, drive, and operate the autonomous re-prompt
//! loop on top of a tmux-backed worker (spec.md §4.6).

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Subcommand};
use swarm_core::InactivityMode;
use swarm_engine::{EngineConfig, SpawnRequest};
use swarm_storage::{IterationLog, RalphStore, StateStore};
use swarm_tmux::Tmux;

use crate::exit_error::CliError;
use crate::output;

#[derive(Subcommand)]
pub enum RalphCommand {
    /// Scaffold a ralph prompt file in the current directory
    Init,
    /// Print the prompt template ralph expects
    Template,
    /// Spawn a tmux-backed worker and start (or stage) its ralph loop
    Spawn(RalphSpawnArgs),
    /// Run the outer loop in this process until it stops
    Run {
        name: String,
        /// Block in this process rather than returning immediately; implied
        /// when invoked internally by `ralph spawn`'s detached subprocess
        #[arg(long)]
        foreground: bool,
    },
    /// Show one ralph worker's current iteration/status
    Status { name: String },
    /// Stop starting new iterations once the current one completes
    Pause { name: String },
    /// Resume a paused loop
    Resume { name: String },
    /// List every ralph worker with persisted state
    #[command(alias = "ls")]
    List,
    /// Print the iteration log
    Logs {
        name: String,
        #[arg(long)]
        tail: Option<usize>,
    },
    /// Remove a ralph worker's persisted state and iteration log
    Clean { name: String },
    /// Stop the loop and kill its detached monitor, if any
    Stop { name: String },
}

#[derive(Args)]
pub struct RalphSpawnArgs {
    name: String,
    /// File re-read and sent as the prompt at the start of every iteration
    #[arg(long)]
    prompt_file: PathBuf,
    #[arg(long, default_value_t = 50)]
    max_iterations: u32,
    /// Regex; a match at or after the iteration's prompt line ends the loop
    #[arg(long)]
    done_pattern: Option<String>,
    #[arg(long, default_value_t = 60)]
    inactivity_timeout_secs: u64,
    #[arg(long, default_value = "output", value_parser = parse_inactivity_mode)]
    inactivity_mode: InactivityMode,
    /// Percent threshold for the context-usage nudge/hard-stop
    #[arg(long)]
    max_context: Option<u8>,
    #[arg(long)]
    cwd: Option<PathBuf>,
    #[arg(long = "env", value_parser = parse_env_kv)]
    env: Vec<(String, String)>,
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// Block in this process rather than detaching a monitor subprocess
    #[arg(long)]
    foreground: bool,
    /// Create the worker and its ralph state but do not start the loop
    #[arg(long)]
    no_run: bool,
    #[arg(last = true)]
    cmd: Vec<String>,
}

fn parse_env_kv(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) => Ok((k.to_string(), v.to_string())),
        None => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

fn parse_inactivity_mode(s: &str) -> Result<InactivityMode, String> {
    match s {
        "output" => Ok(InactivityMode::Output),
        "ready" => Ok(InactivityMode::Ready),
        "both" => Ok(InactivityMode::Both),
        other => Err(format!("expected output|ready|both, got {other:?}")),
    }
}

pub async fn handle(cfg: &EngineConfig, store: &StateStore, tmux: &Tmux, command: RalphCommand) -> Result<(), CliError> {
    match command {
        RalphCommand::Init => {
            // Scaffolding a prompt file from a template is outside this
            // build's scope; operators write prompt_file by hand.
            eprintln!("swarm: ralph init is not implemented in this build");
            return Err(CliError::generic("not implemented"));
        }
        RalphCommand::Template => {
            eprintln!("swarm: ralph template is not implemented in this build");
            return Err(CliError::generic("not implemented"));
        }
        RalphCommand::Spawn(args) => spawn(cfg, store, tmux, args).await?,
        RalphCommand::Run { name, foreground: _ } => run(cfg, store, tmux, &name).await?,
        RalphCommand::Status { name } => {
            let ralph_store = RalphStore::open(&cfg.state_dir, &name).map_err(|e| CliError::generic(e.to_string()))?;
            let state = swarm_engine::ralph::status(&name, &ralph_store)?;
            output::print_ralph_states(&[state]);
        }
        RalphCommand::Pause { name } => {
            let ralph_store = RalphStore::open(&cfg.state_dir, &name).map_err(|e| CliError::generic(e.to_string()))?;
            let log = IterationLog::open(cfg.ralph_dir(&name));
            let state = swarm_engine::ralph::pause(&name, &ralph_store, &log)?;
            println!("{name}: {}", state.status);
        }
        RalphCommand::Resume { name } => {
            let ralph_store = RalphStore::open(&cfg.state_dir, &name).map_err(|e| CliError::generic(e.to_string()))?;
            let state = swarm_engine::ralph::resume(&name, &ralph_store)?;
            println!("{name}: {}", state.status);
        }
        RalphCommand::List => {
            let states = swarm_engine::ralph::list(cfg)?;
            output::print_ralph_states(&states);
        }
        RalphCommand::Logs { name, tail } => {
            let log = IterationLog::open(cfg.ralph_dir(&name));
            let text = swarm_engine::ralph::logs(&log, tail)?;
            println!("{text}");
        }
        RalphCommand::Clean { name } => {
            let ralph_store = RalphStore::open(&cfg.state_dir, &name).map_err(|e| CliError::generic(e.to_string()))?;
            swarm_engine::ralph::clean(&ralph_store)?;
        }
        RalphCommand::Stop { name } => {
            let ralph_store = RalphStore::open(&cfg.state_dir, &name).map_err(|e| CliError::generic(e.to_string()))?;
            let log = IterationLog::open(cfg.ralph_dir(&name));
            let state = swarm_engine::ralph::stop(&name, &ralph_store, &log).await?;
            println!("{name}: {}", state.status);
        }
    }
    Ok(())
}

async fn spawn(cfg: &EngineConfig, store: &StateStore, tmux: &Tmux, args: RalphSpawnArgs) -> Result<(), CliError> {
    if args.cmd.is_empty() {
        return Err(CliError::generic("missing command; pass `-- <cmd...>`"));
    }
    let cwd = args.cwd.unwrap_or(std::env::current_dir().map_err(|e| CliError::generic(e.to_string()))?);

    let mut metadata = BTreeMap::new();
    metadata.insert("ralph".to_string(), serde_json::Value::Bool(true));

    let wrapped_cmd = swarm_engine::ralph::wrap_with_exit_sentinel(&args.cmd);
    let req = SpawnRequest {
        name: args.name.clone(),
        cmd: wrapped_cmd,
        cwd,
        env: args.env.into_iter().collect::<BTreeMap<_, _>>(),
        tags: args.tags.into_iter().collect::<BTreeSet<_>>(),
        use_tmux: true,
        worktree: None,
        ready_wait: true,
        metadata,
    };
    swarm_engine::spawn(cfg, store, tmux, req).await?;

    let ralph_store = RalphStore::open(&cfg.state_dir, &args.name).map_err(|e| CliError::generic(e.to_string()))?;
    let state = swarm_core::RalphState::new(
        args.name.clone(),
        args.max_iterations,
        args.prompt_file,
        args.done_pattern,
        args.inactivity_timeout_secs,
        args.inactivity_mode,
        args.max_context,
        Utc::now(),
    );
    ralph_store.save(&state).map_err(|e| CliError::generic(e.to_string()))?;
    println!("spawned ralph worker {:?}", args.name);

    if args.no_run {
        return Ok(());
    }

    if args.foreground {
        run(cfg, store, tmux, &args.name).await
    } else {
        detach(cfg, &ralph_store, &args.name)
    }
}

/// Re-invoke this binary as `ralph run --foreground`, detached, with its
/// stdout/stderr captured to a log file under the ralph state dir, and
/// record the child's pid so `ralph stop` can reach it later.
fn detach(cfg: &EngineConfig, ralph_store: &RalphStore, name: &str) -> Result<(), CliError> {
    let exe = std::env::current_exe().map_err(|e| CliError::generic(e.to_string()))?;
    let log_path = cfg.ralph_dir(name).join("monitor.log");
    let log_file = std::fs::File::create(&log_path).map_err(|e| CliError::generic(e.to_string()))?;
    let log_file_err = log_file.try_clone().map_err(|e| CliError::generic(e.to_string()))?;

    let mut cmd = std::process::Command::new(exe);
    cmd.args(["ralph", "run", "--foreground", name]);
    cmd.arg("--state-dir").arg(&cfg.state_dir);
    if let Some(socket) = &cfg.tmux_socket {
        cmd.arg("--tmux-socket").arg(socket);
    }
    cmd.stdout(log_file).stderr(log_file_err).stdin(std::process::Stdio::null());

    let child = cmd.spawn().map_err(|e| CliError::generic(e.to_string()))?;
    let pid = child.id();

    let mut state = ralph_store.load().ok_or_else(|| CliError::generic(format!("ralph state for {name:?} vanished before the monitor could start")))?;
    state.monitor_pid = Some(pid);
    ralph_store.save(&state).map_err(|e| CliError::generic(e.to_string()))?;

    println!("ralph monitor for {name:?} detached (pid {pid}), logging to {}", log_path.display());
    Ok(())
}

async fn run(cfg: &EngineConfig, store: &StateStore, tmux: &Tmux, name: &str) -> Result<(), CliError> {
    let ralph_store = RalphStore::open(&cfg.state_dir, name).map_err(|e| CliError::generic(e.to_string()))?;
    let log = IterationLog::open(cfg.ralph_dir(name));

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .map_err(|e| CliError::generic(e.to_string()))?;
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .map_err(|e| CliError::generic(e.to_string()))?;

        tokio::select! {
            result = swarm_engine::ralph::run_loop(store, &ralph_store, &log, tmux, name) => {
                result?;
            }
            _ = sigterm.recv() => {
                swarm_engine::ralph::pause(name, &ralph_store, &log)?;
            }
            _ = sigint.recv() => {
                swarm_engine::ralph::stop(name, &ralph_store, &log).await?;
            }
        }
    }
    #[cfg(not(unix))]
    {
        swarm_engine::ralph::run_loop(store, &ralph_store, &log, tmux, name).await?;
    }

    Ok(())
}
