// SPDX-License-Identifier: MIT

//! `swarm`: the command-line front end for the worker registry, tmux
//! facade, worktree manager, and ralph monitor loop.

mod exit_error;
mod output;
mod ralph_cli;
mod styles;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use exit_error::CliError;
use swarm_engine::{EngineConfig, SpawnRequest, WorktreeRequest};
use swarm_storage::StateStore;
use swarm_tmux::Tmux;

#[derive(Parser)]
#[command(name = "swarm", version, styles = styles::styles())]
struct Cli {
    /// Override the state directory (default: $SWARM_STATE_DIR or ~/.swarm)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,
    /// Run tmux against a private socket rather than the default server
    #[arg(long, global = true)]
    tmux_socket: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Spawn a new supervised worker
    Spawn {
        name: String,
        #[arg(long)]
        cwd: Option<PathBuf>,
        #[arg(long = "env", value_parser = parse_env_kv)]
        env: Vec<(String, String)>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Run in a tmux window rather than a bare detached process
        #[arg(long)]
        tmux: bool,
        /// Isolate the worker in a fresh git worktree (implies --tmux-or-bare unchanged)
        #[arg(long)]
        worktree: bool,
        #[arg(long, requires = "worktree")]
        branch: Option<String>,
        /// Repository the worktree is created from (default: --cwd)
        #[arg(long)]
        repo: Option<PathBuf>,
        /// Block until the worker signals readiness before returning
        #[arg(long)]
        ready_wait: bool,
        #[arg(last = true)]
        cmd: Vec<String>,
    },
    /// List every worker and its live status
    Ls,
    /// Show one worker's live status
    Status { name: String },
    /// Send literal text to a tmux-backed worker
    Send {
        name: String,
        text: String,
        #[arg(long)]
        no_enter: bool,
    },
    /// Send Ctrl-C to a tmux-backed worker
    Interrupt { name: String },
    /// Send Ctrl-D (EOF) to a tmux-backed worker
    Eof { name: String },
    /// Attach this terminal to a worker's tmux window
    Attach { name: String },
    /// Print a worker's logs (bare-process stdout/stderr)
    Logs { name: String },
    /// Snapshot a worker's current pane
    Peek {
        name: String,
        #[arg(long, default_value_t = 0)]
        lines: u32,
    },
    /// Kill a worker (or every worker with --all)
    Kill {
        name: Option<String>,
        #[arg(long)]
        all: bool,
    },
    /// Block until a worker stops (or the timeout elapses)
    Wait {
        name: String,
        #[arg(long, default_value_t = 3600)]
        timeout_secs: u64,
    },
    /// Remove a stopped worker's record, logs, and worktree
    Clean {
        name: Option<String>,
        #[arg(long)]
        all: bool,
    },
    /// Spawn a worker again with its saved cmd/cwd/env/isolation
    Respawn { name: String },
    /// Autonomous re-prompt loop on top of a tmux-backed worker
    Ralph {
        #[command(subcommand)]
        command: ralph_cli::RalphCommand,
    },
}

/// Exit code 2 is reserved for `status`/`peek`; every other command maps
/// `NotFound` to the generic exit code 1 via `CliError`'s blanket `From`.
fn not_found_as_code_2(e: swarm_engine::EngineError) -> CliError {
    if e.is_not_found() {
        CliError::not_found(e.to_string())
    } else {
        CliError::generic(e.to_string())
    }
}

fn parse_env_kv(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) => Ok((k.to_string(), v.to_string())),
        None => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = EngineConfig::resolve(cli.state_dir);
    let cfg = match cli.tmux_socket {
        Some(socket) => cfg.with_tmux_socket(socket),
        None => cfg,
    };

    if let Err(e) = run(cfg, cli.command).await {
        eprintln!("swarm: error: {e}");
        std::process::exit(e.code);
    }
}

async fn run(cfg: EngineConfig, command: Command) -> Result<(), CliError> {
    let store = StateStore::open(&cfg.state_dir).map_err(|e| CliError::generic(e.to_string()))?;
    let tmux = match &cfg.tmux_socket {
        Some(socket) => Tmux::with_socket(socket.clone()),
        None => Tmux::new(),
    };

    match command {
        Command::Spawn { name, cwd, env, tags, tmux: use_tmux, worktree, branch, repo, ready_wait, cmd } => {
            if cmd.is_empty() {
                return Err(CliError::generic("missing command; pass `-- <cmd...>`"));
            }
            let cwd = cwd.unwrap_or(std::env::current_dir().map_err(|e| CliError::generic(e.to_string()))?);
            let worktree_req = if worktree {
                let base_repo = repo.unwrap_or_else(|| cwd.clone());
                let branch = branch.ok_or_else(|| CliError::generic("--worktree requires --branch"))?;
                Some(WorktreeRequest { branch, base_repo })
            } else {
                None
            };
            let req = SpawnRequest {
                name,
                cmd,
                cwd,
                env: env.into_iter().collect::<BTreeMap<_, _>>(),
                tags: tags.into_iter().collect::<BTreeSet<_>>(),
                use_tmux: use_tmux || worktree_req.is_some(),
                worktree: worktree_req,
                ready_wait,
                metadata: Default::default(),
            };
            let record = swarm_engine::spawn(&cfg, &store, &tmux, req).await?;
            println!("spawned {:?} ({})", record.name, record.status);
        }
        Command::Ls => {
            let workers = swarm_engine::ls(&store, &tmux).await?;
            output::print_workers(&workers);
        }
        Command::Status { name } => {
            let record = swarm_engine::worker_status(&store, &tmux, &name).await.map_err(not_found_as_code_2)?;
            println!("{}: {}", record.name, record.status);
        }
        Command::Send { name, text, no_enter } => {
            swarm_engine::send(&store, &tmux, &name, &text, !no_enter).await?;
        }
        Command::Interrupt { name } => {
            swarm_engine::interrupt(&store, &tmux, &name).await?;
        }
        Command::Eof { name } => {
            swarm_engine::eof(&store, &tmux, &name).await?;
        }
        Command::Attach { name } => {
            let record = swarm_engine::worker_status(&store, &tmux, &name).await?;
            let target = record.tmux.ok_or_else(|| CliError::generic(format!("worker {name:?} is not multiplexer-backed")))?;
            let mut args = vec!["attach-session".to_string(), "-t".to_string(), format!("{}:{}", target.session, target.window)];
            if let Some(socket) = &target.socket {
                args.splice(0..0, ["-L".to_string(), socket.clone()]);
            }
            let status = std::process::Command::new("tmux").args(&args).status().map_err(|e| CliError::generic(e.to_string()))?;
            if !status.success() {
                return Err(CliError::generic("tmux attach-session failed"));
            }
        }
        Command::Logs { name } => {
            let (stdout, stderr) = swarm_engine::logs(&cfg, &store, &name).await?;
            print!("{stdout}");
            eprint!("{stderr}");
        }
        Command::Peek { name, lines } => {
            let text = swarm_engine::peek(&store, &tmux, &name, lines).await.map_err(not_found_as_code_2)?;
            print!("{text}");
        }
        Command::Kill { name, all } => {
            let names = resolve_batch_names(&store, &tmux, name, all, WorkerStatusFilter::Running).await?;
            let mut failures = Vec::new();
            for name in &names {
                match swarm_engine::kill(&store, &tmux, name).await {
                    Ok(()) => println!("{name}: ok"),
                    Err(e) => failures.push(format!("{name}: {e}")),
                }
            }
            report_batch(&names, failures)?;
        }
        Command::Wait { name, timeout_secs } => {
            let status = swarm_engine::wait(&store, &tmux, &name, Duration::from_secs(timeout_secs), Duration::from_millis(500)).await?;
            println!("{name}: {status}");
            if status == swarm_core::WorkerStatus::Running {
                return Err(CliError::generic(format!("worker {name:?} did not stop within {timeout_secs}s")));
            }
        }
        Command::Clean { name, all } => {
            let names = resolve_batch_names(&store, &tmux, name, all, WorkerStatusFilter::Stopped).await?;
            let mut failures = Vec::new();
            for name in &names {
                match swarm_engine::clean(&cfg, &store, &tmux, name).await {
                    Ok(()) => println!("{name}: ok"),
                    Err(e) => failures.push(format!("{name}: {e}")),
                }
            }
            report_batch(&names, failures)?;
        }
        Command::Respawn { name } => {
            let record = swarm_engine::respawn(&cfg, &store, &tmux, &name).await?;
            println!("respawned {:?} ({})", record.name, record.status);
        }
        Command::Ralph { command } => ralph_cli::handle(&cfg, &store, &tmux, command).await?,
    }
    Ok(())
}

enum WorkerStatusFilter {
    Running,
    Stopped,
}

/// Resolve a single `--name`, or every worker matching `filter` when
/// `--all` is given.
async fn resolve_batch_names(
    store: &StateStore,
    tmux: &Tmux,
    name: Option<String>,
    all: bool,
    filter: WorkerStatusFilter,
) -> Result<Vec<String>, CliError> {
    if all {
        let workers = swarm_engine::ls(store, tmux).await?;
        let mut names = Vec::new();
        for w in workers {
            let matches = match filter {
                WorkerStatusFilter::Running => w.status == swarm_core::WorkerStatus::Running,
                WorkerStatusFilter::Stopped => w.status != swarm_core::WorkerStatus::Running,
            };
            if matches {
                names.push(w.name);
            } else if matches!(filter, WorkerStatusFilter::Stopped) {
                eprintln!("swarm: warning: skipping {:?} (still running)", w.name);
            }
        }
        Ok(names)
    } else {
        Ok(vec![name.ok_or_else(|| CliError::generic("--name or --all is required"))?])
    }
}

/// Per spec.md §7, batch commands never abort early — every item is
/// attempted and failures are summarized at the end.
fn report_batch(names: &[String], failures: Vec<String>) -> Result<(), CliError> {
    if !failures.is_empty() {
        return Err(CliError::generic(format!("{}/{} failed: {}", failures.len(), names.len(), failures.join("; "))));
    }
    Ok(())
}
