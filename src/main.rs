//! rigyard - spawn orchestrator for ephemeral rig workers.
//!
//! ## Usage
//!
//! ```bash
//! # Spawn with an auto-generated worker name
//! rigyard spawn demo-rig --issue gt-abc
//!
//! # Spawn a named worker
//! rigyard spawn demo-rig/Toast --issue gt-def
//!
//! # Free-form task
//! rigyard spawn demo-rig/Nux -m "Fix the tests"
//!
//! # Assign work without starting a session
//! rigyard spawn demo-rig --issue gt-abc --no-start
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rigyard_core::config::RigsConfig;
use rigyard_core::{init_logging, workspace, Result};
use rigyard_worker::{
    parse_address, BeadsCli, GitWorktrees, SessionOrchestrator, SessionOutcome, SpawnRequest,
    Spawner, TmuxDriver,
};
use tracing::{error, info};

/// rigyard - spawn workers with work assignments
///
/// Workers (polecats) are ephemeral: each spawn hands out a fresh checkout
/// of the rig's main line, attaches exactly one assignment, and starts an
/// interactive session.
#[derive(Parser, Debug)]
#[command(name = "rigyard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.rigyard/logs/)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Spawn a worker with a work assignment
    #[command(alias = "sp")]
    Spawn {
        /// Worker address: <rig> or <rig>/<worker>
        address: String,

        /// Issue ID to assign
        #[arg(long)]
        issue: Option<String>,

        /// Free-form task description
        #[arg(short, long)]
        message: Option<String>,

        /// Assign work but don't start a session
        #[arg(long)]
        no_start: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(cli.log_dir.clone(), cli.verbose > 0) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::from(1);
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("spawn failed: {e}");
            eprintln!("Error: {e}");
            if let Some(guidance) = e.guidance() {
                eprintln!("  {guidance}");
            }
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Spawn {
            address,
            issue,
            message,
            no_start,
        } => spawn(&address, issue, message, no_start).await,
    }
}

async fn spawn(
    address: &str,
    issue: Option<String>,
    message: Option<String>,
    no_start: bool,
) -> Result<()> {
    // Validated before touching the workspace or any external subsystem
    if issue.is_none() && message.is_none() {
        return Err(rigyard_core::RigyardError::MissingAssignment);
    }

    let address = parse_address(address)?;

    let root = workspace::find_from_cwd()?;
    let rigs = RigsConfig::load(&workspace::rigs_config_path(&root))?;
    let rig = rigs.resolve(&root, &address.rig)?;
    info!(rig = %rig.name, path = %rig.path.display(), "resolved rig");

    let spawner = Spawner::new(
        rig.clone(),
        GitWorktrees::new(rig.clone()),
        BeadsCli::new(),
        SessionOrchestrator::new(TmuxDriver::new(rig)),
    );

    // Resolve the name up front so the user sees it while the slow
    // checkout/session steps run
    let (worker, generated) = spawner.resolve_name(address.worker.as_deref()).await?;
    if generated {
        println!("Generated worker name: {worker}");
    }

    let outcome = spawner
        .spawn(SpawnRequest {
            worker: Some(worker),
            issue,
            message,
            no_start,
        })
        .await?;

    println!(
        "Assigned {} to {}/{}",
        outcome.assignment_id, outcome.rig, outcome.worker
    );

    match (outcome.session, outcome.session_name) {
        (Some(SessionOutcome::Started), Some(session)) => {
            println!("Session started. Attach with: tmux attach -t {session}");
        }
        (Some(SessionOutcome::Reused), Some(session)) => {
            println!("Session already running, context injected. Attach with: tmux attach -t {session}");
        }
        _ => {
            println!("Session not started (--no-start).");
        }
    }

    Ok(())
}
