//! Signal Graph CLI.
//!
//! # Commands
//!
//! - `run`: feed a JSONL event stream through the engine (offline
//!   judgments come from a scripted file)
//! - `replay`: rebuild graph state from a JSONL audit log and summarize it
//! - `snapshot`: rebuild from an audit log and export a serializable
//!   point-in-time graph view
//!
//! Configuration and I/O failures at startup exit non-zero; everything
//! downstream is handled (and audited) by the engine itself.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Signal Graph - causal graph engine over market events
#[derive(Parser)]
#[command(name = "signal-graph")]
#[command(version = "0.1.0")]
#[command(about = "Live decaying causal graph over market events, with directional alerts")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a JSONL event stream through the full pipeline
    Run(commands::run::RunArgs),
    /// Rebuild graph state from an audit log and print a summary
    Replay(commands::replay::ReplayArgs),
    /// Rebuild from an audit log and write a graph snapshot JSON
    Snapshot(commands::snapshot::SnapshotArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Replay(args) => commands::replay::execute(args),
        Commands::Snapshot(args) => commands::snapshot::execute(args),
    }
}
