//! `snapshot`: rebuild from an audit log and export a graph view.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use tracing::info;

use signal_graph_engine::rebuild_from_log;

#[derive(Args)]
pub struct SnapshotArgs {
    /// JSONL audit log to fold
    #[arg(long)]
    audit: PathBuf,

    /// Output path for the snapshot JSON
    #[arg(long)]
    out: PathBuf,

    /// TOML configuration file (defaults to the layered config)
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn execute(args: SnapshotArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let (store, _) = rebuild_from_log(&args.audit, config.weights, config.decay)?;

    let snapshot = store.snapshot(Utc::now());
    let json = serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?;
    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&args.out, json)
        .with_context(|| format!("writing {}", args.out.display()))?;

    info!(
        out = %args.out.display(),
        nodes = snapshot.nodes.len(),
        edges = snapshot.edges.len(),
        "snapshot written"
    );
    Ok(())
}
