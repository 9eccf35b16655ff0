//! `replay`: rebuild graph state from an audit log.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use signal_graph_engine::rebuild_from_log;

#[derive(Args)]
pub struct ReplayArgs {
    /// JSONL audit log to fold
    #[arg(long)]
    audit: PathBuf,

    /// TOML configuration file (defaults to the layered config)
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn execute(args: ReplayArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let (store, stats) = rebuild_from_log(&args.audit, config.weights, config.decay)?;

    info!(
        records = stats.records,
        nodes_inserted = stats.nodes_inserted,
        edges_upserted = stats.edges_upserted,
        edges_pruned = stats.edges_pruned,
        alerts_emitted = stats.alerts_emitted,
        judgments_rejected = stats.judgments_rejected,
        live_nodes = store.node_count(),
        live_edges = store.edge_count(),
        "replay complete"
    );
    Ok(())
}
