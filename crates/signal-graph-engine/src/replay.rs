//! Rebuild graph state from a JSONL audit log.
//!
//! The audit log is the system of record: folding its state-bearing
//! records reproduces the writer's graph field for field, with no
//! recomputation and no dependence on when the replay runs.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use signal_graph_core::audit::{read_jsonl_records, AuditOperation, MemoryAuditLog};
use signal_graph_core::config::{DecayConfig, WeightConfig};
use signal_graph_graph::{GraphResult, GraphStore};

/// Counters from one replay pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub records: usize,
    pub nodes_inserted: usize,
    pub edges_upserted: usize,
    pub edges_pruned: usize,
    pub alerts_emitted: usize,
    pub judgments_rejected: usize,
}

/// Rebuild a [`GraphStore`] from the audit log at `path`.
///
/// The returned store appends any future records to a fresh in-memory
/// log; replay itself writes nothing.
pub fn rebuild_from_log(
    path: impl AsRef<Path>,
    weights: WeightConfig,
    decay: DecayConfig,
) -> GraphResult<(GraphStore, ReplayStats)> {
    let records = read_jsonl_records(path.as_ref()).map_err(signal_graph_graph::GraphError::Audit)?;

    let mut stats = ReplayStats {
        records: records.len(),
        ..ReplayStats::default()
    };
    for record in &records {
        match &record.operation {
            AuditOperation::NodeInserted { .. } => stats.nodes_inserted += 1,
            AuditOperation::EdgeUpserted { .. } => stats.edges_upserted += 1,
            AuditOperation::EdgePruned { .. } => stats.edges_pruned += 1,
            AuditOperation::AlertEmitted { .. } => stats.alerts_emitted += 1,
            AuditOperation::JudgmentRejected { .. } => stats.judgments_rejected += 1,
            _ => {}
        }
    }

    let store = GraphStore::replay(weights, decay, Arc::new(MemoryAuditLog::new()), &records)?;
    info!(
        records = stats.records,
        nodes = store.node_count(),
        edges = store.edge_count(),
        "rebuilt graph from audit log"
    );
    Ok((store, stats))
}
