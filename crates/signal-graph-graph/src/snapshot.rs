//! Point-in-time serializable graph views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use signal_graph_core::types::{CausalEdge, Event, NodeClass};

use crate::decay::decayed_weight;

/// A copy-on-read view of the graph for export and visualization.
///
/// Nodes are ordered by timestamp, edges by key, so two snapshots of equal
/// state serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub taken_at: DateTime<Utc>,
    pub nodes: Vec<Event>,
    pub edges: Vec<CausalEdge>,
}

impl GraphSnapshot {
    /// Decayed weight of each edge as of `taken_at`, paired with the edge.
    pub fn decayed_edges(&self) -> impl Iterator<Item = (&CausalEdge, f32)> {
        self.edges.iter().map(move |edge| {
            let w = decayed_weight(edge.weight, edge.last_updated, self.taken_at, edge.half_life_secs);
            (edge, w)
        })
    }

    /// Edges whose effect class matches `effect`.
    pub fn edges_into<'a>(&'a self, effect: &'a NodeClass) -> impl Iterator<Item = &'a CausalEdge> {
        self.edges.iter().filter(move |e| &e.key.effect == effect)
    }
}
