//! The single-writer causal graph store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use signal_graph_core::audit::{AuditLog, AuditOperation, AuditRecord};
use signal_graph_core::config::{DecayConfig, WeightConfig};
use signal_graph_core::types::{
    CandidatePair, CausalEdge, EdgeKey, Event, EventId, NodeClass, RawJudgment, RejectReason,
};

use crate::decay::decayed_weight;
use crate::error::{GraphError, GraphResult};
use crate::snapshot::GraphSnapshot;

/// Outcome of feeding one judgment through the update path.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeUpdateResult {
    /// No mutation: the judgment was rejected (no edge, out of domain, or
    /// below the minimum-to-add threshold).
    Rejected { reason: RejectReason },

    /// The blended weight was upserted. `flipped` marks a polarity flip.
    Upserted { edge: CausalEdge, flipped: bool },

    /// The blended weight fell below the prune threshold; the edge (if it
    /// existed) was removed.
    Pruned { key: EdgeKey, weight: f32 },
}

#[derive(Default)]
struct GraphState {
    nodes: HashMap<EventId, Event>,
    edges: HashMap<EdgeKey, CausalEdge>,
    /// Effect-class index for incoming-edge lookups at inference time.
    by_effect: HashMap<NodeClass, HashSet<EdgeKey>>,
}

impl GraphState {
    fn index_edge(&mut self, key: &EdgeKey) {
        self.by_effect
            .entry(key.effect.clone())
            .or_default()
            .insert(key.clone());
    }

    fn unindex_edge(&mut self, key: &EdgeKey) {
        if let Some(set) = self.by_effect.get_mut(&key.effect) {
            set.remove(key);
            if set.is_empty() {
                self.by_effect.remove(&key.effect);
            }
        }
    }
}

/// Directed, signed, weighted multigraph-by-pair-key with decay and
/// pruning.
///
/// All mutation goes through [`GraphStore::apply`] (judgments),
/// [`GraphStore::insert_event`] (nodes), and [`GraphStore::decay_sweep`]
/// (pruning); each takes the writer lock for the whole
/// read-decay-blend-write, so concurrent judgments for the same pair class
/// serialize instead of double-counting decay. The lock is never held
/// across the judgment boundary -- judgments are obtained first, applied
/// after.
///
/// Stored weights stay exact at their `last_updated` instant; readers
/// decay lazily. Exponential decay composes, so lazy reads and the
/// eager prune sweep agree on every edge's effective weight.
pub struct GraphStore {
    weights: WeightConfig,
    decay: DecayConfig,
    audit: Arc<dyn AuditLog>,
    state: RwLock<GraphState>,
}

impl GraphStore {
    pub fn new(weights: WeightConfig, decay: DecayConfig, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            weights,
            decay,
            audit,
            state: RwLock::new(GraphState::default()),
        }
    }

    // ========================================================================
    // NODES
    // ========================================================================

    /// Insert an event node. Idempotent: re-inserting an already-known id
    /// is a no-op (events are immutable), so replayed or duplicated
    /// ingestion cannot distort the graph.
    pub fn insert_event(&self, event: Event) -> GraphResult<bool> {
        {
            let mut state = self.state.write();
            if state.nodes.contains_key(&event.id) {
                debug!(event_id = %event.id, "event already known, skipping insert");
                return Ok(false);
            }
            state.nodes.insert(event.id, event.clone());
        }
        self.audit.append(AuditOperation::NodeInserted { event })?;
        Ok(true)
    }

    /// Look up a node by id.
    pub fn event(&self, id: &EventId) -> Option<Event> {
        self.state.read().nodes.get(id).cloned()
    }

    /// Events with `ts` in `[as_of - lookback, as_of)`, newest first.
    /// This is the gate's recent-events window.
    pub fn events_window(&self, as_of: DateTime<Utc>, lookback: chrono::Duration) -> Vec<Event> {
        let floor = as_of - lookback;
        let state = self.state.read();
        let mut events: Vec<Event> = state
            .nodes
            .values()
            .filter(|ev| ev.ts < as_of && ev.ts >= floor)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.ts.cmp(&a.ts).then(a.id.cmp(&b.id)));
        events
    }

    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.read().edges.len()
    }

    // ========================================================================
    // UPDATE PATH
    // ========================================================================

    /// Apply an external judgment for a candidate pair.
    ///
    /// The whole sequence -- validate, decay the stored weight to `now`,
    /// blend, resolve polarity, prune-or-upsert -- runs under the writer
    /// lock, and an audit record is appended whatever the outcome.
    ///
    /// `observed_sigma` is the magnitude signal of the effect-side price
    /// evidence, when the triggering effect event had one; it rides on the
    /// edge for the inference engine's expected-magnitude estimate.
    pub fn apply(
        &self,
        pair: &CandidatePair,
        raw: &RawJudgment,
        observed_sigma: Option<f32>,
        now: DateTime<Utc>,
    ) -> GraphResult<EdgeUpdateResult> {
        if pair.cause_id == pair.effect_id {
            return Err(GraphError::InvariantViolation {
                context: format!("self-edge candidate for event {}", pair.cause_id),
            });
        }

        // Validation happens outside the lock; rejected judgments never
        // touch graph state.
        let judgment = match raw.validate() {
            Ok(j) if !j.edge => Err(RejectReason::NoEdge),
            Ok(j) if j.confidence < self.weights.min_confidence_to_add => {
                Err(RejectReason::BelowMinConfidence {
                    confidence: j.confidence,
                    minimum: self.weights.min_confidence_to_add,
                })
            }
            other => other,
        };

        let judgment = match judgment {
            Ok(j) => j,
            Err(reason) => {
                match reason {
                    // Out-of-domain values mean the capability is misbehaving.
                    RejectReason::ConfidenceOutOfRange { .. }
                    | RejectReason::PolarityOutOfRange { .. } => warn!(
                        cause = %pair.cause_id,
                        effect = %pair.effect_id,
                        %reason,
                        "invalid judgment rejected"
                    ),
                    // No-edge and weak verdicts are ordinary decisions.
                    _ => debug!(
                        cause = %pair.cause_id,
                        effect = %pair.effect_id,
                        %reason,
                        "judgment rejected"
                    ),
                }
                self.audit.append(AuditOperation::JudgmentRejected {
                    cause_id: pair.cause_id,
                    effect_id: pair.effect_id,
                    reason,
                })?;
                return Ok(EdgeUpdateResult::Rejected { reason });
            }
        };

        let key = pair.edge_key();
        let half_life_secs = self
            .decay
            .pair_half_life_secs(pair.edge_kind.cause, pair.edge_kind.effect);

        let (result, operation) = {
            let mut state = self.state.write();

            let existing = state.edges.get(&key);
            let w_now = match existing {
                Some(edge) => decayed_weight(edge.weight, edge.last_updated, now, edge.half_life_secs),
                None => self.weights.initial_edge_weight,
            };

            // The single authoritative weight update, identical whether the
            // edge existed or not.
            let alpha = self.weights.alpha_blend;
            let w_new = alpha * judgment.confidence + (1.0 - alpha) * w_now;

            let (polarity, support_count, created_at, flipped) = match existing {
                None => (judgment.polarity, 1, now, false),
                Some(edge) if edge.polarity == judgment.polarity => {
                    (edge.polarity, edge.support_count + 1, edge.created_at, false)
                }
                Some(edge) if judgment.confidence > w_now + self.weights.flip_margin => {
                    // A disagreeing judgment decisively stronger than the
                    // decayed stored belief supersedes it.
                    (judgment.polarity, 1, edge.created_at, true)
                }
                Some(edge) => {
                    // Conflicting but not decisive: the blend above already
                    // pulled the weight down; polarity stands.
                    (edge.polarity, edge.support_count, edge.created_at, false)
                }
            };

            if w_new < self.decay.prune_threshold {
                if state.edges.remove(&key).is_some() {
                    state.unindex_edge(&key);
                }
                (
                    EdgeUpdateResult::Pruned { key: key.clone(), weight: w_new },
                    AuditOperation::EdgePruned { key, weight: w_new },
                )
            } else {
                let volatility = observed_sigma.or(existing.and_then(|e| e.volatility));
                let edge = CausalEdge {
                    key: key.clone(),
                    polarity,
                    weight: w_new,
                    support_count,
                    created_at,
                    last_updated: now,
                    half_life_secs,
                    volatility,
                    last_cause_id: pair.cause_id,
                    last_effect_id: pair.effect_id,
                };
                state.edges.insert(key.clone(), edge.clone());
                state.index_edge(&key);
                (
                    EdgeUpdateResult::Upserted { edge: edge.clone(), flipped },
                    AuditOperation::EdgeUpserted {
                        edge,
                        flipped,
                        rationale: judgment.rationale.clone(),
                    },
                )
            }
        };

        if let EdgeUpdateResult::Upserted { edge, flipped } = &result {
            info!(
                key = %edge.key,
                weight = edge.weight,
                polarity = %edge.polarity,
                support = edge.support_count,
                flipped,
                "edge upserted"
            );
        }
        self.audit.append(operation)?;
        Ok(result)
    }

    /// Remove every edge whose decayed weight at `now` has fallen below
    /// the prune threshold. Stored weights are left untouched -- readers
    /// decay lazily and decay composes, so the sweep only ever deletes.
    pub fn decay_sweep(&self, now: DateTime<Utc>) -> GraphResult<Vec<EdgeKey>> {
        let pruned: Vec<(EdgeKey, f32)> = {
            let mut state = self.state.write();
            let dead: Vec<(EdgeKey, f32)> = state
                .edges
                .iter()
                .filter_map(|(key, edge)| {
                    let w = decayed_weight(edge.weight, edge.last_updated, now, edge.half_life_secs);
                    (w < self.decay.prune_threshold).then(|| (key.clone(), w))
                })
                .collect();
            for (key, _) in &dead {
                state.edges.remove(key);
                state.unindex_edge(key);
            }
            dead
        };

        if !pruned.is_empty() {
            info!(pruned = pruned.len(), "decay sweep pruned edges");
        }
        let mut keys = Vec::with_capacity(pruned.len());
        for (key, weight) in pruned {
            self.audit.append(AuditOperation::EdgePruned { key: key.clone(), weight })?;
            keys.push(key);
        }
        Ok(keys)
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Active incoming edges for an effect class, with each edge's decayed
    /// weight as of `at`. Edges already below the prune threshold at `at`
    /// are omitted even if the sweep has not caught them yet.
    pub fn active_edges_into(&self, effect: &NodeClass, at: DateTime<Utc>) -> Vec<(CausalEdge, f32)> {
        let state = self.state.read();
        let Some(keys) = state.by_effect.get(effect) else {
            return Vec::new();
        };
        let mut edges: Vec<(CausalEdge, f32)> = keys
            .iter()
            .filter_map(|key| state.edges.get(key))
            .filter_map(|edge| {
                let w = decayed_weight(edge.weight, edge.last_updated, at, edge.half_life_secs);
                (w >= self.decay.prune_threshold).then(|| (edge.clone(), w))
            })
            .collect();
        // Deterministic order for deterministic inference.
        edges.sort_by(|(a, _), (b, _)| a.key.to_string().cmp(&b.key.to_string()));
        edges
    }

    /// Point-in-time serializable view of nodes and edges. Copy-on-read:
    /// taken under the read lock without blocking ongoing updates for
    /// longer than the copy.
    pub fn snapshot(&self, taken_at: DateTime<Utc>) -> GraphSnapshot {
        let state = self.state.read();
        let mut nodes: Vec<Event> = state.nodes.values().cloned().collect();
        let mut edges: Vec<CausalEdge> = state.edges.values().cloned().collect();
        drop(state);
        nodes.sort_by(|a, b| a.ts.cmp(&b.ts).then(a.id.cmp(&b.id)));
        edges.sort_by(|a, b| a.key.to_string().cmp(&b.key.to_string()));
        GraphSnapshot { taken_at, nodes, edges }
    }

    /// Current edge record for a key, undecayed.
    pub fn edge(&self, key: &EdgeKey) -> Option<CausalEdge> {
        self.state.read().edges.get(key).cloned()
    }

    // ========================================================================
    // REPLAY
    // ========================================================================

    /// Rebuild a store by folding an audit record stream, in order.
    ///
    /// Only the state-bearing operations matter: `NodeInserted`,
    /// `EdgeUpserted` (which carries the full post-blend edge, so nothing
    /// is recomputed), and `EdgePruned`. The rebuilt store equals the one
    /// that wrote the log, field for field.
    ///
    /// `audit` receives future appends only; replay itself writes nothing.
    pub fn replay(
        weights: WeightConfig,
        decay: DecayConfig,
        audit: Arc<dyn AuditLog>,
        records: &[AuditRecord],
    ) -> GraphResult<Self> {
        let mut state = GraphState::default();
        for record in records {
            match &record.operation {
                AuditOperation::NodeInserted { event } => {
                    state.nodes.insert(event.id, event.clone());
                }
                AuditOperation::EdgeUpserted { edge, .. } => {
                    let key = edge.key.clone();
                    state.edges.insert(key.clone(), edge.clone());
                    state.index_edge(&key);
                }
                AuditOperation::EdgePruned { key, .. } => {
                    if state.edges.remove(key).is_some() {
                        state.unindex_edge(key);
                    } else if !state.nodes.is_empty() || !state.edges.is_empty() {
                        // Pruning an unknown key is tolerable (the writer
                        // may prune a never-inserted new edge) but worth a
                        // trace when the stream looks otherwise sane.
                        warn!(seq = record.seq, %key, "replayed prune of unknown edge key");
                    }
                }
                _ => {}
            }
        }
        Ok(Self {
            weights,
            decay,
            audit,
            state: RwLock::new(state),
        })
    }
}
