//! Candidate cause→effect pairs proposed by the gate.

use serde::{Deserialize, Serialize};

use super::edge::{EdgeKey, EdgeKind, NodeClass};
use super::event::EventId;

/// Which gating rule admitted a candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateReason {
    /// Cause and effect share a ticker.
    SameTicker,
    /// Cross-ticker, authorized by sector co-membership.
    SectorPeer,
    /// Cross-ticker, authorized by an explicit peer/supply-chain relation.
    SupplyChainPeer,
    /// Market-wide cause acting on a ticker.
    MacroToTicker,
    /// One event's text mentions the other's ticker.
    EntityMention,
}

impl std::fmt::Display for GateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SameTicker => "same_ticker",
            Self::SectorPeer => "sector_peer",
            Self::SupplyChainPeer => "supply_chain_peer",
            Self::MacroToTicker => "macro_to_ticker",
            Self::EntityMention => "entity_mention",
        };
        f.write_str(s)
    }
}

/// A proposed directed cause→effect pair, not yet judged.
///
/// Transient: consumed by the judgment boundary immediately after the gate
/// emits it, surviving only in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePair {
    pub cause_id: EventId,
    pub effect_id: EventId,
    /// Class of the cause event (ticker or market-wide).
    pub cause_class: NodeClass,
    /// Class of the effect event.
    pub effect_class: NodeClass,
    /// Kind derived from the two endpoint event kinds.
    pub edge_kind: EdgeKind,
    /// Which rule admitted this pair.
    pub gate_reason: GateReason,
    /// Plausibility score used for fan-out ordering, in [0, 1].
    pub score: f32,
}

impl CandidatePair {
    /// The edge-store key this pair's judgment would blend into.
    pub fn edge_key(&self) -> EdgeKey {
        EdgeKey {
            cause: self.cause_class.clone(),
            effect: self.effect_class.clone(),
            kind: self.edge_kind,
        }
    }
}
