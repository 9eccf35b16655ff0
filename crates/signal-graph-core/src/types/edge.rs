//! Signed, weighted, decaying causal edges.
//!
//! Edges are keyed by pair class rather than by the originating event pair:
//! `(cause class, effect class, edge kind)`. Repeated evidence between the
//! same classes blends into one record instead of piling up parallel edges,
//! which is what makes conflicting-evidence aggregation and monotone
//! confidence growth possible. The latest supporting event ids are kept on
//! the edge as provenance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{EventId, EventKind};
use super::judgment::Polarity;

/// The class component of an edge key: a ticker or the broad market.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "class", content = "ticker", rename_all = "lowercase")]
pub enum NodeClass {
    /// Market-wide (macro prints, index-level events).
    Market,
    /// A single ticker.
    Ticker(String),
}

impl NodeClass {
    /// Class of an event given its optional ticker.
    pub fn of(ticker: Option<&str>) -> Self {
        match ticker {
            Some(t) => Self::Ticker(t.to_string()),
            None => Self::Market,
        }
    }

    /// The ticker, if this class is one.
    pub fn ticker(&self) -> Option<&str> {
        match self {
            Self::Ticker(t) => Some(t.as_str()),
            Self::Market => None,
        }
    }
}

impl std::fmt::Display for NodeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Market => f.write_str("*market*"),
            Self::Ticker(t) => f.write_str(t),
        }
    }
}

/// The kind of a causal edge, derived from the endpoint event kinds.
///
/// Drives the per-kind temporal lag ceiling at gating time and the decay
/// half-life afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKind {
    pub cause: EventKind,
    pub effect: EventKind,
}

impl EdgeKind {
    pub fn new(cause: EventKind, effect: EventKind) -> Self {
        Self { cause, effect }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.cause, self.effect)
    }
}

/// Arena key for the edge store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub cause: NodeClass,
    pub effect: NodeClass,
    pub kind: EdgeKind,
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} => {} [{}]", self.cause, self.effect, self.kind)
    }
}

/// A live causal edge.
///
/// `weight` is never overwritten directly: every accepted judgment blends
/// into the current decayed weight through the graph store's single update
/// path, so repeated confirmation converges monotonically toward the
/// judgment confidence and disconfirmation pulls it down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalEdge {
    pub key: EdgeKey,

    /// Signed direction of the causal effect.
    pub polarity: Polarity,

    /// Blended, decaying confidence weight in [0, 1].
    pub weight: f32,

    /// Judgments blended into this edge since creation or last polarity
    /// flip.
    pub support_count: u32,

    pub created_at: DateTime<Utc>,

    /// Reference instant for decay: the weight stored above was exact at
    /// this time.
    pub last_updated: DateTime<Utc>,

    /// Decay half-life in seconds, derived from the edge kind at creation.
    pub half_life_secs: f64,

    /// Magnitude signal for inference: sigma of the most recent confirming
    /// price evidence, when any existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f32>,

    /// Provenance: the most recent event pair that supported this edge.
    pub last_cause_id: EventId,
    pub last_effect_id: EventId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn node_class_of_ticker_and_market() {
        assert_eq!(NodeClass::of(Some("NVDA")), NodeClass::Ticker("NVDA".into()));
        assert_eq!(NodeClass::of(None), NodeClass::Market);
        assert_eq!(NodeClass::of(Some("NVDA")).ticker(), Some("NVDA"));
        assert_eq!(NodeClass::Market.ticker(), None);
    }

    #[test]
    fn edge_key_equality_is_by_class_and_kind() {
        let kind = EdgeKind::new(EventKind::News, EventKind::Price);
        let a = EdgeKey {
            cause: NodeClass::Ticker("AAPL".into()),
            effect: NodeClass::Ticker("AAPL".into()),
            kind,
        };
        let b = EdgeKey {
            cause: NodeClass::Ticker("AAPL".into()),
            effect: NodeClass::Ticker("AAPL".into()),
            kind,
        };
        assert_eq!(a, b);

        let c = EdgeKey {
            cause: NodeClass::Market,
            effect: NodeClass::Ticker("AAPL".into()),
            kind,
        };
        assert_ne!(a, c);
    }

    #[test]
    fn edge_serde_roundtrip() {
        let edge = CausalEdge {
            key: EdgeKey {
                cause: NodeClass::Ticker("MSFT".into()),
                effect: NodeClass::Ticker("MSFT".into()),
                kind: EdgeKind::new(EventKind::News, EventKind::Price),
            },
            polarity: Polarity::Bullish,
            weight: 0.42,
            support_count: 3,
            created_at: Utc::now(),
            last_updated: Utc::now(),
            half_life_secs: 3600.0,
            volatility: Some(1.8),
            last_cause_id: Uuid::new_v4(),
            last_effect_id: Uuid::new_v4(),
        };
        let json = serde_json::to_string(&edge).expect("serialize edge");
        let back: CausalEdge = serde_json::from_str(&json).expect("deserialize edge");
        assert_eq!(back, edge);
    }
}
