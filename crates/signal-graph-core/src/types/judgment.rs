//! The judgment contract with the external reasoning capability.
//!
//! The multi-expert debate and judge mechanism is a black box to this
//! system. Whatever it does internally, it returns a [`RawJudgment`]: does
//! a causal edge exist, with which polarity, at what confidence. The core
//! validates that payload before any graph mutation; out-of-domain values
//! are rejected outright, never clamped.

use serde::{Deserialize, Serialize};

/// Signed direction of a causal edge's effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Bearish,
    Neutral,
    Bullish,
}

impl Polarity {
    /// Wire representation: -1, 0, +1.
    pub fn as_i8(&self) -> i8 {
        match self {
            Self::Bearish => -1,
            Self::Neutral => 0,
            Self::Bullish => 1,
        }
    }

    /// Parse the wire representation; anything outside {-1, 0, 1} is
    /// out of domain.
    pub fn from_i8(v: i8) -> Option<Self> {
        match v {
            -1 => Some(Self::Bearish),
            0 => Some(Self::Neutral),
            1 => Some(Self::Bullish),
            _ => None,
        }
    }

    /// The signed multiplier applied to a decayed edge weight.
    pub fn signum(&self) -> f32 {
        self.as_i8() as f32
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearish => f.write_str("bearish"),
            Self::Neutral => f.write_str("neutral"),
            Self::Bullish => f.write_str("bullish"),
        }
    }
}

/// Unvalidated judgment payload as returned by the adapter boundary.
///
/// Polarity rides as a raw integer so an adapter emitting `2` is caught by
/// validation rather than by deserialization, and the rejection is audited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawJudgment {
    /// Whether the judge asserts a causal edge exists.
    pub edge: bool,
    /// Claimed polarity: -1, 0, or +1.
    pub polarity: i8,
    /// Claimed confidence, must lie in [0, 1].
    pub confidence: f32,
    /// One-line justification from the judge.
    #[serde(default)]
    pub rationale: String,
}

impl RawJudgment {
    /// Validate domains and produce a checked [`Judgment`].
    ///
    /// Out-of-range values are rejected, not clamped: a confidence of 1.2
    /// or a polarity of 2 means the upstream capability is misbehaving and
    /// its verdict cannot be trusted at any clamped value.
    pub fn validate(&self) -> Result<Judgment, RejectReason> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(RejectReason::ConfidenceOutOfRange {
                confidence: self.confidence,
            });
        }
        let polarity = Polarity::from_i8(self.polarity)
            .ok_or(RejectReason::PolarityOutOfRange { polarity: self.polarity })?;
        Ok(Judgment {
            edge: self.edge,
            polarity,
            confidence: self.confidence,
            rationale: self.rationale.clone(),
        })
    }
}

/// A validated judgment, safe to feed into the graph store update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub edge: bool,
    pub polarity: Polarity,
    pub confidence: f32,
    pub rationale: String,
}

/// Why a judgment was rejected before or during the graph update.
///
/// Rejections are decisions, not errors: each is audited so a quiet day is
/// distinguishable from a silently broken pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// The judge said no edge exists.
    NoEdge,
    /// Confidence outside [0, 1] (or not finite).
    ConfidenceOutOfRange { confidence: f32 },
    /// Polarity outside {-1, 0, +1}.
    PolarityOutOfRange { polarity: i8 },
    /// Confidence below the configured minimum-to-add threshold.
    BelowMinConfidence { confidence: f32, minimum: f32 },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoEdge => f.write_str("judge found no edge"),
            Self::ConfidenceOutOfRange { confidence } => {
                write!(f, "confidence {} outside [0, 1]", confidence)
            }
            Self::PolarityOutOfRange { polarity } => {
                write!(f, "polarity {} outside {{-1, 0, 1}}", polarity)
            }
            Self::BelowMinConfidence { confidence, minimum } => {
                write!(f, "confidence {:.2} below minimum {:.2}", confidence, minimum)
            }
        }
    }
}
