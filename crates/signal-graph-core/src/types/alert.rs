//! Immutable alert records, the inference engine's output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::EventId;

/// Alert direction: the sign of the net edge contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => f.write_str("UP"),
            Self::Down => f.write_str("DOWN"),
        }
    }
}

/// A directional alert for a ticker over a horizon. Append-only, written
/// once per qualifying inference, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: Uuid,
    pub ticker: String,
    pub ts: DateTime<Utc>,
    /// Forward window the estimate covers, in minutes.
    pub horizon_minutes: u32,
    /// Calibrated probability of a directional move, in [0, 1].
    pub probability: f64,
    /// Expected move magnitude in volatility units.
    pub expected_sigma: f64,
    pub direction: Direction,
    pub rationale: String,
    /// The price event whose arrival triggered this inference.
    pub triggering_event_id: EventId,
}
