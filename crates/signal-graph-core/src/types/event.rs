//! Typed, immutable event records forming graph nodes.
//!
//! Events are produced by ingestion collaborators (price bars, news feeds,
//! social aggregators, macro prints) and never mutated afterwards. Each
//! carries a fixed tagged detail variant for its kind rather than an open
//! attribute map, so downstream code gets type-checked access to the signal
//! fields that actually exist for that kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type alias for event identifiers (UUID v4), used as graph node keys.
pub type EventId = Uuid;

/// Discriminant for event records.
///
/// Also the axis for per-kind decay half-lives and temporal lag ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A derived price move (abnormal return, volume spike, gap).
    Price,
    /// A news item tied to a ticker or the broad market.
    News,
    /// A regulatory filing.
    Filing,
    /// Aggregated social chatter for a ticker.
    Social,
    /// A macro data print (rates, CPI, payrolls, ...).
    Macro,
}

impl EventKind {
    /// Stable lowercase name, used in logs and audit payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::News => "news",
            Self::Filing => "filing",
            Self::Social => "social",
            Self::Macro => "macro",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific signal fields.
///
/// One variant per [`EventKind`]; the variant fixes which signals an event
/// can carry, replacing an open `attrs` map with a checked shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EventDetails {
    /// Derived price-move signals.
    Price {
        /// Signed move magnitude in volatility units.
        return_sigma: f32,
        /// Session volume percentile [0, 100].
        volume_percentile: f32,
        /// Opening gap percent, when the move was a gap.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gap_percent: Option<f32>,
    },
    /// News item signals.
    News {
        headline: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        links: Vec<String>,
    },
    /// Regulatory filing signals.
    Filing {
        /// Form type, e.g. "8-K".
        form: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// Aggregated social chatter signals.
    Social {
        /// Mentions in the aggregation window.
        mention_count: u32,
        /// Mean sentiment in [-1, 1].
        sentiment: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        platform: Option<String>,
    },
    /// Macro data print signals.
    Macro {
        /// Series identifier, e.g. "CPIAUCSL".
        series: String,
        value: f64,
        /// Surprise vs. consensus in volatility units.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        surprise_sigma: Option<f32>,
    },
}

impl EventDetails {
    /// The kind this detail variant belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Price { .. } => EventKind::Price,
            Self::News { .. } => EventKind::News,
            Self::Filing { .. } => EventKind::Filing,
            Self::Social { .. } => EventKind::Social,
            Self::Macro { .. } => EventKind::Macro,
        }
    }
}

/// An immutable market event. Graph node.
///
/// # Invariants
///
/// - `id` is globally unique and used as the graph node key.
/// - Timestamps are monotonically non-decreasing within a single ticker's
///   ingested stream per source (enforced by the ingestion collaborators,
///   relied upon by the candidate gate's temporal rule).
/// - Never mutated after creation; retained for the process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (UUID v4), the graph node key.
    pub id: EventId,

    /// Ticker symbol, or `None` for market-wide events (macro prints,
    /// index-level news).
    pub ticker: Option<String>,

    /// When the event occurred (UTC).
    pub ts: DateTime<Utc>,

    /// Short human-readable summary, fed to the judgment capability.
    pub summary: String,

    /// Kind-specific signal fields.
    pub details: EventDetails,
}

impl Event {
    /// Create a ticker-scoped event with a fresh id.
    pub fn new(
        ticker: impl Into<String>,
        ts: DateTime<Utc>,
        summary: impl Into<String>,
        details: EventDetails,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: Some(ticker.into()),
            ts,
            summary: summary.into(),
            details,
        }
    }

    /// Create a market-wide event (no ticker) with a fresh id.
    pub fn market_wide(
        ts: DateTime<Utc>,
        summary: impl Into<String>,
        details: EventDetails,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: None,
            ts,
            summary: summary.into(),
            details,
        }
    }

    /// The event kind, derived from the detail variant.
    pub fn kind(&self) -> EventKind {
        self.details.kind()
    }

    /// Mention count for social events, `None` otherwise.
    pub fn mention_count(&self) -> Option<u32> {
        match self.details {
            EventDetails::Social { mention_count, .. } => Some(mention_count),
            _ => None,
        }
    }

    /// Signed move magnitude for price events, `None` otherwise.
    pub fn return_sigma(&self) -> Option<f32> {
        match self.details {
            EventDetails::Price { return_sigma, .. } => Some(return_sigma),
            _ => None,
        }
    }
}
