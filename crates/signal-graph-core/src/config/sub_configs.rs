//! Sub-configuration structures for the Signal Graph engine.
//!
//! Each struct is serde-defaulted field by field so partial TOML files and
//! environment overrides compose cleanly with the built-in defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::EventKind;

// ============================================================================
// GATING
// ============================================================================

/// Candidate gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatingConfig {
    /// Fan-out cap: at most this many candidates per new event.
    pub max_candidates_per_event: usize,

    /// Lag ceiling for pairs whose effect is not a price event (minutes).
    pub max_lag_minutes: u32,

    /// Tighter lag ceiling when the effect is a price event (minutes).
    /// A price move reacting to day-old information is not a candidate.
    pub max_price_lag_minutes: u32,

    /// Minimum mention count before a social node may serve as a cause.
    pub social_mention_floor: u32,

    /// Admit cross-ticker pairs within the same sector.
    pub allow_cross_ticker_within_sector: bool,

    /// Admit cross-ticker pairs along explicit peer/supply-chain links.
    pub allow_supply_chain_links: bool,

    /// Admit market-wide (macro) causes for ticker effects.
    pub allow_macro_to_ticker: bool,
}

impl Default for GatingConfig {
    fn default() -> Self {
        Self {
            max_candidates_per_event: 10,
            max_lag_minutes: 24 * 60,
            max_price_lag_minutes: 90,
            social_mention_floor: 25,
            allow_cross_ticker_within_sector: true,
            allow_supply_chain_links: true,
            allow_macro_to_ticker: true,
        }
    }
}

impl GatingConfig {
    /// Lag ceiling for a cause→effect pair, keyed by the effect kind.
    pub fn max_lag(&self, effect: EventKind) -> chrono::Duration {
        let minutes = match effect {
            EventKind::Price => self.max_price_lag_minutes,
            _ => self.max_lag_minutes,
        };
        chrono::Duration::minutes(i64::from(minutes))
    }
}

// ============================================================================
// DECAY
// ============================================================================

/// Per-kind decay half-lives and the prune threshold.
///
/// Price-driven evidence decays fastest; macro evidence slowest. A pair's
/// half-life is the minimum of its endpoints' half-lives -- an edge is only
/// as durable as its most perishable end.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DecayConfig {
    pub price_minutes: f64,
    pub news_minutes: f64,
    pub filing_minutes: f64,
    pub social_minutes: f64,
    pub macro_minutes: f64,

    /// Edges whose decayed weight falls below this are removed.
    pub prune_threshold: f32,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            price_minutes: 24.0 * 60.0,        // 1 day
            news_minutes: 5.0 * 24.0 * 60.0,   // 5 days
            filing_minutes: 10.0 * 24.0 * 60.0, // 10 days
            social_minutes: 2.0 * 24.0 * 60.0, // 2 days
            macro_minutes: 45.0 * 24.0 * 60.0, // 45 days
            prune_threshold: 0.05,
        }
    }
}

impl DecayConfig {
    /// Half-life for a single event kind, in seconds.
    pub fn half_life_secs(&self, kind: EventKind) -> f64 {
        let minutes = match kind {
            EventKind::Price => self.price_minutes,
            EventKind::News => self.news_minutes,
            EventKind::Filing => self.filing_minutes,
            EventKind::Social => self.social_minutes,
            EventKind::Macro => self.macro_minutes,
        };
        minutes * 60.0
    }

    /// Half-life for an edge between two kinds: the faster endpoint wins.
    pub fn pair_half_life_secs(&self, cause: EventKind, effect: EventKind) -> f64 {
        self.half_life_secs(cause).min(self.half_life_secs(effect))
    }
}

// ============================================================================
// WEIGHTS
// ============================================================================

/// Weight blending and polarity-flip parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Blend factor: `w_new = alpha * confidence + (1 - alpha) * w_now`.
    pub alpha_blend: f32,

    /// Prior weight used as `w_now` when the edge does not exist yet.
    pub initial_edge_weight: f32,

    /// Judgments below this confidence never mutate the graph.
    pub min_confidence_to_add: f32,

    /// A disagreeing judgment flips stored polarity only when its
    /// confidence exceeds the decayed stored weight by more than this.
    /// 0.0 flips on any stronger disagreement; large values never flip.
    pub flip_margin: f32,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            alpha_blend: 0.7,
            initial_edge_weight: 0.55,
            min_confidence_to_add: 0.50,
            flip_margin: 0.10,
        }
    }
}

// ============================================================================
// HORIZON
// ============================================================================

/// Inference horizon parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HorizonConfig {
    /// Forward window the probability/magnitude estimate covers.
    pub minutes: u32,

    /// Minimum probability to alert.
    pub min_probability: f32,

    /// Minimum expected magnitude (in sigma) to alert.
    pub spread_sigma_k: f32,

    /// Steepness of the logistic squashing the net edge score into a
    /// probability.
    pub steepness: f64,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            minutes: 90,
            min_probability: 0.65,
            spread_sigma_k: 1.0,
            steepness: 2.5,
        }
    }
}

// ============================================================================
// RTH
// ============================================================================

/// Regular-trading-hours policy.
///
/// Gating and inference run only while the session is open (when
/// `enforce` is set); ingestion is never gated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RthConfig {
    pub enforce: bool,

    /// Event kinds that may trigger inference. Empty means any kind.
    pub trigger_kinds: Vec<EventKind>,
}

impl Default for RthConfig {
    fn default() -> Self {
        Self {
            enforce: true,
            trigger_kinds: vec![EventKind::Price],
        }
    }
}

impl RthConfig {
    /// Whether an event of `kind` qualifies as an inference trigger.
    pub fn is_trigger(&self, kind: EventKind) -> bool {
        self.trigger_kinds.is_empty() || self.trigger_kinds.contains(&kind)
    }
}

// ============================================================================
// ADAPTER
// ============================================================================

/// Judgment boundary timeout and retry policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Per-call timeout (seconds).
    pub timeout_secs: u64,

    /// Retries after the first failure. Bounded: no retry storms.
    pub max_retries: u32,

    /// Backoff between retries (milliseconds), doubled per attempt.
    pub retry_backoff_ms: u64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

// ============================================================================
// BUDGET
// ============================================================================

/// Daily cap on judgment calls, resetting at UTC midnight.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub daily_judgment_cap: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_judgment_cap: 2_000,
        }
    }
}

// ============================================================================
// UNIVERSE
// ============================================================================

/// The tracked ticker universe and its cross-ticker relations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub tickers: Vec<String>,
    pub reference_index: String,

    /// Ticker → sector name, for sector co-membership gating.
    pub sectors: HashMap<String, String>,

    /// Ticker → explicit peer/supply-chain tickers.
    pub peers: HashMap<String, Vec<String>>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            tickers: [
                "AAPL", "NVDA", "MSFT", "GOOG", "AMZN", "META", "BRK-B", "LLY", "AVGO", "TSLA",
                "JPM", "WMT", "UNH", "XOM", "V",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            reference_index: "SPY".to_string(),
            sectors: HashMap::new(),
            peers: HashMap::new(),
        }
    }
}

impl UniverseConfig {
    pub fn sector_of(&self, ticker: &str) -> Option<&str> {
        self.sectors.get(ticker).map(String::as_str)
    }

    pub fn are_peers(&self, cause: &str, effect: &str) -> bool {
        self.peers
            .get(cause)
            .map(|peers| peers.iter().any(|p| p == effect))
            .unwrap_or(false)
    }
}

// ============================================================================
// SINKS & LOGGING
// ============================================================================

/// Alert sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    pub enable_console: bool,
    pub jsonl_path: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enable_console: true,
            jsonl_path: "data/alerts.jsonl".to_string(),
        }
    }
}

/// Audit log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    pub jsonl_path: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            jsonl_path: "data/audit.jsonl".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter, overridable via `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_effect_gets_the_tight_lag_ceiling() {
        let cfg = GatingConfig::default();
        assert_eq!(cfg.max_lag(EventKind::Price), chrono::Duration::minutes(90));
        assert_eq!(cfg.max_lag(EventKind::News), chrono::Duration::minutes(24 * 60));
    }

    #[test]
    fn macro_decays_slowest_price_fastest() {
        let cfg = DecayConfig::default();
        let mut secs: Vec<f64> = [
            EventKind::Price,
            EventKind::News,
            EventKind::Filing,
            EventKind::Social,
            EventKind::Macro,
        ]
        .iter()
        .map(|k| cfg.half_life_secs(*k))
        .collect();
        let price = cfg.half_life_secs(EventKind::Price);
        let macro_hl = cfg.half_life_secs(EventKind::Macro);
        secs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(secs[0], price);
        assert_eq!(*secs.last().unwrap(), macro_hl);
    }

    #[test]
    fn empty_trigger_kinds_means_any() {
        let cfg = RthConfig {
            enforce: true,
            trigger_kinds: vec![],
        };
        assert!(cfg.is_trigger(EventKind::Social));

        let default = RthConfig::default();
        assert!(default.is_trigger(EventKind::Price));
        assert!(!default.is_trigger(EventKind::News));
    }

    #[test]
    fn peer_lookup_is_directional() {
        let mut cfg = UniverseConfig::default();
        cfg.peers.insert("NVDA".into(), vec!["TSM".into()]);
        assert!(cfg.are_peers("NVDA", "TSM"));
        assert!(!cfg.are_peers("TSM", "NVDA"));
    }
}
