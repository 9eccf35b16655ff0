//! Inference: aggregate live edges into a probability and an expected
//! magnitude for a ticker.
//!
//! For a qualifying new event, every active edge whose effect class
//! matches the event's ticker contributes `polarity × decayed_weight`.
//! The net score is squashed through a logistic into a probability, so no
//! amount of agreeing evidence can push it past 1. The expected magnitude
//! is the decayed-weight-weighted sum of each edge's volatility signal; an
//! edge without one contributes zero magnitude (logged, never fatal).
//!
//! For a fixed graph state and a fixed event, the result is deterministic,
//! which is what makes alert decisions replayable from the audit log.

use chrono::{DateTime, Utc};
use tracing::warn;

use signal_graph_core::config::HorizonConfig;
use signal_graph_core::types::{Direction, Event, NodeClass, Polarity};
use signal_graph_graph::GraphStore;

/// Logistic squashing: (0, 1) for any finite input.
fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Aggregated inference result for one ticker at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOutcome {
    pub ticker: String,
    /// Net signed score: Σ polarity × decayed weight.
    pub net_score: f64,
    /// Saturating probability of a directional move over the horizon.
    pub probability: f64,
    /// Decayed-weight-weighted sum of edge volatility signals, in sigma.
    pub expected_sigma: f64,
    pub direction: Direction,
    /// Active edges that contributed.
    pub contributing_edges: usize,
    /// Edges skipped for lacking a volatility signal.
    pub missing_volatility: usize,
    pub rationale: String,
}

impl InferenceOutcome {
    /// Whether this outcome crosses both alert thresholds.
    pub fn qualifies(&self, horizon: &HorizonConfig) -> bool {
        self.probability >= f64::from(horizon.min_probability)
            && self.expected_sigma >= f64::from(horizon.spread_sigma_k)
    }
}

/// Deterministic aggregation over the live graph.
pub struct InferenceEngine {
    horizon: HorizonConfig,
}

impl InferenceEngine {
    pub fn new(horizon: HorizonConfig) -> Self {
        Self { horizon }
    }

    pub fn horizon(&self) -> &HorizonConfig {
        &self.horizon
    }

    /// Aggregate incoming active edges for `event.ticker` as of `at`.
    ///
    /// Returns `None` for market-wide events: there is no single ticker to
    /// estimate. An empty edge set still returns an outcome (probability
    /// 0.5, magnitude 0) so the caller can audit the suppression.
    pub fn infer(&self, event: &Event, store: &GraphStore, at: DateTime<Utc>) -> Option<InferenceOutcome> {
        let ticker = event.ticker.clone()?;
        let effect = NodeClass::Ticker(ticker.clone());

        let edges = store.active_edges_into(&effect, at);

        let mut net = 0.0f64;
        let mut expected_sigma = 0.0f64;
        let mut missing_volatility = 0usize;

        for (edge, decayed) in &edges {
            let signed = f64::from(edge.polarity.signum()) * f64::from(*decayed);
            net += signed;

            if edge.polarity == Polarity::Neutral {
                continue;
            }
            match edge.volatility {
                Some(vol) => expected_sigma += f64::from(*decayed) * f64::from(vol).abs(),
                None => {
                    // Missing magnitude signal: zero contribution, keep going.
                    missing_volatility += 1;
                    warn!(key = %edge.key, "edge lacks volatility signal, zero magnitude contribution");
                }
            }
        }

        let probability = logistic(self.horizon.steepness * net.abs());
        let direction = if net >= 0.0 { Direction::Up } else { Direction::Down };
        let rationale = format!(
            "graph net support {} with score={:.2} across {} active edges",
            match direction {
                Direction::Up => "bullish",
                Direction::Down => "bearish",
            },
            net.abs(),
            edges.len(),
        );

        Some(InferenceOutcome {
            ticker,
            net_score: net,
            probability,
            expected_sigma,
            direction,
            contributing_edges: edges.len(),
            missing_volatility,
            rationale,
        })
    }
}
