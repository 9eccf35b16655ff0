//! Candidate gate: which event pairs are even worth judging.
//!
//! Given a newly ingested event, scan the recent-events window and propose
//! plausible directed cause→effect pairs with the new event as the effect.
//! Rules apply in order and any failing rule drops the candidate:
//!
//! 1. **Temporal**: the cause strictly precedes the effect, within the
//!    per-edge-kind lag ceiling.
//! 2. **Entity**: same ticker always passes; cross-ticker only along an
//!    authorized relation (sector, peer list, macro→ticker, or an explicit
//!    text mention of the other ticker).
//! 3. **Evidence sufficiency**: kind-specific minimum signal (a social
//!    cause needs the mention floor).
//! 4. **Fan-out cap**: at most N candidates per event, best first.
//!
//! The gate is pure and deterministic: same event, same window, same
//! ordered output. No matching pair is an empty result, not an error.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use signal_graph_core::config::{GatingConfig, UniverseConfig};
use signal_graph_core::types::{
    CandidatePair, EdgeKind, Event, EventDetails, EventKind, GateReason, NodeClass,
};

// Compile-once regex patterns via OnceLock.
fn cashtag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([A-Z]{1,5})\b").expect("valid cashtag regex"))
}

fn bare_ticker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z]{1,5}\b").expect("valid ticker regex"))
}

/// Extract ticker-like entities from free text: `$NVDA` cashtags plus bare
/// uppercase tokens up to five characters.
fn extract_entities(text: &str) -> Vec<String> {
    let mut out: Vec<String> = cashtag_re()
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect();
    for m in bare_ticker_re().find_iter(text) {
        let t = m.as_str().to_string();
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// The searchable text of an event: summary plus any headline.
fn event_text(event: &Event) -> String {
    match &event.details {
        EventDetails::News { headline, .. } => format!("{} {}", headline, event.summary),
        _ => event.summary.clone(),
    }
}

/// Pure candidate-pair generator.
pub struct CandidateGate {
    gating: GatingConfig,
    universe: UniverseConfig,
}

impl CandidateGate {
    pub fn new(gating: GatingConfig, universe: UniverseConfig) -> Self {
        Self { gating, universe }
    }

    /// Propose plausible cause→effect pairs with `new_event` as effect,
    /// ordered by descending plausibility, capped at the configured
    /// fan-out.
    pub fn propose(&self, new_event: &Event, window: &[Event]) -> Vec<CandidatePair> {
        let mut candidates: Vec<CandidatePair> = window
            .iter()
            .filter_map(|cause| self.admit(cause, new_event))
            .collect();

        // Best first; ties broken by cause id so the order is total.
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.cause_id.cmp(&a.cause_id))
        });
        candidates.truncate(self.gating.max_candidates_per_event);

        debug!(
            effect = %new_event.id,
            window = window.len(),
            proposed = candidates.len(),
            "candidate gate evaluated"
        );
        candidates
    }

    /// Run all rules against one prospective cause. `None` drops it.
    fn admit(&self, cause: &Event, effect: &Event) -> Option<CandidatePair> {
        if cause.id == effect.id {
            return None;
        }

        // Temporal: strict precedence within the per-kind lag ceiling.
        if cause.ts >= effect.ts {
            return None;
        }
        let lag = effect.ts - cause.ts;
        let max_lag = self.gating.max_lag(effect.kind());
        if lag > max_lag {
            return None;
        }

        let reason = self.entity_rule(cause, effect)?;

        if !self.evidence_sufficient(cause) {
            return None;
        }

        let score = self.plausibility(cause, effect, reason, lag, max_lag);
        Some(CandidatePair {
            cause_id: cause.id,
            effect_id: effect.id,
            cause_class: NodeClass::of(cause.ticker.as_deref()),
            effect_class: NodeClass::of(effect.ticker.as_deref()),
            edge_kind: EdgeKind::new(cause.kind(), effect.kind()),
            gate_reason: reason,
            score,
        })
    }

    /// Entity rule: which relation, if any, authorizes this pair.
    fn entity_rule(&self, cause: &Event, effect: &Event) -> Option<GateReason> {
        if let (Some(ct), Some(et)) = (&cause.ticker, &effect.ticker) {
            if ct == et {
                return Some(GateReason::SameTicker);
            }
        }

        if cause.kind() == EventKind::Macro
            && self.gating.allow_macro_to_ticker
            && effect.ticker.is_some()
        {
            return Some(GateReason::MacroToTicker);
        }

        if let (Some(ct), Some(et)) = (&cause.ticker, &effect.ticker) {
            if self.gating.allow_supply_chain_links && self.universe.are_peers(ct, et) {
                return Some(GateReason::SupplyChainPeer);
            }
            if self.gating.allow_cross_ticker_within_sector {
                if let (Some(cs), Some(es)) =
                    (self.universe.sector_of(ct), self.universe.sector_of(et))
                {
                    if cs == es {
                        return Some(GateReason::SectorPeer);
                    }
                }
            }
        }

        // Textual linking: one side names the other's ticker.
        if let Some(ct) = &cause.ticker {
            if extract_entities(&event_text(effect)).iter().any(|t| t == ct) {
                return Some(GateReason::EntityMention);
            }
        }
        if let Some(et) = &effect.ticker {
            if extract_entities(&event_text(cause)).iter().any(|t| t == et) {
                return Some(GateReason::EntityMention);
            }
        }

        None
    }

    /// Kind-specific minimum signal before an event may serve as a cause.
    fn evidence_sufficient(&self, cause: &Event) -> bool {
        match cause.details {
            EventDetails::Social { mention_count, .. } => {
                mention_count >= self.gating.social_mention_floor
            }
            _ => true,
        }
    }

    /// Deterministic plausibility score in [0, 1] for fan-out ordering.
    fn plausibility(
        &self,
        cause: &Event,
        effect: &Event,
        reason: GateReason,
        lag: chrono::Duration,
        max_lag: chrono::Duration,
    ) -> f32 {
        let mut score = match reason {
            GateReason::SameTicker => 0.5,
            GateReason::MacroToTicker => 0.35,
            GateReason::SupplyChainPeer => 0.3,
            GateReason::SectorPeer => 0.25,
            GateReason::EntityMention => 0.2,
        };

        // Recency: fresher causes are likelier causes.
        let lag_frac = lag.num_seconds() as f32 / max_lag.num_seconds().max(1) as f32;
        score += 0.3 * (1.0 - lag_frac.clamp(0.0, 1.0));

        // Textual specificity: a cause that names the effect's ticker.
        if let Some(et) = &effect.ticker {
            if extract_entities(&event_text(cause)).iter().any(|t| t == et) {
                score += 0.1;
            }
        }
        if event_text(cause).len() > 80 {
            score += 0.05;
        }

        score.clamp(0.0, 1.0)
    }
}
