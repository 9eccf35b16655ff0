//! The orchestrator: ingest → gate → judge → graph → inference → sinks.
//!
//! One [`EngineService::ingest_event`] call drives the whole pipeline for
//! one event, using the event's own timestamp as the logical clock for
//! gating, decay, and inference. That keeps a replayed event stream
//! byte-for-byte deterministic, which the audit log's replayability
//! depends on.
//!
//! Concurrency: the graph store serializes its own updates; the judgment
//! boundary is awaited with no graph lock held; inference reads one
//! atomic view of the store. A late judgment (the pair went stale while
//! the capability deliberated) still flows through the normal apply path,
//! where decay discounts it correctly.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use signal_graph_core::audit::{AuditLog, AuditOperation};
use signal_graph_core::config::Config;
use signal_graph_core::types::{AlertRecord, Event};
use signal_graph_graph::{EdgeUpdateResult, GraphError, GraphStore};

use crate::adapter::{JudgmentAdapter, JudgmentClient, JudgmentRequest};
use crate::alerts::AlertSink;
use crate::error::{EngineError, EngineResult};
use crate::gate::CandidateGate;
use crate::hours::MarketCalendar;
use crate::inference::{InferenceEngine, InferenceOutcome};

/// Per-event pipeline counters, for logs and tests.
#[derive(Debug, Clone, Default)]
pub struct IngestMetrics {
    /// False when the event id was already known (idempotent re-ingest).
    pub inserted: bool,
    /// Evaluation was skipped because the session was closed.
    pub skipped_closed: bool,
    pub window_size: usize,
    pub proposed: usize,
    pub judged: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub unavailable: usize,
    pub budget_skipped: usize,
    pub pruned: usize,
    pub invariant_errors: usize,
    pub inference: Option<InferenceOutcome>,
    pub alert: Option<AlertRecord>,
}

struct BudgetState {
    day: NaiveDate,
    used: u64,
}

/// Owns the full pipeline and all its sinks.
pub struct EngineService {
    config: Config,
    store: Arc<GraphStore>,
    gate: CandidateGate,
    client: JudgmentClient,
    calendar: Arc<dyn MarketCalendar>,
    alert_sink: Arc<dyn AlertSink>,
    audit: Arc<dyn AuditLog>,
    inference: InferenceEngine,
    budget: Mutex<BudgetState>,
}

impl EngineService {
    pub fn new(
        config: Config,
        adapter: Arc<dyn JudgmentAdapter>,
        calendar: Arc<dyn MarketCalendar>,
        alert_sink: Arc<dyn AlertSink>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let store = Arc::new(GraphStore::new(
            config.weights.clone(),
            config.decay.clone(),
            audit.clone(),
        ));
        let gate = CandidateGate::new(config.gating.clone(), config.universe.clone());
        let client = JudgmentClient::new(adapter, config.adapter.clone());
        let inference = InferenceEngine::new(config.horizon.clone());
        Self {
            config,
            store,
            gate,
            client,
            calendar,
            alert_sink,
            audit,
            inference,
            budget: Mutex::new(BudgetState {
                day: NaiveDate::MIN,
                used: 0,
            }),
        }
    }

    /// The graph store, for snapshots and read-side consumers.
    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    /// Drive the full pipeline for one event.
    ///
    /// Ingestion always happens; evaluation and inference happen only when
    /// the session is open (or enforcement is off), and inference only for
    /// configured trigger kinds.
    pub async fn ingest_event(&self, event: Event) -> EngineResult<IngestMetrics> {
        let at = event.ts;
        let mut metrics = IngestMetrics {
            inserted: self.store.insert_event(event.clone())?,
            ..IngestMetrics::default()
        };

        let open = !self.config.rth.enforce || self.calendar.is_open(at);
        if !open {
            // The node is in; it becomes an eligible cause once the session
            // opens and a later event gates against it.
            self.audit.append(AuditOperation::EvaluationSkipped {
                event_id: event.id,
                reason: "market closed".into(),
            })?;
            metrics.skipped_closed = true;
            info!(event_id = %event.id, "session closed, event buffered without evaluation");
            return Ok(metrics);
        }

        self.evaluate_candidates(&event, &mut metrics).await?;
        self.store.decay_sweep(at)?;
        self.run_inference(&event, &mut metrics)?;

        info!(
            event_id = %event.id,
            kind = %event.kind(),
            proposed = metrics.proposed,
            accepted = metrics.accepted,
            rejected = metrics.rejected,
            unavailable = metrics.unavailable,
            alerted = metrics.alert.is_some(),
            "event processed"
        );
        Ok(metrics)
    }

    /// Gate the new event against the recent window and feed each admitted
    /// pair through judgment and the graph store.
    async fn evaluate_candidates(
        &self,
        event: &Event,
        metrics: &mut IngestMetrics,
    ) -> EngineResult<()> {
        let at = event.ts;
        let lookback_minutes = self
            .config
            .gating
            .max_lag_minutes
            .max(self.config.gating.max_price_lag_minutes);
        let window = self
            .store
            .events_window(at, chrono::Duration::minutes(i64::from(lookback_minutes)));
        metrics.window_size = window.len();

        let pairs = self.gate.propose(event, &window);
        metrics.proposed = pairs.len();

        self.audit.append(AuditOperation::GateEvaluated {
            event_id: event.id,
            window_size: window.len(),
            proposed: pairs.len(),
        })?;
        for pair in &pairs {
            self.audit.append(AuditOperation::CandidateProposed {
                cause_id: pair.cause_id,
                effect_id: pair.effect_id,
                kind: pair.edge_kind,
                reason: pair.gate_reason,
                score: pair.score,
            })?;
        }

        for pair in pairs {
            if let Err((used, cap)) = self.try_consume_budget(at.date_naive()) {
                self.audit.append(AuditOperation::BudgetExhausted {
                    cause_id: pair.cause_id,
                    effect_id: pair.effect_id,
                    used,
                    cap,
                })?;
                metrics.budget_skipped += 1;
                continue;
            }

            let Some(cause) = self.store.event(&pair.cause_id) else {
                // The gate only proposes from the store's own window, so a
                // missing cause means the window and store disagree.
                warn!(cause_id = %pair.cause_id, "gated cause vanished from store, skipping pair");
                continue;
            };

            let request = JudgmentRequest {
                pair: pair.clone(),
                cause,
                effect: event.clone(),
            };

            let raw = match self.client.judge(&request).await {
                Ok(raw) => raw,
                Err(EngineError::AdapterUnavailable { attempts, message }) => {
                    self.audit.append(AuditOperation::JudgmentUnavailable {
                        cause_id: pair.cause_id,
                        effect_id: pair.effect_id,
                        attempts,
                        error: message,
                    })?;
                    metrics.unavailable += 1;
                    continue;
                }
                Err(other) => return Err(other),
            };
            metrics.judged += 1;

            // Magnitude signal: the effect-side price move, when there is one.
            let observed_sigma = event.return_sigma();
            match self.store.apply(&pair, &raw, observed_sigma, at) {
                Ok(EdgeUpdateResult::Upserted { .. }) => metrics.accepted += 1,
                Ok(EdgeUpdateResult::Rejected { .. }) => metrics.rejected += 1,
                Ok(EdgeUpdateResult::Pruned { .. }) => metrics.pruned += 1,
                Err(GraphError::InvariantViolation { context }) => {
                    // Fatal to this update only; the graph is intact.
                    error!(
                        cause = %pair.cause_id,
                        effect = %pair.effect_id,
                        context = %context,
                        "graph invariant violation while applying judgment"
                    );
                    metrics.invariant_errors += 1;
                }
                Err(other) => return Err(other.into()),
            }
        }
        Ok(())
    }

    /// Run inference for qualifying trigger events and route the outcome
    /// to the alert sink or a suppression audit record.
    fn run_inference(&self, event: &Event, metrics: &mut IngestMetrics) -> EngineResult<()> {
        if !self.config.rth.is_trigger(event.kind()) {
            return Ok(());
        }
        let Some(outcome) = self.inference.infer(event, &self.store, event.ts) else {
            return Ok(());
        };

        if outcome.qualifies(self.inference.horizon()) {
            let alert = AlertRecord {
                id: Uuid::new_v4(),
                ticker: outcome.ticker.clone(),
                ts: event.ts,
                horizon_minutes: self.config.horizon.minutes,
                probability: outcome.probability,
                expected_sigma: outcome.expected_sigma,
                direction: outcome.direction,
                rationale: outcome.rationale.clone(),
                triggering_event_id: event.id,
            };
            self.alert_sink.emit(&alert)?;
            self.audit
                .append(AuditOperation::AlertEmitted { alert: alert.clone() })?;
            metrics.alert = Some(alert);
        } else {
            let horizon = self.inference.horizon();
            let reason = if outcome.probability < f64::from(horizon.min_probability) {
                format!(
                    "probability {:.3} below threshold {:.3}",
                    outcome.probability, horizon.min_probability
                )
            } else {
                format!(
                    "expected sigma {:.3} below threshold {:.3}",
                    outcome.expected_sigma, horizon.spread_sigma_k
                )
            };
            self.audit.append(AuditOperation::AlertSuppressed {
                ticker: outcome.ticker.clone(),
                triggering_event_id: event.id,
                probability: outcome.probability,
                expected_sigma: outcome.expected_sigma,
                reason,
            })?;
        }
        metrics.inference = Some(outcome);
        Ok(())
    }

    /// Take one unit of today's judgment budget, resetting at UTC
    /// midnight. Returns the (used, cap) pair when exhausted.
    fn try_consume_budget(&self, day: NaiveDate) -> Result<(), (u64, u64)> {
        let mut budget = self.budget.lock();
        if budget.day != day {
            budget.day = day;
            budget.used = 0;
        }
        let cap = self.config.budget.daily_judgment_cap;
        if budget.used >= cap {
            return Err((budget.used, cap));
        }
        budget.used += 1;
        Ok(())
    }
}
