//! Core types and contracts for the Signal Graph engine.
//!
//! Signal Graph maintains a live, decaying, signed-and-weighted causal graph
//! over market events (price moves, news, filings, social chatter, macro
//! prints) and turns that graph into probabilistic directional alerts.
//!
//! This crate holds the pieces every other crate depends on:
//!
//! - **Event model**: typed, immutable event records forming graph nodes
//! - **Judgment contract**: the validated verdict shape returned by the
//!   external judgment capability
//! - **Edge model**: pair-class keyed, signed, weighted edge records
//! - **Audit contract**: append-only records for every accept/reject
//!   decision, replayable to reconstruct graph state
//! - **Configuration**: layered file + environment config with fail-fast
//!   validation
//!
//! Graph mutation lives in `signal-graph-graph`; gating, the judgment
//! boundary, inference, and orchestration live in `signal-graph-engine`.

pub mod audit;
pub mod config;
pub mod error;
pub mod types;

pub use audit::{AuditLog, AuditOperation, AuditRecord, JsonlAuditLog, MemoryAuditLog};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use types::{
    AlertRecord, CandidatePair, CausalEdge, Direction, EdgeKey, EdgeKind, Event, EventDetails,
    EventId, EventKind, GateReason, Judgment, NodeClass, Polarity, RawJudgment, RejectReason,
};
