//! Type definitions for the Signal Graph engine.
//!
//! Events are the graph nodes; candidate pairs are transient proposals from
//! the gate; judgments are the validated verdicts of the external judgment
//! capability; edges are the pair-class keyed, decaying weighted records
//! the graph store owns; alerts are the immutable inference output.

mod alert;
mod candidate;
mod edge;
mod event;
mod judgment;

pub use alert::{AlertRecord, Direction};
pub use candidate::{CandidatePair, GateReason};
pub use edge::{CausalEdge, EdgeKey, EdgeKind, NodeClass};
pub use event::{Event, EventDetails, EventId, EventKind};
pub use judgment::{Judgment, Polarity, RawJudgment, RejectReason};
