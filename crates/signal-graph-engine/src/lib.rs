//! Signal Graph engine: gating, judgment boundary, inference, and
//! orchestration.
//!
//! # Architecture
//!
//! ```text
//! event ingress
//!     │
//!     ▼
//! ┌──────────────┐   candidate    ┌──────────────────┐   judgment   ┌─────────────┐
//! │ CandidateGate │ ────pairs───► │  JudgmentClient   │ ───verdict─► │ GraphStore  │
//! │ (pure rules)  │               │ (timeout+retries) │              │ (blend/prune)│
//! └──────────────┘                └──────────────────┘              └──────┬──────┘
//!                                                                          │
//!                                  ┌──────────────────┐    active edges    │
//!                                  │ InferenceEngine   │ ◄──────────────────┘
//!                                  │ (saturating prob) │ ──► alert sink + audit log
//!                                  └──────────────────┘
//! ```
//!
//! The [`service::EngineService`] wires these together per ingested event,
//! applying the market-hours policy to evaluation and inference only --
//! ingestion is never gated.

pub mod adapter;
pub mod alerts;
pub mod error;
pub mod gate;
pub mod hours;
pub mod inference;
pub mod replay;
pub mod service;

pub use adapter::{AdapterError, JudgmentAdapter, JudgmentClient, JudgmentRequest, ScriptedAdapter};
pub use alerts::{AlertSink, JsonlAlertSink, MemoryAlertSink};
pub use error::{EngineError, EngineResult};
pub use gate::CandidateGate;
pub use hours::{AlwaysOpen, MarketCalendar, WeekdaySessionCalendar};
pub use inference::{InferenceEngine, InferenceOutcome};
pub use replay::{rebuild_from_log, ReplayStats};
pub use service::{EngineService, IngestMetrics};
