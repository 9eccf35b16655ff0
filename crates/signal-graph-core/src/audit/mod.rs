//! Append-only audit log for every accept/reject decision.
//!
//! Every node insertion, candidate proposal, judgment verdict, edge
//! update, and alert decision produces one [`AuditRecord`]. Records are
//! never updated or deleted; sequence numbers are assigned at append time
//! under a lock, so the log is totally ordered by write time.
//!
//! The log is replayable: `EdgeUpserted` records carry the full post-update
//! edge state (not the inputs to the blend), so reconstructing graph state
//! is a fold over the record stream with no recomputation and no dependence
//! on wall-clock time.
//!
//! Rejections and skips are audited too. An operator reading the log can
//! always distinguish a quiet day from a silently broken pipeline.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::types::{
    AlertRecord, CausalEdge, EdgeKey, EdgeKind, Event, EventId, GateReason, RejectReason,
};

// ============================================================================
// RECORD
// ============================================================================

/// A single audit log entry. Append-only -- never update or delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique identifier for this record.
    pub id: Uuid,
    /// Position in the log's total order, assigned at append time.
    pub seq: u64,
    /// When the record was written (UTC).
    pub timestamp: DateTime<Utc>,
    /// The decision being recorded.
    pub operation: AuditOperation,
}

/// Every auditable decision in the pipeline.
///
/// State-bearing variants (`NodeInserted`, `EdgeUpserted`, `EdgePruned`)
/// carry enough to reconstruct graph state on replay; the rest exist so
/// rejected and skipped work leaves a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AuditOperation {
    /// An event was ingested as a graph node.
    NodeInserted { event: Event },

    /// The gate ran for a new event. `proposed == 0` on a quiet window.
    GateEvaluated {
        event_id: EventId,
        window_size: usize,
        proposed: usize,
    },

    /// The gate admitted one candidate pair for judgment.
    CandidateProposed {
        cause_id: EventId,
        effect_id: EventId,
        kind: EdgeKind,
        reason: GateReason,
        score: f32,
    },

    /// A judgment came back but was rejected before mutation.
    JudgmentRejected {
        cause_id: EventId,
        effect_id: EventId,
        reason: RejectReason,
    },

    /// The judgment boundary failed (timeout or error) after bounded
    /// retries; the pair was discarded for this cycle.
    JudgmentUnavailable {
        cause_id: EventId,
        effect_id: EventId,
        attempts: u32,
        error: String,
    },

    /// The daily judgment budget was exhausted; the pair was skipped.
    BudgetExhausted {
        cause_id: EventId,
        effect_id: EventId,
        used: u64,
        cap: u64,
    },

    /// An accepted judgment was blended into an edge. Carries the full
    /// post-update edge so replay needs no recomputation, plus the
    /// judge's one-line rationale for provenance.
    EdgeUpserted {
        edge: CausalEdge,
        flipped: bool,
        rationale: String,
    },

    /// An edge's decayed weight fell below the prune threshold.
    EdgePruned { key: EdgeKey, weight: f32 },

    /// An alert crossed both horizon thresholds and was emitted.
    AlertEmitted { alert: AlertRecord },

    /// Inference ran but thresholds were not met.
    AlertSuppressed {
        ticker: String,
        triggering_event_id: EventId,
        probability: f64,
        expected_sigma: f64,
        reason: String,
    },

    /// Evaluation or inference was skipped by policy (market closed,
    /// non-trigger event kind). The event itself was still ingested.
    EvaluationSkipped { event_id: EventId, reason: String },
}

impl std::fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeInserted { event } => write!(f, "NodeInserted({})", event.id),
            Self::GateEvaluated { event_id, proposed, .. } => {
                write!(f, "GateEvaluated({}, proposed={})", event_id, proposed)
            }
            Self::CandidateProposed { cause_id, effect_id, reason, .. } => {
                write!(f, "CandidateProposed({} -> {}, {})", cause_id, effect_id, reason)
            }
            Self::JudgmentRejected { reason, .. } => write!(f, "JudgmentRejected({})", reason),
            Self::JudgmentUnavailable { attempts, .. } => {
                write!(f, "JudgmentUnavailable(attempts={})", attempts)
            }
            Self::BudgetExhausted { used, cap, .. } => {
                write!(f, "BudgetExhausted({}/{})", used, cap)
            }
            Self::EdgeUpserted { edge, flipped, .. } => {
                write!(f, "EdgeUpserted({}, w={:.3}, flipped={})", edge.key, edge.weight, flipped)
            }
            Self::EdgePruned { key, weight } => write!(f, "EdgePruned({}, w={:.3})", key, weight),
            Self::AlertEmitted { alert } => {
                write!(f, "AlertEmitted({} {} p={:.2})", alert.ticker, alert.direction, alert.probability)
            }
            Self::AlertSuppressed { ticker, reason, .. } => {
                write!(f, "AlertSuppressed({}, {})", ticker, reason)
            }
            Self::EvaluationSkipped { event_id, reason } => {
                write!(f, "EvaluationSkipped({}, {})", event_id, reason)
            }
        }
    }
}

// ============================================================================
// LOG CONTRACT
// ============================================================================

/// Append-only audit sink. Implementations assign sequence numbers under a
/// lock so concurrent writers never interleave records out of order.
pub trait AuditLog: Send + Sync {
    /// Append one decision, returning the sequenced record as written.
    fn append(&self, operation: AuditOperation) -> CoreResult<AuditRecord>;
}

// ============================================================================
// IN-MEMORY LOG
// ============================================================================

/// In-memory audit log, used by tests and as the replay staging buffer.
#[derive(Default)]
pub struct MemoryAuditLog {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_seq: u64,
    records: Vec<AuditRecord>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything appended so far, in write order.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.inner.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, operation: AuditOperation) -> CoreResult<AuditRecord> {
        let mut inner = self.inner.lock();
        let record = AuditRecord {
            id: Uuid::new_v4(),
            seq: inner.next_seq,
            timestamp: Utc::now(),
            operation,
        };
        inner.next_seq += 1;
        inner.records.push(record.clone());
        Ok(record)
    }
}

// ============================================================================
// JSONL LOG
// ============================================================================

/// File-backed audit log, one JSON record per line.
///
/// Sequence assignment and the write share one mutex, so the on-disk order
/// is the total order. Each append is flushed; the log is the system of
/// record for replay.
pub struct JsonlAuditLog {
    inner: Mutex<JsonlInner>,
}

struct JsonlInner {
    next_seq: u64,
    writer: BufWriter<File>,
}

impl JsonlAuditLog {
    /// Open (or create) the log at `path`, appending after any existing
    /// records. Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        // Resume the sequence after a restart rather than restarting at 0.
        let next_seq = if path.exists() {
            read_jsonl_records(path)?
                .last()
                .map(|r| r.seq + 1)
                .unwrap_or(0)
        } else {
            0
        };
        if next_seq > 0 {
            debug!(path = %path.display(), next_seq, "resuming existing audit log");
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            inner: Mutex::new(JsonlInner {
                next_seq,
                writer: BufWriter::new(file),
            }),
        })
    }
}

impl AuditLog for JsonlAuditLog {
    fn append(&self, operation: AuditOperation) -> CoreResult<AuditRecord> {
        let mut inner = self.inner.lock();
        let record = AuditRecord {
            id: Uuid::new_v4(),
            seq: inner.next_seq,
            timestamp: Utc::now(),
            operation,
        };
        let line = serde_json::to_string(&record)?;
        inner.writer.write_all(line.as_bytes())?;
        inner.writer.write_all(b"\n")?;
        inner.writer.flush()?;
        inner.next_seq += 1;
        Ok(record)
    }
}

/// Read back a JSONL audit log in write order, for replay.
pub fn read_jsonl_records(path: impl AsRef<Path>) -> CoreResult<Vec<AuditRecord>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
