//! Error types for the graph store.

use thiserror::Error;

/// Result type for graph store operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised by the graph store.
///
/// An invariant violation is fatal to the single update that hit it, never
/// to the rest of the graph: the writer lock is released with the previous
/// state intact.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A structural invariant was violated (malformed edge key, self-edge,
    /// class/kind mismatch). Logged with full context by the caller.
    #[error("graph invariant violation: {context}")]
    InvariantViolation { context: String },

    /// An audit record stream could not be replayed into a store.
    #[error("replay failed at seq {seq}: {message}")]
    ReplayError { seq: u64, message: String },

    /// Appending to the audit log failed.
    #[error("audit append failed: {0}")]
    Audit(#[from] signal_graph_core::CoreError),
}
