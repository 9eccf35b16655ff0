//! Error types for the engine crate.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while driving the pipeline.
///
/// None of these are process-fatal under normal operation: an unavailable
/// judgment discards one pair, a graph invariant violation kills one
/// update, an inference computation gap zeroes one contribution. Only
/// configuration errors at startup (surfaced before this crate runs) stop
/// the process.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The judgment boundary failed after bounded retries.
    #[error("judgment unavailable after {attempts} attempts: {message}")]
    AdapterUnavailable { attempts: u32, message: String },

    /// Graph store update failed.
    #[error(transparent)]
    Graph(#[from] signal_graph_graph::GraphError),

    /// Audit log append failed.
    #[error(transparent)]
    Audit(#[from] signal_graph_core::CoreError),

    /// Alert sink write failed.
    #[error("alert sink I/O error: {0}")]
    Sink(#[from] std::io::Error),

    /// Alert serialization failed.
    #[error("alert serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
