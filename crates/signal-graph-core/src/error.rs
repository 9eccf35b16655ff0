//! Error types shared across the Signal Graph core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by core types, configuration, and the audit log.
///
/// Configuration errors at startup are the only fatal class here; audit
/// I/O failures surface to the caller, which decides whether the update
/// that produced the record can proceed.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration failed to load or validate.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Audit log I/O failed.
    #[error("audit log I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An audit record could not be serialized or parsed.
    #[error("audit record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<::config::ConfigError> for CoreError {
    fn from(e: ::config::ConfigError) -> Self {
        Self::ConfigError(e.to_string())
    }
}
