//! The judgment boundary.
//!
//! The multi-expert debate and judge mechanism lives outside this system.
//! Here it is a capability: given a candidate pair and both events'
//! summaries and signals, return a [`RawJudgment`] or fail. The engine
//! owns the timeout and the bounded retry policy; a failure discards the
//! pair for this cycle and is audited, never crashes anything.
//!
//! The boundary is the only operation expected to block for meaningful
//! wall-clock time, so no graph lock is ever held across it.

mod scripted;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use signal_graph_core::config::AdapterConfig;
use signal_graph_core::types::{CandidatePair, Event, RawJudgment};

use crate::error::{EngineError, EngineResult};

pub use scripted::ScriptedAdapter;

/// Everything the external capability gets to see for one candidate pair.
#[derive(Debug, Clone)]
pub struct JudgmentRequest {
    pub pair: CandidatePair,
    pub cause: Event,
    pub effect: Event,
}

/// Errors the capability itself may report.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("judgment capability failed: {message}")]
    Failed { message: String },

    #[error("judgment response unparseable: {message}")]
    Unparseable { message: String },
}

/// Result type for adapter implementations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// The external judgment capability. Black box: concurrency, batching,
/// and prompt shaping inside it are its own business.
#[async_trait]
pub trait JudgmentAdapter: Send + Sync {
    async fn judge(&self, request: &JudgmentRequest) -> AdapterResult<RawJudgment>;
}

/// Caller-side wrapper owning timeout and bounded-retry semantics.
pub struct JudgmentClient {
    adapter: Arc<dyn JudgmentAdapter>,
    config: AdapterConfig,
}

impl JudgmentClient {
    pub fn new(adapter: Arc<dyn JudgmentAdapter>, config: AdapterConfig) -> Self {
        Self { adapter, config }
    }

    /// Call the capability with a per-attempt timeout and bounded retries
    /// (backoff doubles per attempt). Exhaustion is an
    /// [`EngineError::AdapterUnavailable`], which callers treat as "no
    /// judgment": discard the pair, audit, move on.
    pub async fn judge(&self, request: &JudgmentRequest) -> EngineResult<RawJudgment> {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let attempts = self.config.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let backoff = self.config.retry_backoff_ms << (attempt - 1);
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            match tokio::time::timeout(timeout, self.adapter.judge(request)).await {
                Ok(Ok(raw)) => return Ok(raw),
                Ok(Err(e)) => {
                    last_error = e.to_string();
                    warn!(
                        cause = %request.pair.cause_id,
                        effect = %request.pair.effect_id,
                        attempt = attempt + 1,
                        error = %last_error,
                        "judgment attempt failed"
                    );
                }
                Err(_) => {
                    last_error = format!("timed out after {}s", self.config.timeout_secs);
                    warn!(
                        cause = %request.pair.cause_id,
                        effect = %request.pair.effect_id,
                        attempt = attempt + 1,
                        timeout_secs = self.config.timeout_secs,
                        "judgment attempt timed out"
                    );
                }
            }
        }

        Err(EngineError::AdapterUnavailable {
            attempts,
            message: last_error,
        })
    }
}
