//! Scripted judgment adapter for tests and offline runs.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use signal_graph_core::types::RawJudgment;

use super::{AdapterError, AdapterResult, JudgmentAdapter, JudgmentRequest};

enum Scripted {
    Judgment(RawJudgment),
    Failure(String),
    /// Never answers within any sane timeout; exercises the caller's
    /// deadline handling.
    Hang,
}

/// Adapter that replays a queue of scripted responses, falling back to an
/// optional default once the queue drains.
///
/// Used by the engine's integration tests and by the CLI's offline `run`
/// mode, where judgments come from a file instead of a live capability.
#[derive(Default)]
pub struct ScriptedAdapter {
    queue: Mutex<VecDeque<Scripted>>,
    fallback: Option<RawJudgment>,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter that answers every request with the same judgment.
    pub fn always(judgment: RawJudgment) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Some(judgment),
        }
    }

    /// Queue judgments in order; the fallback (if any) applies after.
    pub fn with_script(judgments: impl IntoIterator<Item = RawJudgment>) -> Self {
        Self {
            queue: Mutex::new(judgments.into_iter().map(Scripted::Judgment).collect()),
            fallback: None,
        }
    }

    pub fn push_judgment(&self, judgment: RawJudgment) {
        self.queue.lock().push_back(Scripted::Judgment(judgment));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.queue.lock().push_back(Scripted::Failure(message.into()));
    }

    pub fn push_hang(&self) {
        self.queue.lock().push_back(Scripted::Hang);
    }

    /// Responses still queued.
    pub fn remaining(&self) -> usize {
        self.queue.lock().len()
    }
}

#[async_trait]
impl JudgmentAdapter for ScriptedAdapter {
    async fn judge(&self, _request: &JudgmentRequest) -> AdapterResult<RawJudgment> {
        let next = self.queue.lock().pop_front();
        match next {
            Some(Scripted::Judgment(j)) => Ok(j),
            Some(Scripted::Failure(message)) => Err(AdapterError::Failed { message }),
            Some(Scripted::Hang) => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Err(AdapterError::Failed {
                    message: "hang elapsed".into(),
                })
            }
            None => match &self.fallback {
                Some(j) => Ok(j.clone()),
                None => Err(AdapterError::Failed {
                    message: "script exhausted".into(),
                }),
            },
        }
    }
}
