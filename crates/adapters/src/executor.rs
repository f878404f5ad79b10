// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The executor port: an opaque boundary to the embedded LLM agent. The
//! orchestrator never inspects how a prompt gets turned into a result, only
//! that it eventually gets one, and that it can ask the execution to stop.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Everything the executor needs to run one attempt. `cancel_token` is
/// honored cooperatively: the orchestrator cancels it on `stop()`, the
/// executor is expected to observe it within a bounded time.
pub struct ExecutionRequest {
    pub workspace_path: String,
    pub prompt: String,
    pub session_id: String,
    pub cancel_token: CancellationToken,
}

impl ExecutionRequest {
    pub fn new(workspace_path: impl Into<String>, prompt: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            workspace_path: workspace_path.into(),
            prompt: prompt.into(),
            session_id: session_id.into(),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }
}

/// Result of one execution attempt. Failures surface through `error`, not
/// through a returned `Result` — the executor never throws, per the external
/// interface contract; the orchestrator is the one that decides what a
/// populated `error` means for retry/escalation.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOutcome {
    pub session_id: String,
    pub tokens_used: u64,
    pub cost_usd_micros: u64,
    pub tool_calls_count: u32,
    pub error: Option<String>,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Port to the embedded agent executor. Implementations are out of scope
/// here; this crate only ships the trait and a deterministic test double.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    async fn execute(&self, request: ExecutionRequest) -> ExecutionOutcome;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{ExecutionOutcome, ExecutionRequest, Executor};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Deterministic executor double: returns pre-scripted outcomes in order,
    /// falling back to a single success once the script is exhausted.
    #[derive(Clone)]
    pub struct FakeExecutor {
        inner: Arc<Mutex<FakeExecutorState>>,
    }

    struct FakeExecutorState {
        scripted: VecDeque<ExecutionOutcome>,
        calls: Vec<String>,
    }

    impl Default for FakeExecutor {
        fn default() -> Self {
            Self { inner: Arc::new(Mutex::new(FakeExecutorState { scripted: VecDeque::new(), calls: Vec::new() })) }
        }
    }

    impl FakeExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue an outcome to be returned by the next `execute` call.
        pub fn push_outcome(&self, outcome: ExecutionOutcome) {
            self.inner.lock().scripted.push_back(outcome);
        }

        /// Queue a failure outcome carrying `message` as the error.
        pub fn push_error(&self, message: impl Into<String>) {
            self.push_outcome(ExecutionOutcome { error: Some(message.into()), ..Default::default() });
        }

        /// Prompts passed to every `execute` call so far, in order.
        pub fn calls(&self) -> Vec<String> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl Executor for FakeExecutor {
        async fn execute(&self, request: ExecutionRequest) -> ExecutionOutcome {
            let mut state = self.inner.lock();
            state.calls.push(request.prompt.clone());
            state.scripted.pop_front().unwrap_or(ExecutionOutcome {
                session_id: request.session_id,
                tokens_used: 1000,
                cost_usd_micros: 50_000,
                tool_calls_count: 5,
                error: None,
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeExecutor;

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
