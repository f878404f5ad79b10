// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence port for [`Trace`] audit events (C1).

use std::collections::HashMap;

use async_trait::async_trait;
use fm_core::{ExecutionId, Trace, TraceEventType};
use parking_lot::RwLock;

#[async_trait]
pub trait TraceRepository: Send + Sync {
    /// Traces are keyed by the execution they were produced under — the data
    /// model ties a trace to a worker and/or work item, but list queries
    /// (`/executions/{id}/traces`) scope by execution.
    async fn record(&self, execution: ExecutionId, trace: Trace);
    async fn find_for_execution(&self, execution: ExecutionId) -> Vec<Trace>;
    async fn find_by_event_type(&self, execution: ExecutionId, event_type: TraceEventType) -> Vec<Trace>;
}

#[derive(Default)]
pub struct InMemoryTraceRepository {
    by_execution: RwLock<HashMap<ExecutionId, Vec<Trace>>>,
}

impl InMemoryTraceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TraceRepository for InMemoryTraceRepository {
    async fn record(&self, execution: ExecutionId, trace: Trace) {
        self.by_execution.write().entry(execution).or_default().push(trace);
    }

    async fn find_for_execution(&self, execution: ExecutionId) -> Vec<Trace> {
        self.by_execution.read().get(&execution).cloned().unwrap_or_default()
    }

    async fn find_by_event_type(&self, execution: ExecutionId, event_type: TraceEventType) -> Vec<Trace> {
        self.find_for_execution(execution)
            .await
            .into_iter()
            .filter(|t| t.event_type == event_type)
            .collect()
    }
}

#[cfg(test)]
#[path = "traces_tests.rs"]
mod tests;
