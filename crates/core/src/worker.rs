// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live worker handles: an instantiated template with session state,
//! a resource budget, and assignment bookkeeping.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{TemplateId, WorkItemId, WorkerId};
use crate::template::Role;

/// Default context-window budget for a freshly spawned worker.
pub const DEFAULT_CONTEXT_WINDOW_LIMIT: u64 = 200_000;

/// A worker's position in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Idle,
    Working,
    Paused,
    Error,
    Terminated,
}

crate::simple_display! {
    WorkerStatus {
        Idle => "idle",
        Working => "working",
        Paused => "paused",
        Error => "error",
        Terminated => "terminated",
    }
}

/// Strictly-incremental metric contributions from one execution step.
///
/// There is deliberately no absolute-value entry point: every field here
/// accumulates onto the worker's running totals.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MetricsDelta {
    pub context_window_used: u64,
    pub tokens_used: u64,
    pub cost_usd_micros: u64,
    pub tool_calls: u32,
}

/// A live instance of a [`crate::template::Template`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub template_id: TemplateId,
    pub session_id: String,
    pub status: WorkerStatus,
    pub current_work_item_id: Option<WorkItemId>,
    pub current_role: Option<Role>,
    pub context_window_used: u64,
    pub context_window_limit: u64,
    pub tokens_used: u64,
    pub cost_usd_micros: u64,
    pub tool_calls_count: u32,
    pub error_count: u32,
    pub spawned_at_ms: u64,
    pub last_completed_at_ms: Option<u64>,
    pub repo_familiarity: std::collections::HashMap<String, u32>,
}

impl Worker {
    pub fn spawn(template_id: TemplateId, session_id: impl Into<String>, now_ms: u64) -> Self {
        Self {
            id: WorkerId::new(),
            template_id,
            session_id: session_id.into(),
            status: WorkerStatus::Idle,
            current_work_item_id: None,
            current_role: None,
            context_window_used: 0,
            context_window_limit: DEFAULT_CONTEXT_WINDOW_LIMIT,
            tokens_used: 0,
            cost_usd_micros: 0,
            tool_calls_count: 0,
            error_count: 0,
            spawned_at_ms: now_ms,
            last_completed_at_ms: None,
            repo_familiarity: Default::default(),
        }
    }

    pub fn assign_work(&mut self, item: WorkItemId, role: Role) -> Result<(), WorkerError> {
        if self.status != WorkerStatus::Idle {
            return Err(WorkerError::NotIdle(self.id));
        }
        self.status = WorkerStatus::Working;
        self.current_work_item_id = Some(item);
        self.current_role = Some(role);
        Ok(())
    }

    pub fn complete_work(&mut self, now_ms: u64) {
        self.status = WorkerStatus::Idle;
        self.current_work_item_id = None;
        self.current_role = None;
        self.last_completed_at_ms = Some(now_ms);
    }

    pub fn pause(&mut self) -> Result<(), WorkerError> {
        if self.status != WorkerStatus::Working {
            return Err(WorkerError::NotWorking(self.id));
        }
        self.status = WorkerStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), WorkerError> {
        if self.status != WorkerStatus::Paused {
            return Err(WorkerError::NotPaused(self.id));
        }
        self.status = if self.current_work_item_id.is_some() { WorkerStatus::Working } else { WorkerStatus::Idle };
        Ok(())
    }

    pub fn report_error(&mut self) {
        self.status = WorkerStatus::Error;
        self.error_count += 1;
    }

    pub fn terminate(&mut self) {
        self.current_work_item_id = None;
        self.current_role = None;
        self.status = WorkerStatus::Terminated;
    }

    /// Apply an incremental metrics update, moving to `error` status if the
    /// context window is exhausted.
    pub fn apply_metrics(&mut self, delta: MetricsDelta) {
        self.context_window_used += delta.context_window_used;
        self.tokens_used += delta.tokens_used;
        self.cost_usd_micros += delta.cost_usd_micros;
        self.tool_calls_count += delta.tool_calls;
        if self.context_window_used >= self.context_window_limit {
            self.status = WorkerStatus::Error;
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == WorkerStatus::Idle
    }

    pub fn counts_against_pool_cap(&self) -> bool {
        !matches!(self.status, WorkerStatus::Terminated)
    }

    pub fn record_repo_experience(&mut self, repo_id: &str) {
        *self.repo_familiarity.entry(repo_id.to_string()).or_insert(0) += 1;
    }
}

/// Test builder for [`Worker`]. Hand-written rather than macro-generated:
/// `template_id` defaults to a fresh random id rather than a fixed constant.
#[cfg(any(test, feature = "test-support"))]
pub struct WorkerBuilder {
    template_id: Option<TemplateId>,
    session_id: String,
    status: WorkerStatus,
    current_work_item_id: Option<WorkItemId>,
    current_role: Option<Role>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for WorkerBuilder {
    fn default() -> Self {
        Self {
            template_id: None,
            session_id: "session-1".into(),
            status: WorkerStatus::Idle,
            current_work_item_id: None,
            current_role: None,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WorkerBuilder {
    pub fn template_id(mut self, v: TemplateId) -> Self {
        self.template_id = Some(v);
        self
    }

    pub fn status(mut self, v: WorkerStatus) -> Self {
        self.status = v;
        self
    }

    pub fn current_work_item_id(mut self, v: Option<WorkItemId>) -> Self {
        self.current_work_item_id = v;
        self
    }

    pub fn current_role(mut self, v: Option<Role>) -> Self {
        self.current_role = v;
        self
    }

    pub fn build(self) -> Worker {
        let mut w = Worker::spawn(self.template_id.unwrap_or_else(TemplateId::new), self.session_id, 0);
        w.status = self.status;
        w.current_work_item_id = self.current_work_item_id;
        w.current_role = self.current_role;
        w
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Worker {
    pub fn builder() -> WorkerBuilder {
        WorkerBuilder::default()
    }
}

/// Errors raised by worker pool operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("worker {0} is not idle")]
    NotIdle(WorkerId),
    #[error("worker {0} is not working")]
    NotWorking(WorkerId),
    #[error("worker {0} is not paused")]
    NotPaused(WorkerId),
    #[error("worker {0} not found")]
    NotFound(WorkerId),
    #[error("pool has reached its maximum of {0} workers")]
    PoolExhausted(u32),
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
