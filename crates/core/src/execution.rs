// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executions: one atomic attempt of one (worker, item, workspace) tuple.

use serde::{Deserialize, Serialize};

use crate::ids::{ExecutionId, TemplateId, WorkItemId, WorkerId};

/// An execution's terminal-or-not state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Success,
    Error,
    Cancelled,
}

crate::simple_display! {
    ExecutionStatus {
        Pending => "pending",
        Running => "running",
        Success => "success",
        Error => "error",
        Cancelled => "cancelled",
    }
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Error | ExecutionStatus::Cancelled)
    }
}

/// One attempt of a (worker, work item) pair. The workspace id is minted by
/// the (out of scope) code-workspace cloner and carried only for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
    pub worker_id: WorkerId,
    pub work_item_id: WorkItemId,
    pub workspace_id: String,
    pub template_id: TemplateId,
    pub status: ExecutionStatus,
    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    pub tokens_used: u64,
    pub cost_usd_micros: u64,
    pub tool_calls_count: u32,
    pub error_message: Option<String>,
    pub output: Option<String>,
}

impl Execution {
    pub fn new(
        worker_id: WorkerId,
        work_item_id: WorkItemId,
        workspace_id: impl Into<String>,
        template_id: TemplateId,
        now_ms: u64,
    ) -> Self {
        Self {
            id: ExecutionId::new(),
            worker_id,
            work_item_id,
            workspace_id: workspace_id.into(),
            template_id,
            status: ExecutionStatus::Pending,
            created_at_ms: now_ms,
            started_at_ms: None,
            completed_at_ms: None,
            duration_ms: None,
            tokens_used: 0,
            cost_usd_micros: 0,
            tool_calls_count: 0,
            error_message: None,
            output: None,
        }
    }

    /// Move to `status`, stamping `started_at_ms`/`completed_at_ms`/`duration_ms`
    /// as the invariants in the data model require.
    pub fn transition(&mut self, status: ExecutionStatus, now_ms: u64) {
        if self.started_at_ms.is_none() && (status == ExecutionStatus::Running || status.is_terminal()) {
            self.started_at_ms = Some(now_ms);
        }
        if status.is_terminal() {
            self.completed_at_ms = Some(now_ms);
            self.duration_ms = Some(now_ms.saturating_sub(self.started_at_ms.unwrap_or(now_ms)));
        }
        self.status = status;
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;
