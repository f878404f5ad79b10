// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable audit trace events.

use serde::{Deserialize, Serialize};

use crate::ids::{TraceId, WorkItemId, WorkerId};

/// The kind of event a [`Trace`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceEventType {
    AgentState,
    WorkItemUpdate,
    ToolCall,
    MetricUpdate,
    Error,
    ApprovalRequired,
}

/// An immutable record in the audit stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub id: TraceId,
    pub worker_id: Option<WorkerId>,
    pub work_item_id: Option<WorkItemId>,
    pub event_type: TraceEventType,
    pub data: serde_json::Value,
    pub timestamp_ms: u64,
}

impl Trace {
    pub fn new(event_type: TraceEventType, data: serde_json::Value, now_ms: u64) -> Self {
        Self { id: TraceId::new(), worker_id: None, work_item_id: None, event_type, data, timestamp_ms: now_ms }
    }

    pub fn for_worker(mut self, worker_id: WorkerId) -> Self {
        self.worker_id = Some(worker_id);
        self
    }

    pub fn for_work_item(mut self, work_item_id: WorkItemId) -> Self {
        self.work_item_id = Some(work_item_id);
        self
    }
}
