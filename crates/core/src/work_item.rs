// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work items and their status machine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{CriterionId, WorkItemId, WorkerId};
use crate::template::Role;

/// The kind of work a work item represents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemType {
    Feature,
    Bug,
    Task,
    Research,
    Other(String),
}

/// A work item's position in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    Backlog,
    Ready,
    InProgress,
    Review,
    Done,
}

crate::simple_display! {
    WorkItemStatus {
        Backlog => "backlog",
        Ready => "ready",
        InProgress => "in-progress",
        Review => "review",
        Done => "done",
    }
}

impl WorkItemStatus {
    /// Status changes this status may legally move to.
    pub fn allowed_successors(self) -> &'static [WorkItemStatus] {
        use WorkItemStatus::*;
        match self {
            Backlog => &[Ready],
            Ready => &[InProgress, Backlog],
            InProgress => &[Review, Backlog],
            Review => &[Done, InProgress],
            Done => &[],
        }
    }

    pub fn can_transition_to(self, target: WorkItemStatus) -> bool {
        self.allowed_successors().contains(&target)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WorkItemStatus::Done)
    }
}

/// Key used to look up an approval gate in [`WorkItem::requires_approval`].
pub fn transition_key(from: WorkItemStatus, to: WorkItemStatus) -> String {
    format!("{from}_{to}")
}

/// One checkable condition a work item must satisfy before it is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessCriterion {
    pub id: CriterionId,
    pub text: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<WorkerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at_ms: Option<u64>,
}

impl SuccessCriterion {
    pub fn new(text: impl Into<String>) -> Self {
        Self { id: CriterionId::new(), text: text.into(), completed: false, verified_by: None, verified_at_ms: None }
    }

    pub fn verify(&mut self, worker: WorkerId, now_ms: u64) {
        self.completed = true;
        self.verified_by = Some(worker);
        self.verified_at_ms = Some(now_ms);
    }
}

/// A unit of engineering work tracked through the status machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub title: String,
    pub item_type: WorkItemType,
    pub status: WorkItemStatus,
    pub description: String,
    pub success_criteria: Vec<SuccessCriterion>,
    pub linked_files: Vec<String>,
    pub repository_id: Option<String>,
    pub created_by: Option<String>,
    pub external_issue: Option<String>,
    pub parent_id: Option<WorkItemId>,
    pub child_ids: Vec<WorkItemId>,
    pub blocked_by: Vec<WorkItemId>,
    pub assigned_agents: HashMap<Role, WorkerId>,
    pub requires_approval: HashMap<String, bool>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
}

impl WorkItem {
    /// Attempt to move this work item to `target`, applying the timestamp
    /// side effects the status machine defines. Does not touch `updated_at_ms`
    /// — callers (the repository layer) own that.
    pub fn transition_to(&mut self, target: WorkItemStatus, now_ms: u64) -> Result<(), WorkItemError> {
        if !self.status.can_transition_to(target) {
            return Err(WorkItemError::InvalidTransition { from: self.status, to: target });
        }
        let key = transition_key(self.status, target);
        if self.requires_approval.get(&key).copied().unwrap_or(false) {
            return Err(WorkItemError::ApprovalRequired { from: self.status, to: target });
        }
        self.status = target;
        if target == WorkItemStatus::InProgress && self.started_at_ms.is_none() {
            self.started_at_ms = Some(now_ms);
        }
        match target {
            WorkItemStatus::Done => self.completed_at_ms = Some(now_ms),
            _ => self.completed_at_ms = None,
        }
        Ok(())
    }

    /// Clear a pending approval gate for one transition, letting it proceed
    /// next time it's attempted.
    pub fn clear_approval(&mut self, from: WorkItemStatus, to: WorkItemStatus) {
        self.requires_approval.remove(&transition_key(from, to));
    }

    /// A dependency unblocks its dependents once it reaches this status.
    ///
    /// Default interpretation: a blocker must reach `Done` to unblock its
    /// dependents. Queue managers may substitute another predicate via config.
    pub fn is_unblocking(status: WorkItemStatus) -> bool {
        status == WorkItemStatus::Done
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct WorkItemBuilder => WorkItem {
        into {
            title: String = "test item",
            description: String = "",
        }
        set {
            item_type: WorkItemType = WorkItemType::Task,
            status: WorkItemStatus = WorkItemStatus::Backlog,
            success_criteria: Vec<SuccessCriterion> = Vec::new(),
            linked_files: Vec<String> = Vec::new(),
            repository_id: Option<String> = None,
            created_by: Option<String> = None,
            external_issue: Option<String> = None,
            parent_id: Option<WorkItemId> = None,
            child_ids: Vec<WorkItemId> = Vec::new(),
            blocked_by: Vec<WorkItemId> = Vec::new(),
            assigned_agents: HashMap<Role, WorkerId> = HashMap::new(),
            requires_approval: HashMap<String, bool> = HashMap::new(),
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
            started_at_ms: Option<u64> = None,
            completed_at_ms: Option<u64> = None,
        }
        computed {
            id: WorkItemId = WorkItemId::new(),
        }
    }
}

/// Errors raised by the work item status machine and repository.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkItemError {
    #[error("cannot transition work item from {from} to {to}")]
    InvalidTransition { from: WorkItemStatus, to: WorkItemStatus },
    #[error("transition from {from} to {to} requires approval")]
    ApprovalRequired { from: WorkItemStatus, to: WorkItemStatus },
    #[error("work item {0} not found")]
    NotFound(WorkItemId),
    #[error("work item {0} cannot reference itself")]
    SelfReference(WorkItemId),
    #[error("work item {0} cannot be deleted while it has children")]
    HasChildren(WorkItemId),
    #[error("blocker {0} does not exist")]
    MissingBlocker(WorkItemId),
}

#[cfg(test)]
#[path = "work_item_tests.rs"]
mod tests;
