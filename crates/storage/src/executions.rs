// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence port for [`Execution`]s (C1).

use std::collections::HashMap;

use async_trait::async_trait;
use fm_core::{Execution, ExecutionId, ExecutionStatus, WorkItemId, WorkerId};
use parking_lot::RwLock;

use crate::error::StorageError;

/// Filters for listing executions, matching the `/executions` query surface.
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    pub status: Option<ExecutionStatus>,
    pub worker_id: Option<WorkerId>,
    pub work_item_id: Option<WorkItemId>,
    pub date_from_ms: Option<u64>,
    pub date_to_ms: Option<u64>,
    pub limit: Option<usize>,
    pub offset: usize,
}

pub struct ExecutionPage {
    pub items: Vec<Execution>,
    pub total: usize,
    pub has_more: bool,
}

#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    async fn create(&self, execution: Execution) -> Result<(), StorageError>;
    async fn update(&self, execution: Execution) -> Result<(), StorageError>;
    async fn find_by_id(&self, id: ExecutionId) -> Option<Execution>;
    async fn find(&self, filter: ExecutionFilter) -> ExecutionPage;
}

#[derive(Default)]
pub struct InMemoryExecutionRepository {
    executions: RwLock<HashMap<ExecutionId, Execution>>,
}

impl InMemoryExecutionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionRepository for InMemoryExecutionRepository {
    async fn create(&self, execution: Execution) -> Result<(), StorageError> {
        self.executions.write().insert(execution.id, execution);
        Ok(())
    }

    async fn update(&self, execution: Execution) -> Result<(), StorageError> {
        let mut executions = self.executions.write();
        if !executions.contains_key(&execution.id) {
            return Err(StorageError::NotFound { kind: "execution", id: execution.id.to_string() });
        }
        executions.insert(execution.id, execution);
        Ok(())
    }

    async fn find_by_id(&self, id: ExecutionId) -> Option<Execution> {
        self.executions.read().get(&id).cloned()
    }

    async fn find(&self, filter: ExecutionFilter) -> ExecutionPage {
        let mut matching: Vec<Execution> = self
            .executions
            .read()
            .values()
            .filter(|e| filter.status.is_none_or(|s| e.status == s))
            .filter(|e| filter.worker_id.is_none_or(|w| e.worker_id == w))
            .filter(|e| filter.work_item_id.is_none_or(|i| e.work_item_id == i))
            .filter(|e| filter.date_from_ms.is_none_or(|from| e.created_at_ms >= from))
            .filter(|e| filter.date_to_ms.is_none_or(|to| e.created_at_ms <= to))
            .cloned()
            .collect();
        matching.sort_by_key(|e| std::cmp::Reverse(e.created_at_ms));
        let total = matching.len();
        let limit = filter.limit.unwrap_or(total);
        let page: Vec<Execution> = matching.into_iter().skip(filter.offset).take(limit).collect();
        let has_more = filter.offset + page.len() < total;
        ExecutionPage { items: page, total, has_more }
    }
}

#[cfg(test)]
#[path = "executions_tests.rs"]
mod tests;
