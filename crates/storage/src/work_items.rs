// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence port for [`WorkItem`]s (C1).

use std::collections::HashMap;

use async_trait::async_trait;
use fm_core::{Clock, WorkItem, WorkItemId, WorkItemStatus, WorkerId};
use parking_lot::RwLock;

use crate::error::StorageError;
use crate::order::OrderBy;

#[async_trait]
pub trait WorkItemRepository: Send + Sync {
    async fn create(&self, item: WorkItem) -> Result<(), StorageError>;
    async fn update(&self, item: WorkItem) -> Result<(), StorageError>;
    async fn delete(&self, id: WorkItemId) -> Result<(), StorageError>;
    async fn find_by_id(&self, id: WorkItemId) -> Option<WorkItem>;
    async fn find_all(&self, order: OrderBy) -> Vec<WorkItem>;
    async fn find_by_status(&self, status: WorkItemStatus, order: OrderBy) -> Vec<WorkItem>;
    async fn find_children(&self, parent: WorkItemId) -> Vec<WorkItem>;
    async fn find_by_assigned_agent(&self, worker: WorkerId) -> Vec<WorkItem>;

    /// Attach `child` as a child of `parent`, appending `child` to
    /// `parent.child_ids` and setting `child.parent_id`. Rejects self-edges.
    async fn set_parent(&self, child: WorkItemId, parent: WorkItemId) -> Result<(), StorageError>;
}

pub struct InMemoryWorkItemRepository<C: Clock> {
    items: RwLock<HashMap<WorkItemId, WorkItem>>,
    clock: C,
}

impl<C: Clock> InMemoryWorkItemRepository<C> {
    pub fn new(clock: C) -> Self {
        Self { items: RwLock::new(HashMap::new()), clock }
    }

    fn sorted(mut items: Vec<WorkItem>, order: OrderBy) -> Vec<WorkItem> {
        match order {
            OrderBy::CreatedAtAsc => items.sort_by_key(|i| i.created_at_ms),
            OrderBy::CreatedAtDesc => items.sort_by_key(|i| std::cmp::Reverse(i.created_at_ms)),
        }
        items
    }
}

#[async_trait]
impl<C: Clock> WorkItemRepository for InMemoryWorkItemRepository<C> {
    async fn create(&self, item: WorkItem) -> Result<(), StorageError> {
        self.items.write().insert(item.id, item);
        Ok(())
    }

    async fn update(&self, mut item: WorkItem) -> Result<(), StorageError> {
        let mut items = self.items.write();
        if !items.contains_key(&item.id) {
            return Err(StorageError::NotFound { kind: "work item", id: item.id.to_string() });
        }
        item.updated_at_ms = self.clock.epoch_ms();
        items.insert(item.id, item);
        Ok(())
    }

    async fn delete(&self, id: WorkItemId) -> Result<(), StorageError> {
        let mut items = self.items.write();
        let has_children = items.get(&id).map(|i| !i.child_ids.is_empty()).unwrap_or(false);
        if has_children {
            return Err(StorageError::ReferencedBy {
                kind: "work item",
                id: id.to_string(),
                referrer_kind: "child work item",
                referrer_id: String::new(),
            });
        }
        items.remove(&id).map(|_| ()).ok_or(StorageError::NotFound { kind: "work item", id: id.to_string() })
    }

    async fn find_by_id(&self, id: WorkItemId) -> Option<WorkItem> {
        self.items.read().get(&id).cloned()
    }

    async fn find_all(&self, order: OrderBy) -> Vec<WorkItem> {
        Self::sorted(self.items.read().values().cloned().collect(), order)
    }

    async fn find_by_status(&self, status: WorkItemStatus, order: OrderBy) -> Vec<WorkItem> {
        let matching = self.items.read().values().filter(|i| i.status == status).cloned().collect();
        Self::sorted(matching, order)
    }

    async fn find_children(&self, parent: WorkItemId) -> Vec<WorkItem> {
        self.items.read().values().filter(|i| i.parent_id == Some(parent)).cloned().collect()
    }

    async fn find_by_assigned_agent(&self, worker: WorkerId) -> Vec<WorkItem> {
        self.items.read().values().filter(|i| i.assigned_agents.values().any(|w| *w == worker)).cloned().collect()
    }

    async fn set_parent(&self, child: WorkItemId, parent: WorkItemId) -> Result<(), StorageError> {
        if child == parent {
            return Err(StorageError::SelfReference { kind: "work item", id: child.to_string() });
        }
        let mut items = self.items.write();
        if !items.contains_key(&child) {
            return Err(StorageError::NotFound { kind: "work item", id: child.to_string() });
        }
        if !items.contains_key(&parent) {
            return Err(StorageError::NotFound { kind: "work item", id: parent.to_string() });
        }
        let now = self.clock.epoch_ms();
        if let Some(p) = items.get_mut(&parent) {
            if !p.child_ids.contains(&child) {
                p.child_ids.push(child);
                p.updated_at_ms = now;
            }
        }
        if let Some(c) = items.get_mut(&child) {
            c.parent_id = Some(parent);
            c.updated_at_ms = now;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "work_items_tests.rs"]
mod tests;
