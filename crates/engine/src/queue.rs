// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The work-item queue manager (C5): an in-memory priority queue over
//! `ready`, unblocked work items.

use std::collections::HashMap;
use std::sync::Arc;

use fm_core::{WorkItem, WorkItemId, WorkItemStatus, WorkItemType};
use fm_storage::{OrderBy, WorkItemRepository};
use parking_lot::Mutex;

/// One queued item's scheduling metadata, independent of the full
/// [`WorkItem`] record.
#[derive(Debug, Clone)]
struct QueueEntry {
    item_type: WorkItemType,
    created_at_ms: u64,
    retry_count: u32,
}

/// A snapshot of a queue entry returned from the public API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedItem {
    pub id: WorkItemId,
    pub item_type: WorkItemType,
    pub retry_count: u32,
    pub created_at_ms: u64,
}

fn priority_rank(item_type: &WorkItemType) -> u8 {
    match item_type {
        WorkItemType::Bug => 0,
        WorkItemType::Feature | WorkItemType::Task => 1,
        WorkItemType::Research => 2,
        WorkItemType::Other(_) => 3,
    }
}

/// Sort key: lower sorts first (higher priority). Requeued items get a
/// monotonic penalty equal to their retry count; ties break by ascending
/// `createdAt`.
fn sort_key(id: WorkItemId, entry: &QueueEntry) -> (u8, u32, u64, WorkItemId) {
    (priority_rank(&entry.item_type), entry.retry_count, entry.created_at_ms, id)
}

/// The predicate deciding whether a blocker unblocks its dependents.
/// Defaults to "reached `done`" per §4.5's Open Question resolution;
/// pluggable so an alternate interpretation never requires touching the
/// scheduling code itself.
pub type UnblockingPredicate = Arc<dyn Fn(WorkItemStatus) -> bool + Send + Sync>;

pub struct WorkItemQueue {
    repo: Arc<dyn WorkItemRepository>,
    entries: Mutex<HashMap<WorkItemId, QueueEntry>>,
    is_unblocking: UnblockingPredicate,
}

impl WorkItemQueue {
    pub fn new(repo: Arc<dyn WorkItemRepository>) -> Self {
        Self { repo, entries: Mutex::new(HashMap::new()), is_unblocking: Arc::new(WorkItem::is_unblocking) }
    }

    pub fn with_unblocking_predicate(mut self, predicate: UnblockingPredicate) -> Self {
        self.is_unblocking = predicate;
        self
    }

    async fn is_eligible(&self, item: &WorkItem) -> bool {
        if item.status != WorkItemStatus::Ready {
            return false;
        }
        for blocker_id in &item.blocked_by {
            match self.repo.find_by_id(*blocker_id).await {
                Some(blocker) if (self.is_unblocking)(blocker.status) => {}
                _ => return false,
            }
        }
        true
    }

    /// Pulls from persistence, dedups by id, re-sorts. Idempotent: items
    /// already present keep their accumulated retry count; items no longer
    /// eligible are evicted.
    pub async fn refresh_queue(&self) {
        let ready = self.repo.find_by_status(WorkItemStatus::Ready, OrderBy::CreatedAtAsc).await;
        let mut eligible_ids = std::collections::HashSet::new();
        let mut fresh: Vec<(WorkItemId, WorkItemType, u64)> = Vec::new();
        for item in ready {
            if self.is_eligible(&item).await {
                eligible_ids.insert(item.id);
                fresh.push((item.id, item.item_type.clone(), item.created_at_ms));
            }
        }
        let mut entries = self.entries.lock();
        entries.retain(|id, _| eligible_ids.contains(id));
        for (id, item_type, created_at_ms) in fresh {
            entries
                .entry(id)
                .and_modify(|e| {
                    e.item_type = item_type.clone();
                    e.created_at_ms = created_at_ms;
                })
                .or_insert(QueueEntry { item_type, created_at_ms, retry_count: 0 });
        }
    }

    /// O(1) amortized variant of [`Self::refresh_queue`] for a single item —
    /// used by the retry drain's hot path.
    pub async fn refresh_item(&self, id: WorkItemId) {
        let Some(item) = self.repo.find_by_id(id).await else {
            self.entries.lock().remove(&id);
            return;
        };
        if self.is_eligible(&item).await {
            let mut entries = self.entries.lock();
            entries
                .entry(id)
                .and_modify(|e| {
                    e.item_type = item.item_type.clone();
                    e.created_at_ms = item.created_at_ms;
                })
                .or_insert(QueueEntry { item_type: item.item_type, created_at_ms: item.created_at_ms, retry_count: 0 });
        } else {
            self.entries.lock().remove(&id);
        }
    }

    /// Pops the highest-priority item, if any.
    pub fn get_next(&self) -> Option<QueuedItem> {
        let mut entries = self.entries.lock();
        let best = entries.iter().min_by_key(|(id, e)| sort_key(**id, e)).map(|(id, _)| *id)?;
        let entry = entries.remove(&best)?;
        Some(QueuedItem { id: best, item_type: entry.item_type, retry_count: entry.retry_count, created_at_ms: entry.created_at_ms })
    }

    /// Reinsert `item` after a failure, incrementing its retry count by
    /// exactly one. `error_msg` is accepted for call-site symmetry with the
    /// retry engine but carries no state here (error history lives in C9).
    pub fn requeue(&self, item: QueuedItem, _error_msg: &str) {
        let mut entries = self.entries.lock();
        entries
            .entry(item.id)
            .and_modify(|e| e.retry_count += 1)
            .or_insert(QueueEntry { item_type: item.item_type, created_at_ms: item.created_at_ms, retry_count: item.retry_count + 1 });
    }

    pub fn remove(&self, id: WorkItemId) {
        self.entries.lock().remove(&id);
    }

    /// Overwrites a live entry's retry count, e.g. to align the queue's
    /// priority penalty with the retry engine's own attempt counter once a
    /// due retry is reinstated.
    pub fn set_retry_count(&self, id: WorkItemId, retry_count: u32) {
        if let Some(entry) = self.entries.lock().get_mut(&id) {
            entry.retry_count = retry_count;
        }
    }

    pub fn get_queue_items(&self) -> Vec<QueuedItem> {
        let entries = self.entries.lock();
        let mut items: Vec<QueuedItem> = entries
            .iter()
            .map(|(id, e)| QueuedItem { id: *id, item_type: e.item_type.clone(), retry_count: e.retry_count, created_at_ms: e.created_at_ms })
            .collect();
        items.sort_by_key(|q| sort_key(q.id, &QueueEntry { item_type: q.item_type.clone(), created_at_ms: q.created_at_ms, retry_count: q.retry_count }));
        items
    }

    pub fn get_queue_length(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
