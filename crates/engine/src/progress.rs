// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The progress tracker (C10): wraps the work item state machine to emit
//! lifecycle events, pushing them to the hub and to any locally registered
//! listeners. Per work item, events are strictly ordered; across items,
//! ordering is not guaranteed (§5).

use std::collections::HashMap;
use std::sync::Arc;

use fm_core::{Clock, ExecutionId, WorkItemId, WorkItemStatus, WorkerId};
use fm_storage::WorkItemRepository;
use parking_lot::Mutex;
use serde_json::json;

use crate::hub::{work_item_channel, EventType, HubEvent, SubscriptionHub, CHANNEL_ALL};

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEventKind {
    Started,
    InProgress { percent: u8 },
    Milestone { label: String },
    Blocked { reason: String },
    Completed,
    Failed { message: String },
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub work_item_id: WorkItemId,
    pub worker_id: WorkerId,
    pub execution_id: Option<ExecutionId>,
    pub kind: ProgressEventKind,
    pub message: Option<String>,
    pub timestamp_ms: u64,
}

pub type ProgressListener = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: HashMap<u64, ProgressListener>,
}

pub struct ProgressTracker<C: Clock> {
    items: Arc<dyn WorkItemRepository>,
    hub: Arc<SubscriptionHub>,
    clock: C,
    listeners: Mutex<ListenerRegistry>,
    history: Mutex<HashMap<WorkItemId, Vec<ProgressEvent>>>,
}

impl<C: Clock> ProgressTracker<C> {
    pub fn new(items: Arc<dyn WorkItemRepository>, hub: Arc<SubscriptionHub>, clock: C) -> Self {
        Self { items, hub, clock, listeners: Mutex::new(ListenerRegistry::default()), history: Mutex::new(HashMap::new()) }
    }

    /// Registers a listener, returning a detach thunk that removes it.
    pub fn add_listener(&self, listener: ProgressListener) -> impl FnOnce() + '_ {
        let id = {
            let mut registry = self.listeners.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.insert(id, listener);
            id
        };
        move || {
            self.listeners.lock().listeners.remove(&id);
        }
    }

    pub async fn mark_started(&self, item_id: WorkItemId, worker_id: WorkerId, execution_id: ExecutionId) -> Result<(), fm_core::WorkItemError> {
        if let Some(mut item) = self.items.find_by_id(item_id).await {
            item.transition_to(WorkItemStatus::InProgress, self.clock.epoch_ms())?;
            let _ = self.items.update(item).await;
        }
        self.emit(ProgressEvent {
            work_item_id: item_id,
            worker_id,
            execution_id: Some(execution_id),
            kind: ProgressEventKind::Started,
            message: None,
            timestamp_ms: self.clock.epoch_ms(),
        })
        .await;
        Ok(())
    }

    pub async fn update_progress(&self, item_id: WorkItemId, worker_id: WorkerId, percent: u8, message: Option<String>) {
        let percent = percent.min(99);
        self.emit(ProgressEvent {
            work_item_id: item_id,
            worker_id,
            execution_id: None,
            kind: ProgressEventKind::InProgress { percent },
            message,
            timestamp_ms: self.clock.epoch_ms(),
        })
        .await;
    }

    pub async fn record_milestone(&self, item_id: WorkItemId, worker_id: WorkerId, label: impl Into<String>) {
        self.emit(ProgressEvent {
            work_item_id: item_id,
            worker_id,
            execution_id: None,
            kind: ProgressEventKind::Milestone { label: label.into() },
            message: None,
            timestamp_ms: self.clock.epoch_ms(),
        })
        .await;
    }

    /// No status change — the item stays wherever it was.
    pub async fn mark_blocked(&self, item_id: WorkItemId, worker_id: WorkerId, reason: impl Into<String>) {
        self.emit(ProgressEvent {
            work_item_id: item_id,
            worker_id,
            execution_id: None,
            kind: ProgressEventKind::Blocked { reason: reason.into() },
            message: None,
            timestamp_ms: self.clock.epoch_ms(),
        })
        .await;
    }

    pub async fn mark_completed(&self, item_id: WorkItemId, worker_id: WorkerId, execution_id: ExecutionId) -> Result<(), fm_core::WorkItemError> {
        if let Some(mut item) = self.items.find_by_id(item_id).await {
            item.transition_to(WorkItemStatus::Review, self.clock.epoch_ms())?;
            let _ = self.items.update(item).await;
        }
        self.emit(ProgressEvent {
            work_item_id: item_id,
            worker_id,
            execution_id: Some(execution_id),
            kind: ProgressEventKind::Completed,
            message: None,
            timestamp_ms: self.clock.epoch_ms(),
        })
        .await;
        self.history.lock().remove(&item_id);
        Ok(())
    }

    /// No status change — the orchestrator decides whether to retry.
    pub async fn mark_failed(&self, item_id: WorkItemId, worker_id: WorkerId, message: impl Into<String>) {
        let message = message.into();
        self.emit(ProgressEvent {
            work_item_id: item_id,
            worker_id,
            execution_id: None,
            kind: ProgressEventKind::Failed { message: message.clone() },
            message: Some(message),
            timestamp_ms: self.clock.epoch_ms(),
        })
        .await;
    }

    pub fn get_history(&self, item_id: WorkItemId) -> Vec<ProgressEvent> {
        self.history.lock().get(&item_id).cloned().unwrap_or_default()
    }

    async fn emit(&self, event: ProgressEvent) {
        self.history.lock().entry(event.work_item_id).or_default().push(event.clone());

        let listeners: Vec<ProgressListener> = self.listeners.lock().listeners.values().cloned().collect();
        for listener in &listeners {
            listener(&event);
        }

        let hub_event = HubEvent::new(EventType::WorkItemUpdated, event.timestamp_ms, progress_payload(&event));
        let channel = work_item_channel(event.work_item_id);
        self.hub.broadcast_to_channel(&channel, hub_event.clone().on_channel(channel.clone())).await;
        self.hub.broadcast_to_channel(CHANNEL_ALL, hub_event.on_channel(CHANNEL_ALL)).await;
    }
}

fn progress_payload(event: &ProgressEvent) -> serde_json::Value {
    let (kind, extra) = match &event.kind {
        ProgressEventKind::Started => ("started", json!({})),
        ProgressEventKind::InProgress { percent } => ("in-progress", json!({ "percent": percent })),
        ProgressEventKind::Milestone { label } => ("milestone", json!({ "label": label })),
        ProgressEventKind::Blocked { reason } => ("blocked", json!({ "reason": reason })),
        ProgressEventKind::Completed => ("completed", json!({})),
        ProgressEventKind::Failed { message } => ("failed", json!({ "message": message })),
    };
    json!({
        "workItemId": event.work_item_id.to_string(),
        "workerId": event.worker_id.to_string(),
        "executionId": event.execution_id.map(|id| id.to_string()),
        "kind": kind,
        "message": event.message,
        "extra": extra,
    })
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
