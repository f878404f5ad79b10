// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The subscription hub (C3): a channel-topology pub/sub that fans lifecycle
//! events out to external subscribers. Canonical channels are `all`,
//! `agent:<workerId>`, and `workItem:<workItemId>`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fm_adapters::EventSink;
use fm_core::{WorkItemId, WorkerId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// The logical "everyone" channel.
pub const CHANNEL_ALL: &str = "all";

pub fn agent_channel(id: WorkerId) -> String {
    format!("agent:{id}")
}

pub fn work_item_channel(id: WorkItemId) -> String {
    format!("workItem:{id}")
}

/// The union of event types the hub carries, per the external event
/// transport contract (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[serde(rename = "agent:state_changed")]
    AgentStateChanged,
    #[serde(rename = "agent:spawned")]
    AgentSpawned,
    #[serde(rename = "work_item:updated")]
    WorkItemUpdated,
    #[serde(rename = "work_item:created")]
    WorkItemCreated,
    #[serde(rename = "metrics:updated")]
    MetricsUpdated,
    #[serde(rename = "approval:required")]
    ApprovalRequired,
    #[serde(rename = "error")]
    Error,
}

/// One lifecycle event, matching the external transport's
/// `{type, timestamp, channel?, data}` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub data: serde_json::Value,
}

impl HubEvent {
    pub fn new(event_type: EventType, timestamp_ms: u64, data: serde_json::Value) -> Self {
        Self { event_type, timestamp: timestamp_ms, channel: None, data }
    }

    pub fn on_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Default)]
struct HubState {
    sinks: HashMap<String, Arc<dyn EventSink>>,
    subscriptions: HashMap<String, HashSet<String>>,
}

/// Channel-based pub/sub fan-out of lifecycle events. Fan-out per
/// `broadcast`/`broadcast_to_channel` call runs one task per live sink,
/// joined before returning, so a slow sink never blocks another (§5).
#[derive(Default)]
pub struct SubscriptionHub {
    state: RwLock<HubState>,
}

impl SubscriptionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any existing registration for `client_id`, closing the prior
    /// sink first.
    pub async fn register(&self, client_id: impl Into<String>, sink: Arc<dyn EventSink>) {
        let client_id = client_id.into();
        let prior = {
            let mut state = self.state.write();
            state.subscriptions.entry(client_id.clone()).or_default();
            state.sinks.insert(client_id, sink)
        };
        if let Some(prior) = prior {
            prior.close().await;
        }
    }

    pub async fn unregister(&self, client_id: &str) {
        let sink = {
            let mut state = self.state.write();
            state.subscriptions.remove(client_id);
            state.sinks.remove(client_id)
        };
        if let Some(sink) = sink {
            sink.close().await;
        }
    }

    /// Set semantics, idempotent.
    pub fn subscribe(&self, client_id: &str, channel: impl Into<String>) {
        self.state.write().subscriptions.entry(client_id.to_string()).or_default().insert(channel.into());
    }

    /// A no-op for a channel the client was never subscribed to.
    pub fn unsubscribe(&self, client_id: &str, channel: &str) {
        if let Some(subs) = self.state.write().subscriptions.get_mut(client_id) {
            subs.remove(channel);
        }
    }

    /// Send to every live sink.
    pub async fn broadcast(&self, event: HubEvent) {
        let sinks: Vec<Arc<dyn EventSink>> = self.state.read().sinks.values().cloned().collect();
        Self::fan_out(sinks, event).await;
    }

    /// Send to every sink currently subscribed to `channel`.
    pub async fn broadcast_to_channel(&self, channel: &str, event: HubEvent) {
        let sinks: Vec<Arc<dyn EventSink>> = {
            let state = self.state.read();
            state
                .subscriptions
                .iter()
                .filter(|(_, subs)| subs.contains(channel))
                .filter_map(|(client_id, _)| state.sinks.get(client_id).cloned())
                .collect()
        };
        Self::fan_out(sinks, event).await;
    }

    pub async fn send_to_client(&self, client_id: &str, event: HubEvent) {
        let sink = self.state.read().sinks.get(client_id).cloned();
        if let Some(sink) = sink {
            sink.send(event.to_json()).await;
        }
    }

    async fn fan_out(sinks: Vec<Arc<dyn EventSink>>, event: HubEvent) {
        let payload = event.to_json();
        let handles: Vec<_> = sinks
            .into_iter()
            .map(|sink| {
                let payload = payload.clone();
                tokio::spawn(async move { sink.send(payload).await })
            })
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
