// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identifier type for tracking scheduled retries.
//!
//! A `TimerId` names a single scheduled wake-up: a due retry for a work
//! item, or a periodic cycle tick. Encoding the kind into the id string lets
//! the orchestrator route a fired timer back to its handler without a side
//! table. Unlike entity ids, timer ids are not bounded to [`crate::id::ID_MAX_LEN`]
//! bytes (they embed a full entity id plus a kind tag), so this type wraps a
//! plain `String` rather than [`crate::id::IdBuf`].

use crate::ids::WorkItemId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a scheduled timer, encoding its kind and target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    pub fn queue_retry(item: WorkItemId) -> Self {
        TimerKind::QueueRetry { item }.to_timer_id()
    }

    pub fn cycle_tick() -> Self {
        TimerKind::CycleTick.to_timer_id()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse this timer id into a typed `TimerKind`.
    pub fn kind(&self) -> Option<TimerKind> {
        TimerKind::parse(&self.0)
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed representation of a timer id for type-safe routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    QueueRetry { item: WorkItemId },
    CycleTick,
}

impl TimerKind {
    /// Parse a timer id string into a typed `TimerKind`.
    pub fn parse(id: &str) -> Option<TimerKind> {
        if let Some(rest) = id.strip_prefix("queue-retry:") {
            return Some(TimerKind::QueueRetry { item: WorkItemId::from_string(rest) });
        }
        if id == "cycle-tick" {
            return Some(TimerKind::CycleTick);
        }
        None
    }

    /// Format this `TimerKind` back into a canonical `TimerId`.
    pub fn to_timer_id(&self) -> TimerId {
        match self {
            TimerKind::QueueRetry { item } => TimerId(format!("queue-retry:{item}")),
            TimerKind::CycleTick => TimerId("cycle-tick".to_string()),
        }
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
