// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error/retry engine (C9): categorizes failures, computes backoff,
//! schedules retries, escalates after exhaustion, and keeps a structured
//! error history.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use fm_core::{Clock, WorkItemId, WorkerId};
use parking_lot::Mutex;
use rand::Rng;

/// Last-10-per-item ring buffer capacity; `total_failures` is independent
/// and unbounded.
const ERROR_HISTORY_CAPACITY: usize = 10;
const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    RateLimited,
    Transient,
    Resource,
    Validation,
    System,
}

impl ErrorCategory {
    fn multiplier(self) -> u64 {
        match self {
            ErrorCategory::RateLimited => 5,
            ErrorCategory::Transient => 1,
            ErrorCategory::Resource => 3,
            ErrorCategory::Validation => 0,
            ErrorCategory::System => 4,
        }
    }

    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorCategory::Validation)
    }
}

/// Category taxonomy, tested in this declared order; a message matching
/// none of the first four patterns falls back to `System` rather than
/// being rejected — an uncategorized failure is assumed to be an
/// orchestrator/agent bug, not a caller input problem.
fn category_patterns() -> &'static [(ErrorCategory, &'static [&'static str])] {
    &[
        (ErrorCategory::RateLimited, &["rate limit", "429", "quota", "throttled"]),
        (ErrorCategory::Transient, &["timeout", "network", "econn", "enotfound", "socket", "503", "504"]),
        (ErrorCategory::Resource, &["out of memory", "context window", "max tokens", "heap"]),
        (ErrorCategory::Validation, &["invalid", "not found", "400", "401", "403", "permission denied", "missing required"]),
        (ErrorCategory::System, &["unexpected", "fatal", "unhandled"]),
    ]
}

pub fn categorize_error(message: &str) -> ErrorCategory {
    let lower = message.to_lowercase();
    for (category, patterns) in category_patterns() {
        if patterns.iter().any(|p| lower.contains(p)) {
            return *category;
        }
    }
    ErrorCategory::System
}

pub fn should_retry(category: ErrorCategory, attempt: u32, max_retry_attempts: u32) -> bool {
    category.is_retryable() && attempt < max_retry_attempts
}

/// `min(maxDelay, baseDelay × categoryMultiplier × 2^attempt) × (1 ± jitter)`.
/// `jitter` is an explicit parameter in `[-0.25, 0.25]` so the monotone-in-
/// attempt property can be asserted deterministically in tests; production
/// callers go through [`RetryEngine::calculate_retry_delay`], which samples
/// real jitter.
pub fn calculate_retry_delay_with_jitter(attempt: u32, category: ErrorCategory, base_delay_ms: u64, max_delay_ms: u64, jitter: f64) -> u64 {
    let raw = base_delay_ms.saturating_mul(category.multiplier()).saturating_mul(1u64 << attempt.min(32));
    let capped = raw.min(max_delay_ms) as f64;
    (capped * (1.0 + jitter)).round().max(0.0) as u64
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retry_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS, base_delay_ms: 1_000, max_delay_ms: 5 * 60_000 }
    }
}

#[derive(Debug, Clone)]
pub struct RetryContext {
    pub work_item_id: WorkItemId,
    pub attempt: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub scheduled_at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub worker_id: Option<WorkerId>,
    pub message: String,
    pub category: ErrorCategory,
    pub recorded_at_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ErrorHistory {
    pub recent: VecDeque<ErrorRecord>,
    pub total_failures: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ErrorStats {
    pub items_with_failures: usize,
    pub total_failures: u64,
    pub escalated: usize,
}

/// A hook observing an escalation. Isolated: a hook returning `Err` is
/// logged and never aborts the surrounding `escalate` call.
pub type EscalationHook = Arc<dyn Fn(&EscalationEvent) -> Result<(), String> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct EscalationEvent {
    pub work_item_id: WorkItemId,
    pub worker_id: Option<WorkerId>,
    pub reason: String,
    pub category: ErrorCategory,
}

#[derive(Default)]
struct State {
    pending: HashMap<WorkItemId, RetryContext>,
    history: HashMap<WorkItemId, ErrorHistory>,
    escalated: HashSet<WorkItemId>,
    hooks: HashMap<String, EscalationHook>,
}

pub struct RetryEngine<C: Clock> {
    clock: C,
    config: Mutex<RetryConfig>,
    state: Mutex<State>,
}

impl<C: Clock> RetryEngine<C> {
    pub fn new(clock: C, config: RetryConfig) -> Self {
        Self { clock, config: Mutex::new(config), state: Mutex::new(State::default()) }
    }

    pub fn update_config(&self, config: RetryConfig) {
        *self.config.lock() = config;
    }

    pub fn categorize_error(&self, message: &str) -> ErrorCategory {
        categorize_error(message)
    }

    pub fn should_retry(&self, category: ErrorCategory, attempt: u32) -> bool {
        should_retry(category, attempt, self.config.lock().max_retry_attempts)
    }

    pub fn calculate_retry_delay(&self, attempt: u32, category: ErrorCategory) -> u64 {
        let config = self.config.lock().clone();
        let jitter = rand::rng().random_range(-0.25..=0.25);
        calculate_retry_delay_with_jitter(attempt, category, config.base_delay_ms, config.max_delay_ms, jitter)
    }

    /// `None` if the error is non-retryable or retries are exhausted.
    pub fn schedule_retry(&self, item_id: WorkItemId, message: &str, current_attempt: u32) -> Option<RetryContext> {
        let category = categorize_error(message);
        if !self.should_retry(category, current_attempt) {
            return None;
        }
        let delay_ms = self.calculate_retry_delay(current_attempt, category);
        let context = RetryContext {
            work_item_id: item_id,
            attempt: current_attempt + 1,
            category,
            message: message.to_string(),
            scheduled_at_ms: self.clock.epoch_ms() + delay_ms,
        };
        self.state.lock().pending.insert(item_id, context.clone());
        Some(context)
    }

    /// Drains (removes) every retry whose scheduled time has passed.
    pub fn get_ready_retries(&self) -> Vec<RetryContext> {
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();
        let ready_ids: Vec<WorkItemId> =
            state.pending.iter().filter(|(_, ctx)| ctx.scheduled_at_ms <= now).map(|(id, _)| *id).collect();
        ready_ids.into_iter().filter_map(|id| state.pending.remove(&id)).collect()
    }

    pub fn cancel_retry(&self, item_id: WorkItemId) {
        self.state.lock().pending.remove(&item_id);
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn record_error(&self, item_id: WorkItemId, worker_id: Option<WorkerId>, message: &str, category: ErrorCategory) {
        let mut state = self.state.lock();
        let history = state.history.entry(item_id).or_default();
        if history.recent.len() == ERROR_HISTORY_CAPACITY {
            history.recent.pop_front();
        }
        history.recent.push_back(ErrorRecord {
            worker_id,
            message: message.to_string(),
            category,
            recorded_at_ms: self.clock.epoch_ms(),
        });
        history.total_failures += 1;
    }

    pub fn register_escalation_hook(&self, key: impl Into<String>, hook: EscalationHook) {
        self.state.lock().hooks.insert(key.into(), hook);
    }

    pub fn unregister_escalation_hook(&self, key: &str) {
        self.state.lock().hooks.remove(key);
    }

    /// Runs every registered escalation hook, isolating failures, and marks
    /// the item escalated.
    pub fn escalate(&self, item_id: WorkItemId, worker_id: Option<WorkerId>, reason: &str, category: ErrorCategory) {
        let hooks: Vec<EscalationHook> = {
            let mut state = self.state.lock();
            state.escalated.insert(item_id);
            state.hooks.values().cloned().collect()
        };
        let event = EscalationEvent { work_item_id: item_id, worker_id, reason: reason.to_string(), category };
        for hook in hooks {
            if let Err(err) = hook(&event) {
                tracing::warn!(work_item_id = %item_id, error = %err, "escalation hook failed");
            }
        }
    }

    pub fn is_escalated(&self, item_id: WorkItemId) -> bool {
        self.state.lock().escalated.contains(&item_id)
    }

    pub fn get_error_history(&self, item_id: WorkItemId) -> ErrorHistory {
        self.state.lock().history.get(&item_id).cloned().unwrap_or_default()
    }

    pub fn get_error_stats(&self) -> ErrorStats {
        let state = self.state.lock();
        ErrorStats {
            items_with_failures: state.history.len(),
            total_failures: state.history.values().map(|h| h.total_failures).sum(),
            escalated: state.escalated.len(),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
