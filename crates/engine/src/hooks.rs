// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle hooks (§9 "Hooks over inheritance"): pre-execution, post-
//! execution, error, status-change, and escalation hooks, registered by
//! string key. Every hook is isolated — one failing hook never short-
//! circuits the others. Pre-execution hooks additionally gate the cycle:
//! any hook returning `false` vetoes the assignment.

use std::collections::HashMap;
use std::sync::Arc;

use fm_core::{WorkItem, WorkItemStatus, Worker};
use parking_lot::Mutex;

pub type PreExecutionHook = Arc<dyn Fn(&WorkItem, &Worker) -> bool + Send + Sync>;
pub type PostExecutionHook = Arc<dyn Fn(&WorkItem, &Worker) + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(&WorkItem, &str) + Send + Sync>;
pub type StatusChangeHook = Arc<dyn Fn(&WorkItem, WorkItemStatus, WorkItemStatus) + Send + Sync>;

#[derive(Default)]
struct Registry<H> {
    hooks: HashMap<String, H>,
}

impl<H: Clone> Registry<H> {
    fn register(&mut self, key: impl Into<String>, hook: H) {
        self.hooks.insert(key.into(), hook);
    }

    fn unregister(&mut self, key: &str) {
        self.hooks.remove(key);
    }

    fn snapshot(&self) -> Vec<H> {
        self.hooks.values().cloned().collect()
    }
}

/// Registry of lifecycle hooks consulted by the orchestrator cycle (§4.11).
/// Escalation hooks live in [`crate::retry::RetryEngine`] instead, since
/// they're keyed to the retry engine's own state.
#[derive(Default)]
pub struct HookRegistry {
    pre_execution: Mutex<Registry<PreExecutionHook>>,
    post_execution: Mutex<Registry<PostExecutionHook>>,
    error: Mutex<Registry<ErrorHook>>,
    status_change: Mutex<Registry<StatusChangeHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_pre_execution(&self, key: impl Into<String>, hook: PreExecutionHook) {
        self.pre_execution.lock().register(key, hook);
    }

    pub fn unregister_pre_execution(&self, key: &str) {
        self.pre_execution.lock().unregister(key);
    }

    pub fn register_post_execution(&self, key: impl Into<String>, hook: PostExecutionHook) {
        self.post_execution.lock().register(key, hook);
    }

    pub fn unregister_post_execution(&self, key: &str) {
        self.post_execution.lock().unregister(key);
    }

    pub fn register_error(&self, key: impl Into<String>, hook: ErrorHook) {
        self.error.lock().register(key, hook);
    }

    pub fn unregister_error(&self, key: &str) {
        self.error.lock().unregister(key);
    }

    pub fn register_status_change(&self, key: impl Into<String>, hook: StatusChangeHook) {
        self.status_change.lock().register(key, hook);
    }

    pub fn unregister_status_change(&self, key: &str) {
        self.status_change.lock().unregister(key);
    }

    /// Runs every pre-execution hook; the assignment is vetoed (returns
    /// `false`) if any hook returns `false`. Hooks always run to completion
    /// — one vetoing does not skip the rest — so all can observe the
    /// candidate pairing.
    pub fn run_pre_execution(&self, item: &WorkItem, worker: &Worker) -> bool {
        let hooks = self.pre_execution.lock().snapshot();
        let mut allowed = true;
        for hook in hooks {
            if !hook(item, worker) {
                allowed = false;
            }
        }
        allowed
    }

    pub fn run_post_execution(&self, item: &WorkItem, worker: &Worker) {
        for hook in self.post_execution.lock().snapshot() {
            hook(item, worker);
        }
    }

    pub fn run_error(&self, item: &WorkItem, message: &str) {
        for hook in self.error.lock().snapshot() {
            hook(item, message);
        }
    }

    pub fn run_status_change(&self, item: &WorkItem, from: WorkItemStatus, to: WorkItemStatus) {
        for hook in self.status_change.lock().snapshot() {
            hook(item, from, to);
        }
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
