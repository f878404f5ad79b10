// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrency limits (C8): global, per-repository, and per-user admission
//! control. The check-and-increment pair for `can_start_execution` plus
//! `register_start` is performed in one critical section so counters never
//! race an admission decision (§5).

use std::collections::{HashMap, HashSet};

use fm_core::{WorkItem, WorkerId};
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyConfig {
    pub max_global_workers: u32,
    pub max_workers_per_repo: u32,
    pub max_workers_per_user: u32,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self { max_global_workers: 10, max_workers_per_repo: 3, max_workers_per_user: 5 }
    }
}

#[derive(Debug, Clone)]
pub struct Admission {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl Admission {
    fn allow() -> Self {
        Self { allowed: true, reason: None }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self { allowed: false, reason: Some(reason.into()) }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConcurrencyStatus {
    pub global: u32,
    pub max_global_workers: u32,
    pub per_repo: HashMap<String, u32>,
    pub per_user: HashMap<String, u32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConcurrencyError {
    #[error("registerStart called twice for ({work_item}, {worker}) without an intervening registerCompletion")]
    AlreadyStarted { work_item: String, worker: String },
}

struct State {
    config: ConcurrencyConfig,
    global: u32,
    per_repo: HashMap<String, u32>,
    per_user: HashMap<String, u32>,
    active_pairs: HashSet<(String, String)>,
}

pub struct ConcurrencyLimits {
    state: Mutex<State>,
}

impl ConcurrencyLimits {
    pub fn new(config: ConcurrencyConfig) -> Self {
        Self { state: Mutex::new(State { config, global: 0, per_repo: HashMap::new(), per_user: HashMap::new(), active_pairs: HashSet::new() }) }
    }

    pub fn update_config(&self, config: ConcurrencyConfig) {
        self.state.lock().config = config;
    }

    /// Whether starting execution of `item` would stay within every
    /// dimension's cap. A missing `repository_id`/`created_by` exempts that
    /// dimension entirely.
    pub fn can_start_execution(&self, item: &WorkItem) -> Admission {
        let state = self.state.lock();
        if state.global >= state.config.max_global_workers {
            return Admission::deny(format!("Global limit of {} reached", state.config.max_global_workers));
        }
        if let Some(repo) = &item.repository_id {
            let count = state.per_repo.get(repo).copied().unwrap_or(0);
            if count >= state.config.max_workers_per_repo {
                return Admission::deny(format!(
                    "Per-repository limit of {} reached for {repo}",
                    state.config.max_workers_per_repo
                ));
            }
        }
        if let Some(user) = &item.created_by {
            let count = state.per_user.get(user).copied().unwrap_or(0);
            if count >= state.config.max_workers_per_user {
                return Admission::deny(format!(
                    "Per-user limit of {} reached for {user}",
                    state.config.max_workers_per_user
                ));
            }
        }
        Admission::allow()
    }

    pub fn register_start(&self, item: &WorkItem, worker: WorkerId) -> Result<(), ConcurrencyError> {
        let mut state = self.state.lock();
        let key = (item.id.to_string(), worker.to_string());
        if !state.active_pairs.insert(key.clone()) {
            return Err(ConcurrencyError::AlreadyStarted { work_item: key.0, worker: key.1 });
        }
        state.global += 1;
        if let Some(repo) = item.repository_id.clone() {
            *state.per_repo.entry(repo).or_insert(0) += 1;
        }
        if let Some(user) = item.created_by.clone() {
            *state.per_user.entry(user).or_insert(0) += 1;
        }
        Ok(())
    }

    pub fn register_completion(&self, item: &WorkItem, worker: WorkerId) {
        let mut state = self.state.lock();
        let key = (item.id.to_string(), worker.to_string());
        if !state.active_pairs.remove(&key) {
            return;
        }
        state.global = state.global.saturating_sub(1);
        if let Some(repo) = &item.repository_id {
            if let Some(count) = state.per_repo.get_mut(repo) {
                *count = count.saturating_sub(1);
            }
        }
        if let Some(user) = &item.created_by {
            if let Some(count) = state.per_user.get_mut(user) {
                *count = count.saturating_sub(1);
            }
        }
    }

    pub fn get_status(&self) -> ConcurrencyStatus {
        let state = self.state.lock();
        ConcurrencyStatus {
            global: state.global,
            max_global_workers: state.config.max_global_workers,
            per_repo: state.per_repo.clone(),
            per_user: state.per_user.clone(),
        }
    }
}

#[cfg(test)]
#[path = "concurrency_tests.rs"]
mod tests;
