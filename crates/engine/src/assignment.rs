// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The assignment scorer (C6): picks the best idle worker for a work item
//! under a weighted, multi-signal score.

use std::sync::Arc;

use fm_core::{Clock, Role, Template, TemplateId, Worker, WorkItem, WorkItemStatus, WorkerId};
use fm_storage::WorkerRepository;
use parking_lot::RwLock;

use crate::registry::TemplateRegistry;

/// The count of prior completions at which repo familiarity saturates to 1.0.
const FAMILIARITY_SCALE: f64 = 50.0;
/// Half-life, in seconds, of the recency decay signal.
const RECENCY_HALF_LIFE_SECS: f64 = 3600.0;

#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub role_match: f64,
    pub repo_familiarity: f64,
    pub workload_inverse: f64,
    pub low_error_rate: f64,
    pub recency: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { role_match: 0.8, repo_familiarity: 0.7, workload_inverse: 1.0, low_error_rate: 0.6, recency: 0.3 }
    }
}

/// The role a work item's current status calls for.
pub fn role_for_status(status: WorkItemStatus) -> Option<Role> {
    Role::for_work_item_status(status)
}

pub struct AssignmentScorer<C: Clock> {
    workers: Arc<dyn WorkerRepository>,
    registry: Arc<TemplateRegistry<C>>,
    clock: C,
    weights: RwLock<ScoringWeights>,
}

impl<C: Clock> AssignmentScorer<C> {
    pub fn new(workers: Arc<dyn WorkerRepository>, registry: Arc<TemplateRegistry<C>>, clock: C) -> Self {
        Self { workers, registry, clock, weights: RwLock::new(ScoringWeights::default()) }
    }

    pub fn set_weights(&self, weights: ScoringWeights) {
        *self.weights.write() = weights;
    }

    /// Fetch idle workers, filter by capability, score, return the argmax.
    pub async fn find_best_worker(&self, item: &WorkItem, role: Role) -> Option<WorkerId> {
        let candidates = self.workers.find_by_status(fm_core::WorkerStatus::Idle).await;
        let weights = *self.weights.read();
        let mut best: Option<(f64, WorkerId)> = None;
        for worker in candidates {
            let Some(template) = self.registry.get_by_id(worker.template_id).await else { continue };
            if !template.allows_work_item_type(&item.item_type) {
                continue;
            }
            let score = self.score(&worker, &template, item, role, &weights);
            if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
                best = Some((score, worker.id));
            }
        }
        best.map(|(_, id)| id)
    }

    fn score(&self, worker: &Worker, template: &Template, item: &WorkItem, role: Role, weights: &ScoringWeights) -> f64 {
        let role_match = if template.default_role == Some(role) { 1.0 } else { 0.0 };
        let repo_familiarity = item
            .repository_id
            .as_deref()
            .map(|repo_id| familiarity_score(worker.repo_familiarity.get(repo_id).copied().unwrap_or(0)))
            .unwrap_or(0.0);
        let workload_inverse = workload_inverse_score(worker);
        let low_error_rate = low_error_rate_score(worker);
        let recency = self.recency_score(worker);

        weights.role_match * role_match
            + weights.repo_familiarity * repo_familiarity
            + weights.workload_inverse * workload_inverse
            + weights.low_error_rate * low_error_rate
            + weights.recency * recency
    }

    fn recency_score(&self, worker: &Worker) -> f64 {
        match worker.last_completed_at_ms {
            None => 0.0,
            Some(last) => {
                let elapsed_secs = self.clock.epoch_ms().saturating_sub(last) as f64 / 1000.0;
                (-elapsed_secs / RECENCY_HALF_LIFE_SECS).exp()
            }
        }
    }

    pub async fn record_repo_experience(&self, worker_id: WorkerId, repo_id: &str) {
        if let Some(mut worker) = self.workers.find_by_id(worker_id).await {
            worker.record_repo_experience(repo_id);
            let _ = self.workers.update(worker).await;
        }
    }

    /// Picks a compatible, role-matching template for auto-spawn (§4.11's
    /// step 3c). Falls back to any capability-matching template if none
    /// declares `role` as its default.
    pub async fn pick_template_for_auto_spawn(&self, item: &WorkItem, role: Role) -> Option<TemplateId> {
        let candidates = self.registry.find_for_work_item_type(&item.item_type).await;
        candidates
            .iter()
            .find(|t| t.default_role == Some(role))
            .or_else(|| candidates.first())
            .map(|t| t.id)
    }
}

fn familiarity_score(completed_count: u32) -> f64 {
    (((1.0 + completed_count as f64).ln()) / (1.0 + FAMILIARITY_SCALE).ln()).clamp(0.0, 1.0)
}

/// "1 − (cost/budget)" against the one resource budget the data model
/// actually tracks a limit for: the context window.
fn workload_inverse_score(worker: &Worker) -> f64 {
    let budget = worker.context_window_limit.max(1) as f64;
    let used = worker.context_window_used as f64;
    (1.0 - used / budget).clamp(0.0, 1.0)
}

fn low_error_rate_score(worker: &Worker) -> f64 {
    if worker.tool_calls_count == 0 {
        return 1.0;
    }
    (1.0 - worker.error_count as f64 / worker.tool_calls_count as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "assignment_tests.rs"]
mod tests;
