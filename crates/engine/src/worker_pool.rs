// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker pool (C4): spawns, terminates, pauses, resumes workers; tracks
//! per-worker metrics; enforces a global worker cap.

use std::sync::Arc;

use fm_core::{Clock, MetricsDelta, Role, TemplateId, Worker, WorkerError, WorkerId, WorkerStatus, WorkItemId};
use fm_storage::WorkerRepository;
use parking_lot::Mutex;

/// Summary returned by [`WorkerPool::get_pool`].
#[derive(Debug, Clone, Default)]
pub struct PoolSummary {
    pub total: usize,
    pub idle: usize,
    pub working: usize,
    pub paused: usize,
    pub error: usize,
    pub terminated: usize,
}

pub struct WorkerPool<C: Clock> {
    repo: Arc<dyn WorkerRepository>,
    clock: C,
    /// Runtime-configurable cap; only non-terminated workers count against it.
    max_workers: Mutex<u32>,
}

impl<C: Clock> WorkerPool<C> {
    pub fn new(repo: Arc<dyn WorkerRepository>, clock: C, max_workers: u32) -> Self {
        Self { repo, clock, max_workers: Mutex::new(max_workers) }
    }

    pub fn set_max_workers(&self, max_workers: u32) {
        *self.max_workers.lock() = max_workers;
    }

    pub async fn can_spawn_more(&self) -> bool {
        (self.repo.count_active().await as u32) < *self.max_workers.lock()
    }

    pub async fn spawn(&self, template_id: TemplateId, session_id: impl Into<String>) -> Result<Worker, WorkerError> {
        if !self.can_spawn_more().await {
            return Err(WorkerError::PoolExhausted(*self.max_workers.lock()));
        }
        let worker = Worker::spawn(template_id, session_id, self.clock.epoch_ms());
        self.repo.create(worker.clone()).await.map_err(|_| WorkerError::PoolExhausted(*self.max_workers.lock()))?;
        Ok(worker)
    }

    pub async fn terminate(&self, id: WorkerId) -> Result<(), WorkerError> {
        let mut worker = self.repo.find_by_id(id).await.ok_or(WorkerError::NotFound(id))?;
        worker.terminate();
        self.repo.update(worker).await.map_err(|_| WorkerError::NotFound(id))
    }

    pub async fn pause(&self, id: WorkerId) -> Result<(), WorkerError> {
        self.mutate(id, |w| w.pause()).await
    }

    pub async fn resume(&self, id: WorkerId) -> Result<(), WorkerError> {
        self.mutate(id, |w| w.resume()).await
    }

    pub async fn assign_work(&self, id: WorkerId, item: WorkItemId, role: Role) -> Result<(), WorkerError> {
        self.mutate(id, |w| w.assign_work(item, role)).await
    }

    pub async fn complete_work(&self, id: WorkerId) -> Result<(), WorkerError> {
        let now = self.clock.epoch_ms();
        self.mutate(id, move |w| {
            w.complete_work(now);
            Ok(())
        })
        .await
    }

    pub async fn report_error(&self, id: WorkerId) -> Result<(), WorkerError> {
        self.mutate(id, |w| {
            w.report_error();
            Ok(())
        })
        .await
    }

    /// Accumulates a strictly-incremental metrics delta. Moves the worker to
    /// `error` if it exhausts its context window.
    pub async fn update_metrics(&self, id: WorkerId, delta: MetricsDelta) -> Result<(), WorkerError> {
        self.mutate(id, move |w| {
            w.apply_metrics(delta);
            Ok(())
        })
        .await
    }

    pub async fn record_repo_experience(&self, id: WorkerId, repo_id: &str) -> Result<(), WorkerError> {
        self.mutate(id, move |w| {
            w.record_repo_experience(repo_id);
            Ok(())
        })
        .await
    }

    async fn mutate(
        &self,
        id: WorkerId,
        f: impl FnOnce(&mut Worker) -> Result<(), WorkerError>,
    ) -> Result<(), WorkerError> {
        let mut worker = self.repo.find_by_id(id).await.ok_or(WorkerError::NotFound(id))?;
        f(&mut worker)?;
        self.repo.update(worker).await.map_err(|_| WorkerError::NotFound(id))
    }

    pub async fn get_pool(&self) -> PoolSummary {
        let workers = self.repo.find_all().await;
        let mut summary = PoolSummary { total: workers.len(), ..Default::default() };
        for w in &workers {
            match w.status {
                WorkerStatus::Idle => summary.idle += 1,
                WorkerStatus::Working => summary.working += 1,
                WorkerStatus::Paused => summary.paused += 1,
                WorkerStatus::Error => summary.error += 1,
                WorkerStatus::Terminated => summary.terminated += 1,
            }
        }
        summary
    }

    pub async fn get_available_workers(&self) -> Vec<Worker> {
        self.repo.find_by_status(WorkerStatus::Idle).await
    }

    pub async fn get_workers_by_template(&self, template_id: TemplateId) -> Vec<Worker> {
        self.repo.find_by_template(template_id).await
    }

    pub async fn get_worker(&self, id: WorkerId) -> Option<Worker> {
        self.repo.find_by_id(id).await
    }
}

#[cfg(test)]
#[path = "worker_pool_tests.rs"]
mod tests;
