// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence port for [`Worker`]s (C1).

use std::collections::HashMap;

use async_trait::async_trait;
use fm_core::{TemplateId, Worker, WorkerId, WorkerStatus};
use parking_lot::RwLock;

use crate::error::StorageError;

#[async_trait]
pub trait WorkerRepository: Send + Sync {
    async fn create(&self, worker: Worker) -> Result<(), StorageError>;
    async fn update(&self, worker: Worker) -> Result<(), StorageError>;
    async fn delete(&self, id: WorkerId) -> Result<(), StorageError>;
    async fn find_by_id(&self, id: WorkerId) -> Option<Worker>;
    async fn find_all(&self) -> Vec<Worker>;
    async fn find_by_status(&self, status: WorkerStatus) -> Vec<Worker>;
    async fn find_by_template(&self, template: TemplateId) -> Vec<Worker>;
    async fn count_active(&self) -> usize;
}

#[derive(Default)]
pub struct InMemoryWorkerRepository {
    workers: RwLock<HashMap<WorkerId, Worker>>,
}

impl InMemoryWorkerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkerRepository for InMemoryWorkerRepository {
    async fn create(&self, worker: Worker) -> Result<(), StorageError> {
        self.workers.write().insert(worker.id, worker);
        Ok(())
    }

    async fn update(&self, worker: Worker) -> Result<(), StorageError> {
        let mut workers = self.workers.write();
        if !workers.contains_key(&worker.id) {
            return Err(StorageError::NotFound { kind: "worker", id: worker.id.to_string() });
        }
        workers.insert(worker.id, worker);
        Ok(())
    }

    async fn delete(&self, id: WorkerId) -> Result<(), StorageError> {
        self.workers.write().remove(&id).map(|_| ()).ok_or(StorageError::NotFound { kind: "worker", id: id.to_string() })
    }

    async fn find_by_id(&self, id: WorkerId) -> Option<Worker> {
        self.workers.read().get(&id).cloned()
    }

    async fn find_all(&self) -> Vec<Worker> {
        self.workers.read().values().cloned().collect()
    }

    async fn find_by_status(&self, status: WorkerStatus) -> Vec<Worker> {
        self.workers.read().values().filter(|w| w.status == status).cloned().collect()
    }

    async fn find_by_template(&self, template: TemplateId) -> Vec<Worker> {
        self.workers.read().values().filter(|w| w.template_id == template).cloned().collect()
    }

    async fn count_active(&self) -> usize {
        self.workers.read().values().filter(|w| w.counts_against_pool_cap()).count()
    }
}

#[cfg(test)]
#[path = "workers_tests.rs"]
mod tests;
