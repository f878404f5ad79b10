// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A facade bundling the five repositories behind one cloneable handle.

use std::sync::Arc;

use fm_core::Clock;

use crate::executions::{ExecutionRepository, InMemoryExecutionRepository};
use crate::templates::{InMemoryTemplateRepository, TemplateRepository};
use crate::traces::{InMemoryTraceRepository, TraceRepository};
use crate::work_items::{InMemoryWorkItemRepository, WorkItemRepository};
use crate::workers::{InMemoryWorkerRepository, WorkerRepository};

/// All five persistence ports, wired together. Cloneable: every field is an
/// `Arc` to a shared repository.
#[derive(Clone)]
pub struct Store {
    pub templates: Arc<dyn TemplateRepository>,
    pub work_items: Arc<dyn WorkItemRepository>,
    pub workers: Arc<dyn WorkerRepository>,
    pub executions: Arc<dyn ExecutionRepository>,
    pub traces: Arc<dyn TraceRepository>,
}

impl Store {
    /// `clock` backs the work-item repository's `updatedAt` stamping; the
    /// template registry carries its own clock at the engine layer.
    pub fn in_memory<C: Clock + 'static>(clock: C) -> Self {
        Self {
            templates: Arc::new(InMemoryTemplateRepository::new()),
            work_items: Arc::new(InMemoryWorkItemRepository::new(clock)),
            workers: Arc::new(InMemoryWorkerRepository::new()),
            executions: Arc::new(InMemoryExecutionRepository::new()),
            traces: Arc::new(InMemoryTraceRepository::new()),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
