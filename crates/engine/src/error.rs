// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The orchestrator-wide error type. Every component owns its own
//! `thiserror` enum; `RuntimeError` is the only one that crosses the
//! orchestrator-loop boundary, wrapping each of them via `#[from]`.

use fm_core::{TemplateError, WorkItemError, WorkerError};
use fm_storage::StorageError;
use thiserror::Error;

use crate::concurrency::ConcurrencyError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    WorkItem(#[from] WorkItemError),
    #[error(transparent)]
    Worker(#[from] WorkerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Concurrency(#[from] ConcurrencyError),
    #[error("no idle worker available for {role} on work item {item}")]
    NoWorkerAvailable { item: String, role: String },
}

impl RuntimeError {
    /// Whether this error indicates a caller/input bug rather than an
    /// agent malfunction — the same `validation`-class split §7 uses to
    /// decide whether a repository `NotFound` should count against a
    /// worker's error rate.
    pub fn is_validation_class(&self) -> bool {
        matches!(
            self,
            RuntimeError::Template(_)
                | RuntimeError::WorkItem(_)
                | RuntimeError::Worker(_)
                | RuntimeError::Storage(_)
        )
    }
}
