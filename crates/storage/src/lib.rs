// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fm-storage: persistence ports for the agent fleet orchestrator.
//!
//! Every entity gets a narrow async-trait repository, object-safe so the
//! engine can depend on `Arc<dyn ...Repository>` without committing to a
//! concrete backing store. The in-memory implementations here are
//! production-usable for a single process; a durable driver would implement
//! the same traits.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod error;
mod executions;
mod order;
mod store;
mod templates;
mod traces;
mod work_items;
mod workers;

pub use error::StorageError;
pub use executions::{ExecutionFilter, ExecutionPage, ExecutionRepository, InMemoryExecutionRepository};
pub use order::OrderBy;
pub use store::Store;
pub use templates::{InMemoryTemplateRepository, TemplateRepository};
pub use traces::{InMemoryTraceRepository, TraceRepository};
pub use work_items::{InMemoryWorkItemRepository, WorkItemRepository};
pub use workers::{InMemoryWorkerRepository, WorkerRepository};
