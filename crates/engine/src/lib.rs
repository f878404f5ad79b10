// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fm-engine: the orchestration runtime. Wraps `fm-storage`'s persistence
//! ports and `fm-adapters`' executor/event-sink ports into the eleven
//! components that make up one orchestrator cycle — template registry,
//! subscription hub, worker pool, queue manager, assignment scorer,
//! concurrency limits, error/retry engine, progress tracker, lifecycle
//! hooks, and the cycle loop itself.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod assignment;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod hooks;
pub mod hub;
pub mod orchestrator;
pub mod progress;
pub mod queue;
pub mod registry;
pub mod retry;
pub mod worker_pool;

pub use assignment::{role_for_status, AssignmentScorer, ScoringWeights};
pub use concurrency::{Admission, ConcurrencyConfig, ConcurrencyError, ConcurrencyLimits, ConcurrencyStatus};
pub use config::{OrchestratorConfig, PartialOrchestratorConfig};
pub use error::RuntimeError;
pub use hooks::{HookRegistry, PreExecutionHook};
pub use hub::{agent_channel, work_item_channel, EventType, HubEvent, SubscriptionHub, CHANNEL_ALL};
pub use orchestrator::{Orchestrator, OrchestratorStatus};
pub use progress::{ProgressEvent, ProgressEventKind, ProgressListener, ProgressTracker};
pub use queue::{QueuedItem, UnblockingPredicate, WorkItemQueue};
pub use registry::TemplateRegistry;
pub use retry::{categorize_error, should_retry, ErrorCategory, ErrorStats, RetryConfig, RetryContext, RetryEngine};
pub use worker_pool::{PoolSummary, WorkerPool};
