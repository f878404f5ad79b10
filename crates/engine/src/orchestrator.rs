// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The orchestrator loop (C11): the single writer that drains retries,
//! refreshes the queue, and assigns ready work items to idle (or freshly
//! spawned) workers, one cycle at a time.
//!
//! `force_cycle` spawns each admitted item's executor invocation as its own
//! task (so independent items genuinely run concurrently) but joins every
//! task before returning, giving the cycle a single deterministic
//! completion point — the one place §5's "background, delivered
//! asynchronously" model diverges from the source material, made for
//! testability; `start()`'s ticker loop does not need this since nothing
//! awaits its completion.

use std::sync::Arc;

use fm_adapters::{ExecutionOutcome, ExecutionRequest, Executor};
use fm_core::{Clock, Execution, ExecutionStatus, MetricsDelta, Role, WorkItem, WorkItemStatus, Worker, WorkerId};
use fm_storage::Store;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::assignment::{role_for_status, AssignmentScorer};
use crate::concurrency::ConcurrencyLimits;
use crate::config::{OrchestratorConfig, PartialOrchestratorConfig};
use crate::hooks::HookRegistry;
use crate::hub::SubscriptionHub;
use crate::progress::ProgressTracker;
use crate::queue::WorkItemQueue;
use crate::registry::TemplateRegistry;
use crate::retry::{ErrorCategory, RetryEngine};
use crate::worker_pool::{PoolSummary, WorkerPool};

#[derive(Debug, Clone, Default)]
pub struct OrchestratorStatus {
    pub cycle_count: u64,
    pub queue_length: usize,
    pub pending_retries: usize,
    pub worker_counts: PoolSummary,
    pub last_cycle_at_ms: Option<u64>,
}

pub struct Orchestrator<C: Clock + 'static> {
    pub store: Store,
    clock: C,
    pub registry: Arc<TemplateRegistry<C>>,
    pub hub: Arc<SubscriptionHub>,
    pub pool: Arc<WorkerPool<C>>,
    pub queue: Arc<WorkItemQueue>,
    pub assignment: Arc<AssignmentScorer<C>>,
    pub limits: Arc<ConcurrencyLimits>,
    pub retry: Arc<RetryEngine<C>>,
    pub progress: Arc<ProgressTracker<C>>,
    pub hooks: Arc<HookRegistry>,
    executor: Arc<dyn Executor>,
    config: Mutex<OrchestratorConfig>,
    cycle_count: Mutex<u64>,
    last_cycle_at_ms: Mutex<Option<u64>>,
    cancellation: CancellationToken,
    ticker_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Clock + Clone + Send + Sync + 'static> Orchestrator<C> {
    pub fn new(store: Store, clock: C, executor: Arc<dyn Executor>, config: OrchestratorConfig) -> Arc<Self> {
        let registry = Arc::new(TemplateRegistry::new(store.templates.clone(), store.workers.clone(), clock.clone()));
        let hub = Arc::new(SubscriptionHub::new());
        let pool = Arc::new(WorkerPool::new(store.workers.clone(), clock.clone(), config.max_global_workers));
        let queue = Arc::new(WorkItemQueue::new(store.work_items.clone()));
        let assignment = Arc::new(AssignmentScorer::new(store.workers.clone(), registry.clone(), clock.clone()));
        let limits = Arc::new(ConcurrencyLimits::new(config.concurrency_config()));
        let retry = Arc::new(RetryEngine::new(clock.clone(), config.retry_config()));
        let progress = Arc::new(ProgressTracker::new(store.work_items.clone(), hub.clone(), clock.clone()));
        let hooks = Arc::new(HookRegistry::new());

        Arc::new(Self {
            store,
            clock,
            registry,
            hub,
            pool,
            queue,
            assignment,
            limits,
            retry,
            progress,
            hooks,
            executor,
            config: Mutex::new(config),
            cycle_count: Mutex::new(0),
            last_cycle_at_ms: Mutex::new(None),
            cancellation: CancellationToken::new(),
            ticker_handle: Mutex::new(None),
        })
    }

    /// Launches the cooperative ticker. Idempotent: a second call while
    /// already running is a no-op.
    pub fn start(self: &Arc<Self>) {
        let mut handle_slot = self.ticker_handle.lock();
        if handle_slot.is_some() {
            return;
        }
        let this = self.clone();
        let cancel = self.cancellation.clone();
        let interval_ms = this.config.lock().cycle_interval_ms.max(1);
        *handle_slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_millis(interval_ms));
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => { this.force_cycle().await; }
                }
            }
        }));
    }

    /// Halts the ticker and cancels every in-flight execution's token.
    pub async fn stop(&self) {
        self.cancellation.cancel();
        if let Some(handle) = self.ticker_handle.lock().take() {
            let _ = handle.await;
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn update_config(&self, partial: PartialOrchestratorConfig) {
        let mut config = self.config.lock();
        *config = config.merge(partial);
        self.pool.set_max_workers(config.max_global_workers);
        self.limits.update_config(config.concurrency_config());
        self.retry.update_config(config.retry_config());
    }

    pub async fn get_status(&self) -> OrchestratorStatus {
        let cycle_count = *self.cycle_count.lock();
        let queue_length = self.queue.get_queue_length();
        let pending_retries = self.retry.pending_count();
        let last_cycle_at_ms = *self.last_cycle_at_ms.lock();
        let worker_counts = self.pool.get_pool().await;
        OrchestratorStatus { cycle_count, queue_length, pending_retries, worker_counts, last_cycle_at_ms }
    }

    /// Runs one cycle synchronously, per §4.11's four ordered steps.
    pub async fn force_cycle(&self) {
        for ctx in self.retry.get_ready_retries() {
            self.reinstate_due_retry(ctx.work_item_id).await;
            self.queue.refresh_item(ctx.work_item_id).await;
            self.queue.set_retry_count(ctx.work_item_id, ctx.attempt);
        }
        self.queue.refresh_queue().await;

        let mut batch = Vec::new();
        while let Some(queued) = self.queue.get_next() {
            batch.push(queued);
        }

        let mut handles = Vec::new();
        for queued in batch {
            if let Some(handle) = self.process_item(queued).await {
                handles.push(handle);
            }
        }
        for handle in handles {
            let _ = handle.await;
        }

        *self.cycle_count.lock() += 1;
        *self.last_cycle_at_ms.lock() = Some(self.clock.epoch_ms());
    }

    /// Steps 3a-3e: admission, assignment (with optional auto-spawn), the
    /// pre-execution hook gate, and the assign/registerStart bookkeeping.
    /// On success, spawns the executor invocation and returns its handle;
    /// on any rejection the item is requeued and `None` is returned.
    async fn process_item(&self, queued: crate::queue::QueuedItem) -> Option<JoinHandle<()>> {
        let item_id = queued.id;
        let Some(item) = self.store.work_items.find_by_id(item_id).await else {
            return None;
        };
        let Some(role) = role_for_status(item.status) else {
            return None;
        };

        let admission = self.limits.can_start_execution(&item);
        if !admission.allowed {
            self.queue.requeue(queued, admission.reason.as_deref().unwrap_or("concurrency limit reached"));
            return None;
        }

        let worker_id = match self.assignment.find_best_worker(&item, role).await {
            Some(id) => id,
            None => match self.try_auto_spawn(&item, role).await {
                Some(id) => id,
                None => {
                    self.queue.requeue(queued, "no available worker");
                    return None;
                }
            },
        };

        let Some(worker) = self.pool.get_worker(worker_id).await else {
            self.queue.requeue(queued, "worker disappeared before assignment");
            return None;
        };

        if !self.hooks.run_pre_execution(&item, &worker) {
            self.queue.requeue(queued, "vetoed by pre-execution hook");
            return None;
        }

        if self.pool.assign_work(worker_id, item_id, role).await.is_err() {
            self.queue.requeue(queued, "assign_work rejected");
            return None;
        }

        let execution = Execution::new(worker_id, item_id, format!("workspace-{item_id}"), worker.template_id, self.clock.epoch_ms());
        let _ = self.store.executions.create(execution.clone()).await;
        if let Err(err) = self.progress.mark_started(item_id, worker_id, execution.id).await {
            tracing::warn!(work_item_id = %item_id, error = %err, "progress.mark_started failed after assignment");
        }
        if let Err(err) = self.limits.register_start(&item, worker_id) {
            tracing::warn!(work_item_id = %item_id, error = %err, "register_start failed after assignment");
        }

        let cancel_token = self.cancellation.child_token();
        Some(self.spawn_execution(item, worker, execution, cancel_token))
    }

    /// A retryable failure demotes its item to `backlog` (see
    /// [`run_execution`]) rather than back to `ready`, so `refresh_queue`
    /// never picks it up early. Once its backoff timer fires, the item is
    /// due: promote it `backlog -> ready` here, right before the queue
    /// re-admits it, so the delay is actually honored.
    async fn reinstate_due_retry(&self, item_id: fm_core::WorkItemId) {
        if let Some(mut item) = self.store.work_items.find_by_id(item_id).await {
            if item.status == WorkItemStatus::Backlog && item.transition_to(WorkItemStatus::Ready, self.clock.epoch_ms()).is_ok() {
                let _ = self.store.work_items.update(item).await;
            }
        }
    }

    async fn try_auto_spawn(&self, item: &WorkItem, role: Role) -> Option<WorkerId> {
        let auto_spawn_workers = self.config.lock().auto_spawn_workers;
        if !auto_spawn_workers || !self.pool.can_spawn_more().await {
            return None;
        }
        let template_id = self.assignment.pick_template_for_auto_spawn(item, role).await?;
        self.pool.spawn(template_id, format!("auto-{}", item.id)).await.ok().map(|w| w.id)
    }

    fn spawn_execution(&self, item: WorkItem, worker: Worker, execution: Execution, cancel_token: CancellationToken) -> JoinHandle<()> {
        let store = self.store.clone();
        let pool = self.pool.clone();
        let progress = self.progress.clone();
        let limits = self.limits.clone();
        let retry = self.retry.clone();
        let hooks = self.hooks.clone();
        let assignment = self.assignment.clone();
        let executor = self.executor.clone();
        let clock = self.clock.clone();

        tokio::spawn(async move {
            run_execution(store, pool, progress, limits, retry, hooks, assignment, executor, clock, item, worker, execution, cancel_token).await;
        })
    }
}

/// Steps 3f-3h: invokes the executor, then routes the outcome to the
/// progress tracker on success or the retry engine on failure.
#[allow(clippy::too_many_arguments)]
async fn run_execution<C: Clock>(
    store: Store,
    pool: Arc<WorkerPool<C>>,
    progress: Arc<ProgressTracker<C>>,
    limits: Arc<ConcurrencyLimits>,
    retry: Arc<RetryEngine<C>>,
    hooks: Arc<HookRegistry>,
    assignment: Arc<AssignmentScorer<C>>,
    executor: Arc<dyn Executor>,
    clock: C,
    item: WorkItem,
    worker: Worker,
    mut execution: Execution,
    cancel_token: CancellationToken,
) {
    execution.transition(ExecutionStatus::Running, clock.epoch_ms());
    let _ = store.executions.update(execution.clone()).await;

    let prompt = format!("{}\n\n{}", item.title, item.description);
    let request = ExecutionRequest::new(execution.workspace_id.clone(), prompt, execution.id.to_string()).with_cancel_token(cancel_token);
    let outcome: ExecutionOutcome = executor.execute(request).await;

    if outcome.is_success() {
        execution.tokens_used = outcome.tokens_used;
        execution.cost_usd_micros = outcome.cost_usd_micros;
        execution.tool_calls_count = outcome.tool_calls_count;
        execution.transition(ExecutionStatus::Success, clock.epoch_ms());
        let _ = store.executions.update(execution.clone()).await;

        let _ = pool
            .update_metrics(
                worker.id,
                MetricsDelta { tokens_used: outcome.tokens_used, cost_usd_micros: outcome.cost_usd_micros, tool_calls: outcome.tool_calls_count, ..Default::default() },
            )
            .await;
        if let Err(err) = progress.mark_completed(item.id, worker.id, execution.id).await {
            tracing::warn!(work_item_id = %item.id, error = %err, "progress.mark_completed failed");
        }
        let _ = pool.complete_work(worker.id).await;
        limits.register_completion(&item, worker.id);
        if let Some(repo_id) = &item.repository_id {
            assignment.record_repo_experience(worker.id, repo_id).await;
        }
        hooks.run_post_execution(&item, &worker);
        hooks.run_status_change(&item, WorkItemStatus::InProgress, WorkItemStatus::Review);
    } else {
        let message = outcome.error.clone().unwrap_or_default();
        execution.error_message = Some(message.clone());
        execution.transition(ExecutionStatus::Error, clock.epoch_ms());
        let _ = store.executions.update(execution.clone()).await;

        hooks.run_error(&item, &message);
        let category = retry.categorize_error(&message);
        retry.record_error(item.id, Some(worker.id), &message, category);
        progress.mark_failed(item.id, worker.id, message.clone()).await;

        let attempt = retry.get_error_history(item.id).total_failures.saturating_sub(1) as u32;
        if retry.should_retry(category, attempt) {
            retry.schedule_retry(item.id, &message, attempt);
            // Demote to `backlog`, not `ready`: the retry-drain step promotes
            // it back to `ready` only once its backoff timer is due, so an
            // eager `refresh_queue` never re-admits it ahead of schedule.
            demote_for_retry(&store, item.id, &clock).await;
        } else {
            retry.escalate(item.id, Some(worker.id), &message, category);
            // Escalation still leaves the item `ready` (§7) — it just carries
            // an accumulated failure record instead of a scheduled retry.
            readmit_as_ready(&store, item.id, &clock).await;
        }

        if category != ErrorCategory::Validation {
            let _ = pool.report_error(worker.id).await;
        }
        limits.register_completion(&item, worker.id);
    }
}

async fn demote_for_retry<C: Clock>(store: &Store, item_id: fm_core::WorkItemId, clock: &C) {
    if let Some(mut item) = store.work_items.find_by_id(item_id).await {
        if item.status == WorkItemStatus::InProgress && item.transition_to(WorkItemStatus::Backlog, clock.epoch_ms()).is_ok() {
            let _ = store.work_items.update(item).await;
        }
    }
}

async fn readmit_as_ready<C: Clock>(store: &Store, item_id: fm_core::WorkItemId, clock: &C) {
    let Some(mut item) = store.work_items.find_by_id(item_id).await else { return };
    if item.status == WorkItemStatus::InProgress && item.transition_to(WorkItemStatus::Backlog, clock.epoch_ms()).is_ok() {
        let _ = store.work_items.update(item.clone()).await;
    }
    if item.status == WorkItemStatus::Backlog && item.transition_to(WorkItemStatus::Ready, clock.epoch_ms()).is_ok() {
        let _ = store.work_items.update(item).await;
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
