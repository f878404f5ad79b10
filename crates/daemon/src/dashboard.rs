// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /dashboard/stats`'s 5-second TTL in-process cache.

use fm_core::Clock;
use fm_storage::{OrderBy, Store};
use fm_wire::{DashboardStatsDto, ExecutionDto, RepositoryStatsDto, WorkItemCountsDto, WorkItemDto, WorkerCountsDto};
use parking_lot::Mutex;

const TTL_MS: u64 = 5_000;
const RECENT_LIMIT: usize = 5;

pub struct DashboardCache {
    entry: Mutex<Option<(u64, DashboardStatsDto)>>,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self { entry: Mutex::new(None) }
    }

    /// Returns the cached stats if still within the TTL, otherwise
    /// recomputes from `store` and `pool` and refreshes the cache.
    pub async fn get_or_compute<C: Clock>(&self, store: &Store, pool: &fm_engine::WorkerPool<C>, clock: &C) -> DashboardStatsDto {
        let now = clock.epoch_ms();
        if let Some((stamped_at, stats)) = self.entry.lock().clone() {
            if now.saturating_sub(stamped_at) < TTL_MS {
                return stats;
            }
        }
        let stats = compute(store, pool).await;
        *self.entry.lock() = Some((now, stats.clone()));
        stats
    }
}

impl Default for DashboardCache {
    fn default() -> Self {
        Self::new()
    }
}

async fn compute<C: Clock>(store: &Store, pool: &fm_engine::WorkerPool<C>) -> DashboardStatsDto {
    use fm_core::WorkItemStatus::*;

    let pool_summary = pool.get_pool().await;
    let agents = WorkerCountsDto {
        idle: pool_summary.idle,
        working: pool_summary.working,
        paused: pool_summary.paused,
        error: pool_summary.error,
        terminated: pool_summary.terminated,
    };

    let work_items = WorkItemCountsDto {
        backlog: store.work_items.find_by_status(Backlog, OrderBy::CreatedAtAsc).await.len(),
        ready: store.work_items.find_by_status(Ready, OrderBy::CreatedAtAsc).await.len(),
        in_progress: store.work_items.find_by_status(InProgress, OrderBy::CreatedAtAsc).await.len(),
        review: store.work_items.find_by_status(Review, OrderBy::CreatedAtAsc).await.len(),
        done: store.work_items.find_by_status(Done, OrderBy::CreatedAtAsc).await.len(),
    };

    let mut recent_completions: Vec<_> = store.work_items.find_by_status(Done, OrderBy::CreatedAtDesc).await;
    recent_completions.sort_by_key(|i| std::cmp::Reverse(i.completed_at_ms.unwrap_or(0)));
    recent_completions.truncate(RECENT_LIMIT);

    let execution_page = store
        .executions
        .find(fm_storage::ExecutionFilter { limit: Some(RECENT_LIMIT), ..Default::default() })
        .await;

    DashboardStatsDto {
        // The repository manager that would populate this is out of scope.
        repositories: RepositoryStatsDto::default(),
        agents,
        work_items,
        recent_completions: recent_completions.iter().map(WorkItemDto::from).collect(),
        recent_executions: execution_page.items.iter().map(ExecutionDto::from).collect(),
    }
}
