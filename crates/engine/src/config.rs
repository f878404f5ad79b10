// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator-wide configuration (§4.11), propagated to the concurrency
//! and retry sub-services on `update_config`.

use crate::concurrency::ConcurrencyConfig;
use crate::retry::RetryConfig;

const DEFAULT_CYCLE_INTERVAL_MS: u64 = 2_000;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub cycle_interval_ms: u64,
    pub max_global_workers: u32,
    pub max_workers_per_repo: u32,
    pub max_workers_per_user: u32,
    pub max_retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub auto_spawn_workers: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let concurrency = ConcurrencyConfig::default();
        let retry = RetryConfig::default();
        Self {
            cycle_interval_ms: DEFAULT_CYCLE_INTERVAL_MS,
            max_global_workers: concurrency.max_global_workers,
            max_workers_per_repo: concurrency.max_workers_per_repo,
            max_workers_per_user: concurrency.max_workers_per_user,
            max_retry_attempts: retry.max_retry_attempts,
            retry_base_delay_ms: retry.base_delay_ms,
            retry_max_delay_ms: retry.max_delay_ms,
            auto_spawn_workers: true,
        }
    }
}

impl OrchestratorConfig {
    pub fn concurrency_config(&self) -> ConcurrencyConfig {
        ConcurrencyConfig {
            max_global_workers: self.max_global_workers,
            max_workers_per_repo: self.max_workers_per_repo,
            max_workers_per_user: self.max_workers_per_user,
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retry_attempts: self.max_retry_attempts,
            base_delay_ms: self.retry_base_delay_ms,
            max_delay_ms: self.retry_max_delay_ms,
        }
    }

    /// Applies a sparse override. `None` fields keep their current value.
    #[allow(clippy::too_many_arguments)]
    pub fn merge(&self, partial: PartialOrchestratorConfig) -> Self {
        Self {
            cycle_interval_ms: partial.cycle_interval_ms.unwrap_or(self.cycle_interval_ms),
            max_global_workers: partial.max_global_workers.unwrap_or(self.max_global_workers),
            max_workers_per_repo: partial.max_workers_per_repo.unwrap_or(self.max_workers_per_repo),
            max_workers_per_user: partial.max_workers_per_user.unwrap_or(self.max_workers_per_user),
            max_retry_attempts: partial.max_retry_attempts.unwrap_or(self.max_retry_attempts),
            retry_base_delay_ms: partial.retry_base_delay_ms.unwrap_or(self.retry_base_delay_ms),
            retry_max_delay_ms: partial.retry_max_delay_ms.unwrap_or(self.retry_max_delay_ms),
            auto_spawn_workers: partial.auto_spawn_workers.unwrap_or(self.auto_spawn_workers),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PartialOrchestratorConfig {
    pub cycle_interval_ms: Option<u64>,
    pub max_global_workers: Option<u32>,
    pub max_workers_per_repo: Option<u32>,
    pub max_workers_per_user: Option<u32>,
    pub max_retry_attempts: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
    pub retry_max_delay_ms: Option<u64>,
    pub auto_spawn_workers: Option<bool>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
