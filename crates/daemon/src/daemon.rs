// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Orchestrator` binding: owns `OrchestratorConfig` and the
//! dashboard-stats cache, and is the receiver `handle()` dispatches
//! against.

use std::sync::Arc;

use fm_adapters::Executor;
use fm_core::{Clock, SystemClock, TemplateError};
use fm_engine::{Orchestrator, OrchestratorConfig};
use fm_storage::Store;
use fm_wire::{Request, Response};

use crate::dashboard::DashboardCache;

pub struct Daemon<C: Clock + Clone + Send + Sync + 'static> {
    pub orchestrator: Arc<Orchestrator<C>>,
    pub(crate) dashboard_cache: DashboardCache,
}

impl Daemon<SystemClock> {
    /// Builds a daemon over a fresh in-memory store and the system clock,
    /// seeding the four built-in templates before returning.
    pub async fn bootstrap(executor: Arc<dyn Executor>, config: OrchestratorConfig) -> Result<Arc<Self>, TemplateError> {
        let clock = SystemClock::default();
        Self::bootstrap_with(Store::in_memory(clock.clone()), clock, executor, config).await
    }
}

impl<C: Clock + Clone + Send + Sync + 'static> Daemon<C> {
    /// Same as [`Daemon::bootstrap`] but over a caller-supplied store and
    /// clock — the seam integration tests use to inject a `FakeClock`.
    pub async fn bootstrap_with(store: Store, clock: C, executor: Arc<dyn Executor>, config: OrchestratorConfig) -> Result<Arc<Self>, TemplateError> {
        let orchestrator = Orchestrator::new(store, clock, executor, config);
        orchestrator.registry.initialize_built_ins().await?;
        Ok(Arc::new(Self { orchestrator, dashboard_cache: DashboardCache::new() }))
    }

    pub async fn handle(&self, request: Request) -> Response {
        crate::dispatch::handle(self, request).await
    }
}
