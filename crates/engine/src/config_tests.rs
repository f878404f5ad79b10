use super::*;

#[test]
fn merge_overrides_only_supplied_fields() {
    let base = OrchestratorConfig::default();
    let partial = PartialOrchestratorConfig { max_global_workers: Some(42), ..Default::default() };
    let merged = base.merge(partial);

    assert_eq!(merged.max_global_workers, 42);
    assert_eq!(merged.cycle_interval_ms, base.cycle_interval_ms);
    assert_eq!(merged.max_retry_attempts, base.max_retry_attempts);
}

#[test]
fn concurrency_and_retry_configs_derive_from_orchestrator_config() {
    let config = OrchestratorConfig { max_workers_per_repo: 7, retry_max_delay_ms: 99_000, ..Default::default() };
    assert_eq!(config.concurrency_config().max_workers_per_repo, 7);
    assert_eq!(config.retry_config().max_delay_ms, 99_000);
}
