use super::*;
use fm_adapters::FakeExecutor;
use fm_core::{FakeClock, PermissionMode, Role, Template, WorkItemBuilder, WorkItemType};
use fm_storage::ExecutionFilter;

fn setup() -> (Arc<Orchestrator<FakeClock>>, Store, Arc<FakeExecutor>, FakeClock) {
    let clock = FakeClock::new();
    let store = Store::in_memory(clock.clone());
    let executor = Arc::new(FakeExecutor::new());
    let orchestrator = Orchestrator::new(store.clone(), clock.clone(), executor.clone() as Arc<dyn fm_adapters::Executor>, OrchestratorConfig::default());
    (orchestrator, store, executor, clock)
}

fn implementer_template() -> Template {
    Template::builder().name("Implementer").permission_mode(PermissionMode::AcceptEdits).default_role(Some(Role::Implementer)).build()
}

#[tokio::test]
async fn happy_path_runs_item_through_one_cycle() {
    let (orchestrator, store, _executor, _clock) = setup();
    let template = orchestrator.registry.register(implementer_template()).await.unwrap();
    let worker = orchestrator.pool.spawn(template.id, "session-1").await.unwrap();

    let item = WorkItemBuilder::default().item_type(WorkItemType::Feature).status(WorkItemStatus::Ready).build();
    store.work_items.create(item.clone()).await.unwrap();

    orchestrator.force_cycle().await;

    let updated_item = store.work_items.find_by_id(item.id).await.unwrap();
    assert_eq!(updated_item.status, WorkItemStatus::Review);

    let updated_worker = orchestrator.pool.get_worker(worker.id).await.unwrap();
    assert_eq!(updated_worker.status, fm_core::WorkerStatus::Idle);

    let page = store.executions.find(ExecutionFilter { work_item_id: Some(item.id), ..Default::default() }).await;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].status, ExecutionStatus::Success);
    assert_eq!(page.items[0].tokens_used, 1000);

    let history = orchestrator.progress.get_history(item.id);
    assert!(history.is_empty(), "history is purged once the item reaches review");
}

#[tokio::test]
async fn blocked_item_is_excluded_from_the_queue() {
    let (orchestrator, store, ..) = setup();
    let blocker = WorkItemBuilder::default().title("blocker").status(WorkItemStatus::Ready).created_at_ms(1).build();
    store.work_items.create(blocker.clone()).await.unwrap();

    let dependent = WorkItemBuilder::default()
        .title("dependent")
        .status(WorkItemStatus::Ready)
        .created_at_ms(2)
        .blocked_by(vec![blocker.id])
        .build();
    store.work_items.create(dependent.clone()).await.unwrap();

    orchestrator.queue.refresh_queue().await;
    assert_eq!(orchestrator.queue.get_queue_length(), 1);
    assert_eq!(orchestrator.queue.get_next().unwrap().id, blocker.id);
}

#[tokio::test]
async fn bug_outranks_feature_in_queue_priority() {
    let (orchestrator, store, ..) = setup();
    let feature = WorkItemBuilder::default().item_type(WorkItemType::Feature).status(WorkItemStatus::Ready).created_at_ms(1).build();
    store.work_items.create(feature.clone()).await.unwrap();
    let bug = WorkItemBuilder::default().item_type(WorkItemType::Bug).status(WorkItemStatus::Ready).created_at_ms(2).build();
    store.work_items.create(bug.clone()).await.unwrap();

    orchestrator.queue.refresh_queue().await;
    let next = orchestrator.queue.get_next().unwrap();
    assert_eq!(next.id, bug.id);
    assert_eq!(next.item_type, WorkItemType::Bug);
}

#[tokio::test]
async fn retry_escalates_exactly_once_after_max_attempts_exhausted() {
    let (orchestrator, ..) = setup();
    let item_id = fm_core::WorkItemId::new();
    let message = "Connection timeout";

    let mut previous_delay = 0u64;
    for _ in 0..3 {
        let category = orchestrator.retry.categorize_error(message);
        orchestrator.retry.record_error(item_id, None, message, category);
        let attempt = orchestrator.retry.get_error_history(item_id).total_failures.saturating_sub(1) as u32;
        let ctx = orchestrator.retry.schedule_retry(item_id, message, attempt).expect("first three attempts retry");
        assert!(ctx.scheduled_at_ms >= previous_delay);
        previous_delay = ctx.scheduled_at_ms;
    }

    // Fourth failure: attempt index 3 >= maxRetryAttempts(3), exhausted.
    let category = orchestrator.retry.categorize_error(message);
    orchestrator.retry.record_error(item_id, None, message, category);
    let attempt = orchestrator.retry.get_error_history(item_id).total_failures.saturating_sub(1) as u32;
    assert!(!orchestrator.retry.should_retry(category, attempt));
    assert!(!orchestrator.retry.is_escalated(item_id));
    orchestrator.retry.escalate(item_id, None, message, category);

    assert!(orchestrator.retry.is_escalated(item_id));
    assert_eq!(orchestrator.retry.get_error_history(item_id).total_failures, 4);
}

#[tokio::test]
async fn transient_failure_reinstates_the_item_once_its_retry_is_due() {
    let (orchestrator, store, executor, clock) = setup();
    let template = orchestrator.registry.register(implementer_template()).await.unwrap();
    let failing_worker = orchestrator.pool.spawn(template.id, "session-1").await.unwrap();
    orchestrator.pool.spawn(template.id, "session-2").await.unwrap();

    let item = WorkItemBuilder::default().item_type(WorkItemType::Feature).status(WorkItemStatus::Ready).build();
    store.work_items.create(item.clone()).await.unwrap();

    executor.push_error("Connection timeout");
    orchestrator.force_cycle().await;

    // The failed attempt leaves the item demoted to `backlog`, not stuck
    // `in-progress`, and not eagerly re-admitted to the queue either. The
    // worker that failed it moves to `error` (a transient failure is the
    // worker's fault) and cannot pick the retry back up itself.
    let after_failure = store.work_items.find_by_id(item.id).await.unwrap();
    assert_eq!(after_failure.status, WorkItemStatus::Backlog);
    assert_eq!(orchestrator.queue.get_queue_length(), 0);
    assert_eq!(orchestrator.retry.pending_count(), 1);
    assert_eq!(orchestrator.pool.get_worker(failing_worker.id).await.unwrap().status, fm_core::WorkerStatus::Error);

    // Before the backoff timer is due, a cycle must not resurrect it.
    orchestrator.force_cycle().await;
    assert_eq!(orchestrator.retry.pending_count(), 1);
    assert_eq!(store.work_items.find_by_id(item.id).await.unwrap().status, WorkItemStatus::Backlog);

    clock.advance(std::time::Duration::from_secs(3600));
    orchestrator.force_cycle().await;

    let after_retry = store.work_items.find_by_id(item.id).await.unwrap();
    assert_eq!(after_retry.status, WorkItemStatus::Review, "second attempt succeeds and clears the retry");
    assert_eq!(orchestrator.retry.pending_count(), 0);

    let history = orchestrator.retry.get_error_history(item.id);
    assert_eq!(history.total_failures, 1);
}

#[tokio::test]
async fn per_repository_cap_leaves_the_third_same_repo_item_queued() {
    let (orchestrator, store, ..) = setup();
    orchestrator.update_config(PartialOrchestratorConfig { max_workers_per_repo: Some(2), ..Default::default() });

    let template = orchestrator.registry.register(implementer_template()).await.unwrap();
    orchestrator.pool.spawn(template.id, "s1").await.unwrap();
    orchestrator.pool.spawn(template.id, "s2").await.unwrap();

    for i in 0..3 {
        let item = WorkItemBuilder::default()
            .item_type(WorkItemType::Feature)
            .status(WorkItemStatus::Ready)
            .created_at_ms(i)
            .repository_id(Some("repo-x".to_string()))
            .build();
        store.work_items.create(item).await.unwrap();
    }

    orchestrator.force_cycle().await;

    // Exactly one of the three same-repo items could not be admitted this
    // cycle (either the per-repo cap or the two-worker pool bites first).
    assert_eq!(orchestrator.queue.get_queue_length(), 1);
}

#[tokio::test]
async fn built_in_template_survives_an_unregister_attempt() {
    let (orchestrator, ..) = setup();
    orchestrator.registry.initialize_built_ins().await.unwrap();
    let builtins = orchestrator.registry.get_built_in().await;
    let implementer = builtins.iter().find(|t| t.name == "Implementer").unwrap().clone();

    let err = orchestrator.registry.unregister(implementer.id).await.unwrap_err();
    assert!(matches!(err, fm_core::TemplateError::SystemTemplateProtected(_)));
    assert!(orchestrator.registry.get_by_id(implementer.id).await.is_some());
}

#[tokio::test]
async fn force_cycle_is_a_no_op_on_an_empty_queue() {
    let (orchestrator, ..) = setup();
    orchestrator.force_cycle().await;
    let status = orchestrator.get_status().await;
    assert_eq!(status.cycle_count, 1);
    assert_eq!(status.queue_length, 0);
}
