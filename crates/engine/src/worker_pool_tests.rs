use super::*;
use fm_core::{FakeClock, Role, TemplateId, WorkItemId, WorkerError};
use fm_storage::InMemoryWorkerRepository;

fn pool(max_workers: u32) -> WorkerPool<FakeClock> {
    WorkerPool::new(Arc::new(InMemoryWorkerRepository::new()), FakeClock::new(), max_workers)
}

#[tokio::test]
async fn spawn_respects_max_workers_cap() {
    let pool = pool(1);
    pool.spawn(TemplateId::new(), "s1").await.unwrap();
    let err = pool.spawn(TemplateId::new(), "s2").await.unwrap_err();
    assert!(matches!(err, WorkerError::PoolExhausted(1)));
}

#[tokio::test]
async fn terminated_workers_free_pool_capacity() {
    let pool = pool(1);
    let w = pool.spawn(TemplateId::new(), "s1").await.unwrap();
    pool.terminate(w.id).await.unwrap();
    assert!(pool.can_spawn_more().await);
    pool.spawn(TemplateId::new(), "s2").await.unwrap();
}

#[tokio::test]
async fn assign_work_rejects_non_idle_worker() {
    let pool = pool(5);
    let w = pool.spawn(TemplateId::new(), "s1").await.unwrap();
    pool.assign_work(w.id, WorkItemId::new(), Role::Implementer).await.unwrap();

    let err = pool.assign_work(w.id, WorkItemId::new(), Role::Implementer).await.unwrap_err();
    assert!(matches!(err, WorkerError::NotIdle(_)));
}

#[tokio::test]
async fn complete_work_returns_worker_to_idle() {
    let pool = pool(5);
    let w = pool.spawn(TemplateId::new(), "s1").await.unwrap();
    pool.assign_work(w.id, WorkItemId::new(), Role::Implementer).await.unwrap();
    pool.complete_work(w.id).await.unwrap();

    let worker = pool.get_worker(w.id).await.unwrap();
    assert_eq!(worker.status, WorkerStatus::Idle);
    assert!(worker.current_work_item_id.is_none());
}

#[tokio::test]
async fn pause_rejects_non_working_and_resume_rejects_non_paused() {
    let pool = pool(5);
    let w = pool.spawn(TemplateId::new(), "s1").await.unwrap();

    assert!(matches!(pool.pause(w.id).await.unwrap_err(), WorkerError::NotWorking(_)));

    pool.assign_work(w.id, WorkItemId::new(), Role::Implementer).await.unwrap();
    pool.pause(w.id).await.unwrap();
    assert_eq!(pool.get_worker(w.id).await.unwrap().status, WorkerStatus::Paused);

    assert!(matches!(pool.resume(w.id).await.is_ok(), true));
    assert_eq!(pool.get_worker(w.id).await.unwrap().status, WorkerStatus::Working);
}

#[tokio::test]
async fn update_metrics_moves_to_error_on_context_exhaustion() {
    let pool = pool(5);
    let w = pool.spawn(TemplateId::new(), "s1").await.unwrap();
    pool.update_metrics(w.id, MetricsDelta { context_window_used: 250_000, ..Default::default() }).await.unwrap();

    let worker = pool.get_worker(w.id).await.unwrap();
    assert_eq!(worker.status, WorkerStatus::Error);
}

#[tokio::test]
async fn report_error_increments_error_count() {
    let pool = pool(5);
    let w = pool.spawn(TemplateId::new(), "s1").await.unwrap();
    pool.report_error(w.id).await.unwrap();
    pool.report_error(w.id).await.unwrap();

    let worker = pool.get_worker(w.id).await.unwrap();
    assert_eq!(worker.status, WorkerStatus::Error);
    assert_eq!(worker.error_count, 2);
}

#[tokio::test]
async fn get_pool_summarizes_by_status() {
    let pool = pool(5);
    let idle = pool.spawn(TemplateId::new(), "s1").await.unwrap();
    let working = pool.spawn(TemplateId::new(), "s2").await.unwrap();
    pool.assign_work(working.id, WorkItemId::new(), Role::Implementer).await.unwrap();
    let _ = idle;

    let summary = pool.get_pool().await;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.idle, 1);
    assert_eq!(summary.working, 1);
}
