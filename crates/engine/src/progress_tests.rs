use super::*;
use fm_adapters::FakeEventSink;
use fm_core::{ExecutionId, FakeClock, WorkItemBuilder, WorkItemStatus, WorkerId};
use fm_storage::InMemoryWorkItemRepository;
use std::sync::atomic::{AtomicUsize, Ordering};

fn tracker() -> (ProgressTracker<FakeClock>, Arc<InMemoryWorkItemRepository<FakeClock>>) {
    let items = Arc::new(InMemoryWorkItemRepository::new(FakeClock::new()));
    let hub = Arc::new(SubscriptionHub::new());
    (ProgressTracker::new(items.clone(), hub, FakeClock::new()), items)
}

#[tokio::test]
async fn mark_started_transitions_item_to_in_progress() {
    let (tracker, items) = tracker();
    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).build();
    items.create(item.clone()).await.unwrap();

    tracker.mark_started(item.id, WorkerId::new(), ExecutionId::new()).await.unwrap();

    let updated = items.find_by_id(item.id).await.unwrap();
    assert_eq!(updated.status, WorkItemStatus::InProgress);
    assert!(updated.started_at_ms.is_some());
}

#[tokio::test]
async fn mark_completed_transitions_to_review_and_purges_history() {
    let (tracker, items) = tracker();
    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).build();
    items.create(item.clone()).await.unwrap();
    let worker = WorkerId::new();

    tracker.mark_started(item.id, worker, ExecutionId::new()).await.unwrap();
    tracker.mark_completed(item.id, worker, ExecutionId::new()).await.unwrap();

    let updated = items.find_by_id(item.id).await.unwrap();
    assert_eq!(updated.status, WorkItemStatus::Review);
    assert!(tracker.get_history(item.id).is_empty());
}

#[tokio::test]
async fn update_progress_clamps_to_ninety_nine() {
    let (tracker, items) = tracker();
    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).build();
    items.create(item.clone()).await.unwrap();

    tracker.update_progress(item.id, WorkerId::new(), 150, None).await;
    let history = tracker.get_history(item.id);
    match &history[0].kind {
        ProgressEventKind::InProgress { percent } => assert_eq!(*percent, 99),
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[tokio::test]
async fn mark_blocked_and_mark_failed_do_not_change_status() {
    let (tracker, items) = tracker();
    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).build();
    items.create(item.clone()).await.unwrap();
    let worker = WorkerId::new();

    tracker.mark_blocked(item.id, worker, "waiting on dependency").await;
    tracker.mark_failed(item.id, worker, "boom").await;

    let unchanged = items.find_by_id(item.id).await.unwrap();
    assert_eq!(unchanged.status, WorkItemStatus::Ready);
}

#[tokio::test]
async fn events_are_strictly_ordered_per_item() {
    let (tracker, items) = tracker();
    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).build();
    items.create(item.clone()).await.unwrap();
    let worker = WorkerId::new();

    tracker.mark_started(item.id, worker, ExecutionId::new()).await.unwrap();
    tracker.update_progress(item.id, worker, 50, None).await;
    tracker.record_milestone(item.id, worker, "halfway").await;

    let history = tracker.get_history(item.id);
    assert!(matches!(history[0].kind, ProgressEventKind::Started));
    assert!(matches!(history[1].kind, ProgressEventKind::InProgress { .. }));
    assert!(matches!(history[2].kind, ProgressEventKind::Milestone { .. }));
}

#[tokio::test]
async fn listener_receives_every_event_until_detached() {
    let items = Arc::new(InMemoryWorkItemRepository::new(FakeClock::new()));
    let hub = Arc::new(SubscriptionHub::new());
    let tracker = ProgressTracker::new(items.clone(), hub, FakeClock::new());
    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).build();
    items.create(item.clone()).await.unwrap();
    let worker = WorkerId::new();

    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = count.clone();
    let detach = tracker.add_listener(Arc::new(move |_event| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    }));

    tracker.mark_started(item.id, worker, ExecutionId::new()).await.unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    detach();
    tracker.update_progress(item.id, worker, 10, None).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn hub_receives_broadcast_on_item_channel_and_all() {
    let items = Arc::new(InMemoryWorkItemRepository::new(FakeClock::new()));
    let hub = Arc::new(SubscriptionHub::new());
    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).build();
    items.create(item.clone()).await.unwrap();

    let sink = Arc::new(FakeEventSink::new());
    hub.register("client-1", sink.clone()).await;
    hub.subscribe("client-1", crate::hub::work_item_channel(item.id));
    hub.subscribe("client-1", CHANNEL_ALL);

    let tracker = ProgressTracker::new(items, hub, FakeClock::new());
    tracker.mark_started(item.id, WorkerId::new(), ExecutionId::new()).await.unwrap();

    assert_eq!(sink.events().len(), 2);
}
