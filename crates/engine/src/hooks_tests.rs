use super::*;
use fm_core::{WorkItemBuilder, WorkerBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn pre_execution_veto_when_any_hook_returns_false() {
    let registry = HookRegistry::new();
    registry.register_pre_execution("allow", Arc::new(|_item, _worker| true));
    registry.register_pre_execution("veto", Arc::new(|_item, _worker| false));

    let item = WorkItemBuilder::default().build();
    let worker = WorkerBuilder::default().build();
    assert!(!registry.run_pre_execution(&item, &worker));
}

#[test]
fn pre_execution_allows_when_every_hook_allows() {
    let registry = HookRegistry::new();
    registry.register_pre_execution("allow-1", Arc::new(|_item, _worker| true));
    registry.register_pre_execution("allow-2", Arc::new(|_item, _worker| true));

    let item = WorkItemBuilder::default().build();
    let worker = WorkerBuilder::default().build();
    assert!(registry.run_pre_execution(&item, &worker));
}

#[test]
fn every_hook_runs_even_when_an_earlier_one_vetoes() {
    let registry = HookRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_a = calls.clone();
    let calls_b = calls.clone();
    registry.register_pre_execution("veto", Arc::new(move |_item, _worker| {
        calls_a.fetch_add(1, Ordering::SeqCst);
        false
    }));
    registry.register_pre_execution("observer", Arc::new(move |_item, _worker| {
        calls_b.fetch_add(1, Ordering::SeqCst);
        true
    }));

    let item = WorkItemBuilder::default().build();
    let worker = WorkerBuilder::default().build();
    registry.run_pre_execution(&item, &worker);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn unregister_removes_hook() {
    let registry = HookRegistry::new();
    registry.register_pre_execution("veto", Arc::new(|_item, _worker| false));
    registry.unregister_pre_execution("veto");

    let item = WorkItemBuilder::default().build();
    let worker = WorkerBuilder::default().build();
    assert!(registry.run_pre_execution(&item, &worker));
}

#[test]
fn status_change_hook_receives_from_and_to() {
    let registry = HookRegistry::new();
    let seen = Arc::new(Mutex::new(None));
    let seen_clone = seen.clone();
    registry.register_status_change(
        "observer",
        Arc::new(move |_item, from, to| {
            *seen_clone.lock() = Some((from, to));
        }),
    );

    let item = WorkItemBuilder::default().build();
    registry.run_status_change(&item, fm_core::WorkItemStatus::Ready, fm_core::WorkItemStatus::InProgress);
    assert_eq!(*seen.lock(), Some((fm_core::WorkItemStatus::Ready, fm_core::WorkItemStatus::InProgress)));
}
