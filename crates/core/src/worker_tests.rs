// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn assign_work_requires_idle() {
    let mut w = Worker::builder().status(WorkerStatus::Working).build();
    let err = w.assign_work(WorkItemId::new(), Role::Implementer).unwrap_err();
    assert_eq!(err, WorkerError::NotIdle(w.id));
}

#[test]
fn assign_work_sets_status_item_and_role() {
    let mut w = Worker::builder().build();
    let item = WorkItemId::new();
    w.assign_work(item, Role::Tester).unwrap();
    assert_eq!(w.status, WorkerStatus::Working);
    assert_eq!(w.current_work_item_id, Some(item));
    assert_eq!(w.current_role, Some(Role::Tester));
}

#[test]
fn complete_work_clears_assignment() {
    let mut w = Worker::builder().build();
    w.assign_work(WorkItemId::new(), Role::Tester).unwrap();
    w.complete_work(100);
    assert_eq!(w.status, WorkerStatus::Idle);
    assert!(w.current_work_item_id.is_none());
    assert_eq!(w.last_completed_at_ms, Some(100));
}

#[test]
fn pause_requires_working() {
    let mut w = Worker::builder().build();
    assert!(w.pause().is_err());
}

#[test]
fn resume_requires_paused_and_restores_assignment() {
    let mut w = Worker::builder().build();
    let item = WorkItemId::new();
    w.assign_work(item, Role::Tester).unwrap();
    w.pause().unwrap();
    assert_eq!(w.status, WorkerStatus::Paused);
    w.resume().unwrap();
    assert_eq!(w.status, WorkerStatus::Working);
}

#[test]
fn resume_rejects_error_status() {
    let mut w = Worker::builder().status(WorkerStatus::Error).build();
    assert!(w.resume().is_err());
}

#[test]
fn metrics_overflowing_context_window_errors_the_worker() {
    let mut w = Worker::builder().build();
    w.context_window_limit = 100;
    w.apply_metrics(MetricsDelta { context_window_used: 150, ..Default::default() });
    assert_eq!(w.status, WorkerStatus::Error);
}

#[test]
fn metrics_accumulate_across_calls() {
    let mut w = Worker::builder().build();
    w.apply_metrics(MetricsDelta { tokens_used: 10, tool_calls: 1, ..Default::default() });
    w.apply_metrics(MetricsDelta { tokens_used: 5, tool_calls: 2, ..Default::default() });
    assert_eq!(w.tokens_used, 15);
    assert_eq!(w.tool_calls_count, 3);
}

#[test]
fn repo_experience_increments_per_repo() {
    let mut w = Worker::builder().build();
    w.record_repo_experience("repo-a");
    w.record_repo_experience("repo-a");
    w.record_repo_experience("repo-b");
    assert_eq!(w.repo_familiarity.get("repo-a"), Some(&2));
    assert_eq!(w.repo_familiarity.get("repo-b"), Some(&1));
}
