// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fm_core::Worker;

#[tokio::test]
async fn count_active_excludes_terminated() {
    let repo = InMemoryWorkerRepository::new();
    let idle = Worker::builder().build();
    let terminated = Worker::builder().status(WorkerStatus::Terminated).build();
    repo.create(idle).await.unwrap();
    repo.create(terminated).await.unwrap();
    assert_eq!(repo.count_active().await, 1);
}

#[tokio::test]
async fn find_by_template_filters() {
    let repo = InMemoryWorkerRepository::new();
    let tpl = TemplateId::new();
    let matching = Worker::builder().template_id(tpl).build();
    let other = Worker::builder().build();
    repo.create(matching.clone()).await.unwrap();
    repo.create(other).await.unwrap();
    let found = repo.find_by_template(tpl).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, matching.id);
}

#[tokio::test]
async fn update_missing_worker_errors() {
    let repo = InMemoryWorkerRepository::new();
    let err = repo.update(Worker::builder().build()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}
