// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fm_core::{TemplateId, WorkItemId, WorkerId};

fn execution_at(ms: u64) -> Execution {
    Execution::new(WorkerId::new(), WorkItemId::new(), "ws", TemplateId::new(), ms)
}

#[tokio::test]
async fn find_paginates_newest_first() {
    let repo = InMemoryExecutionRepository::new();
    for ms in [10, 30, 20] {
        repo.create(execution_at(ms)).await.unwrap();
    }
    let page = repo.find(ExecutionFilter { limit: Some(2), ..Default::default() }).await;
    assert_eq!(page.total, 3);
    assert!(page.has_more);
    assert_eq!(page.items[0].created_at_ms, 30);
    assert_eq!(page.items[1].created_at_ms, 20);
}

#[tokio::test]
async fn find_filters_by_worker() {
    let repo = InMemoryExecutionRepository::new();
    let worker = WorkerId::new();
    let mine = Execution::new(worker, WorkItemId::new(), "ws", TemplateId::new(), 0);
    let other = execution_at(0);
    repo.create(mine.clone()).await.unwrap();
    repo.create(other).await.unwrap();

    let page = repo.find(ExecutionFilter { worker_id: Some(worker), ..Default::default() }).await;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, mine.id);
}
