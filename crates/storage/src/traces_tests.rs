// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[tokio::test]
async fn find_for_execution_returns_only_its_own_traces() {
    let repo = InMemoryTraceRepository::new();
    let exec_a = ExecutionId::new();
    let exec_b = ExecutionId::new();
    repo.record(exec_a, Trace::new(TraceEventType::ToolCall, json!({}), 1)).await;
    repo.record(exec_b, Trace::new(TraceEventType::Error, json!({}), 2)).await;

    let traces = repo.find_for_execution(exec_a).await;
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].event_type, TraceEventType::ToolCall);
}

#[tokio::test]
async fn find_by_event_type_filters() {
    let repo = InMemoryTraceRepository::new();
    let exec = ExecutionId::new();
    repo.record(exec, Trace::new(TraceEventType::ToolCall, json!({}), 1)).await;
    repo.record(exec, Trace::new(TraceEventType::Error, json!({}), 2)).await;

    let errors = repo.find_by_event_type(exec, TraceEventType::Error).await;
    assert_eq!(errors.len(), 1);
}
