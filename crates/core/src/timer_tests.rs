// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn queue_retry_round_trips() {
    let item = WorkItemId::new();
    let id = TimerId::queue_retry(item);
    match id.kind() {
        Some(TimerKind::QueueRetry { item: parsed }) => assert_eq!(parsed, item),
        other => panic!("expected QueueRetry, got {other:?}"),
    }
}

#[test]
fn cycle_tick_round_trips() {
    let id = TimerId::cycle_tick();
    assert_eq!(id.kind(), Some(TimerKind::CycleTick));
}

#[test]
fn unrecognized_string_has_no_kind() {
    let id = TimerId(String::from("garbage"));
    assert_eq!(id.kind(), None);
}
