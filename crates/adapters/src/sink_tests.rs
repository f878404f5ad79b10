// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn records_events_until_closed() {
    let sink = FakeEventSink::new();
    sink.send("one".to_string()).await;
    sink.close().await;
    sink.send("two".to_string()).await;

    assert_eq!(sink.events(), vec!["one".to_string()]);
    assert!(sink.is_closed());
}

#[tokio::test]
async fn dead_sink_accepts_sends_without_recording() {
    let sink = DeadEventSink;
    sink.send("ignored".to_string()).await;
    sink.close().await;
}
