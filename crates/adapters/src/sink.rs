// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event sink port: any push endpoint the subscription hub can fan
//! lifecycle events out to. Mirrors the external transport's
//! `send(string)` / `close()` contract — events arrive pre-serialized so the
//! hub never depends on a particular wire format.

use async_trait::async_trait;

#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Push one serialized event. A sink that has been closed must treat
    /// this as a no-op rather than an error.
    async fn send(&self, event: String);

    /// Close the sink. Idempotent.
    async fn close(&self);
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::EventSink;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Deterministic sink double that records every event it receives until
    /// closed, after which sends are silently dropped.
    #[derive(Clone)]
    pub struct FakeEventSink {
        inner: Arc<Mutex<FakeSinkState>>,
    }

    struct FakeSinkState {
        events: Vec<String>,
        closed: bool,
    }

    impl Default for FakeEventSink {
        fn default() -> Self {
            Self { inner: Arc::new(Mutex::new(FakeSinkState { events: Vec::new(), closed: false })) }
        }
    }

    impl FakeEventSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<String> {
            self.inner.lock().events.clone()
        }

        pub fn is_closed(&self) -> bool {
            self.inner.lock().closed
        }
    }

    #[async_trait]
    impl EventSink for FakeEventSink {
        async fn send(&self, event: String) {
            let mut state = self.inner.lock();
            if !state.closed {
                state.events.push(event);
            }
        }

        async fn close(&self) {
            self.inner.lock().closed = true;
        }
    }

    /// A sink that always behaves as already closed, for exercising hub
    /// isolation: a broadcast must still reach every other live sink.
    #[derive(Clone, Default)]
    pub struct DeadEventSink;

    #[async_trait]
    impl EventSink for DeadEventSink {
        async fn send(&self, _event: String) {}
        async fn close(&self) {}
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{DeadEventSink, FakeEventSink};

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
