// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fm-adapters: narrow ports to the orchestrator's external collaborators —
//! the embedded agent executor and the event-sink transport — plus
//! deterministic test doubles for both. Real implementations (a container-
//! backed executor, a websocket sink) live outside this crate's scope.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod executor;
mod sink;

pub use executor::{ExecutionOutcome, ExecutionRequest, Executor};
pub use sink::EventSink;

#[cfg(any(test, feature = "test-support"))]
pub use executor::FakeExecutor;
#[cfg(any(test, feature = "test-support"))]
pub use sink::{DeadEventSink, FakeEventSink};
