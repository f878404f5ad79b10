// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide `tracing` setup. A standalone listener embedding this crate
//! calls [`init`] once at startup; nothing in `fm-daemon` itself installs a
//! subscriber implicitly.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (defaulting to `info`
/// when unset) as the global default.
///
/// Returns an error if a global subscriber is already installed, so callers
/// can safely call this from tests that construct multiple daemons.
pub fn init() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt::Subscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
}
