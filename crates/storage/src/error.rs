// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised by the persistence ports.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("a {kind} named '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },
    #[error("{kind} {id} is still referenced by {referrer_kind} {referrer_id}")]
    ReferencedBy { kind: &'static str, id: String, referrer_kind: &'static str, referrer_id: String },
    #[error("{kind} {id} cannot reference itself")]
    SelfReference { kind: &'static str, id: String },
}
