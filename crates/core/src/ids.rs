// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes for every entity in the domain model.

crate::define_id! {
    /// Unique identifier for a worker template.
    pub struct TemplateId("tpl-");
}

crate::define_id! {
    /// Unique identifier for a work item.
    pub struct WorkItemId("itm-");
}

crate::define_id! {
    /// Unique identifier for a live worker (an instantiated template).
    pub struct WorkerId("wrk-");
}

crate::define_id! {
    /// Unique identifier for a single execution attempt.
    pub struct ExecutionId("exe-");
}

crate::define_id! {
    /// Unique identifier for an audit trace event.
    pub struct TraceId("trc-");
}

crate::define_id! {
    /// Unique identifier for a success criterion within a work item.
    pub struct CriterionId("crt-");
}
