// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST-shaped data-transfer objects and the `Request`/`Response` surface
//! for the orchestrator's external interface (§6). No socket, router, or
//! framing code lives here — just types, naming the route each one stands
//! in for in its own doc comment. `fm-daemon` is the pure `Request ->
//! Response` dispatcher that gives these types behavior.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod dto;
mod error;
mod request;
mod response;

pub use dto::{
    AllowedWorkItemTypesDto, DashboardStatsDto, ExecutionDto, McpDescriptorDto, RepositoryStatsDto,
    SuccessCriterionDto, TemplateDto, TraceDto, WorkItemCountsDto, WorkItemDto, WorkerCountsDto,
    WorkerDto,
};
pub use error::ErrorBody;
pub use request::{CloneTemplateBody, CreateTemplateBody, ExecutionQuery, Request, UpdateTemplateBody};
pub use response::{ContainerLogsDto, ExecutionDetailDto, ExecutionPageDto, Response};
