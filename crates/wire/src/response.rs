// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One variant per successful outcome a [`crate::request::Request`] can
//! produce, plus the uniform [`ErrorBody`] carried by every failure.

use serde::{Deserialize, Serialize};

use crate::dto::{DashboardStatsDto, ExecutionDto, TemplateDto, TraceDto};
use crate::error::ErrorBody;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPageDto {
    pub items: Vec<ExecutionDto>,
    pub total: usize,
    pub has_more: bool,
}

/// `GET /executions/{id}`'s response: the execution plus its traces, since
/// the route's doc says "detail with embedded traces".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDetailDto {
    #[serde(flatten)]
    pub execution: ExecutionDto,
    pub traces: Vec<TraceDto>,
}

/// A log line for the (type-only) container-log routes — the container
/// manager and log streaming themselves are out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerLogsDto {
    pub container_id: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Templates { templates: Vec<TemplateDto> },
    Template { template: TemplateDto },
    TemplateCreated { template: TemplateDto },
    TemplateDeleted,

    Executions { page: ExecutionPageDto },
    Execution { execution: ExecutionDetailDto },
    Traces { traces: Vec<TraceDto> },

    DashboardStats { stats: DashboardStatsDto },

    ContainerLogs { logs: ContainerLogsDto },

    Error { body: ErrorBody },
}

impl Response {
    pub fn error(body: ErrorBody) -> Self {
        Response::Error { body }
    }

    /// Also returns `true` for the template/work-item update/create
    /// variants of successful requests the dispatcher builds; `false`
    /// only for [`Response::Error`].
    pub fn is_success(&self) -> bool {
        !matches!(self, Response::Error { .. })
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
