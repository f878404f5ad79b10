// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire representations of the domain entities. Field names mirror the
//! core types' (`created_at_ms` etc.) but render as camelCase over the
//! wire, matching the REST surface's naming convention; the core types
//! themselves stay snake_case, matching ordinary Rust style.

use std::collections::{BTreeMap, HashMap};

use fm_core::{
    AllowedWorkItemTypes, Execution, McpDescriptor, McpKind, PermissionMode, Role, SuccessCriterion,
    Template, Trace, TraceEventType, Worker, WorkerStatus, WorkItem, WorkItemStatus, WorkItemType,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpDescriptorDto {
    pub name: String,
    pub kind: McpKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl From<&McpDescriptor> for McpDescriptorDto {
    fn from(m: &McpDescriptor) -> Self {
        Self { name: m.name.clone(), kind: m.kind, command: m.command.clone(), url: m.url.clone(), args: m.args.clone(), env: m.env.clone() }
    }
}

impl From<McpDescriptorDto> for McpDescriptor {
    fn from(m: McpDescriptorDto) -> Self {
        Self { name: m.name, kind: m.kind, command: m.command, url: m.url, args: m.args, env: m.env }
    }
}

/// Wire form of [`AllowedWorkItemTypes`]: the `*` wildcard serializes as the
/// literal string `"*"`, an explicit allowlist as a JSON array of type names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowedWorkItemTypesDto {
    Wildcard(WildcardMarker),
    Only(Vec<WorkItemType>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WildcardMarker(
    #[serde(deserialize_with = "deserialize_star", serialize_with = "serialize_star")] (),
);

fn serialize_star<S: serde::Serializer>(_: &(), s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str("*")
}

fn deserialize_star<'de, D: serde::Deserializer<'de>>(d: D) -> Result<(), D::Error> {
    let s = String::deserialize(d)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("expected the wildcard marker \"*\""))
    }
}

impl From<&AllowedWorkItemTypes> for AllowedWorkItemTypesDto {
    fn from(a: &AllowedWorkItemTypes) -> Self {
        match a {
            AllowedWorkItemTypes::All => AllowedWorkItemTypesDto::Wildcard(WildcardMarker(())),
            AllowedWorkItemTypes::Only(types) => AllowedWorkItemTypesDto::Only(types.clone()),
        }
    }
}

impl From<AllowedWorkItemTypesDto> for AllowedWorkItemTypes {
    fn from(a: AllowedWorkItemTypesDto) -> Self {
        match a {
            AllowedWorkItemTypesDto::Wildcard(_) => AllowedWorkItemTypes::All,
            AllowedWorkItemTypesDto::Only(types) => AllowedWorkItemTypes::Only(types),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDto {
    pub id: String,
    pub name: String,
    pub system_prompt: String,
    pub permission_mode: PermissionMode,
    pub max_turns: u32,
    pub builtin_tools: Vec<String>,
    pub mcp_servers: Vec<McpDescriptorDto>,
    pub allowed_work_item_types: AllowedWorkItemTypesDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_role: Option<Role>,
    pub created_by: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl From<&Template> for TemplateDto {
    fn from(t: &Template) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.clone(),
            system_prompt: t.system_prompt.clone(),
            permission_mode: t.permission_mode,
            max_turns: t.max_turns,
            builtin_tools: t.builtin_tools.iter().cloned().collect(),
            mcp_servers: t.mcp_servers.iter().map(McpDescriptorDto::from).collect(),
            allowed_work_item_types: AllowedWorkItemTypesDto::from(&t.allowed_work_item_types),
            default_role: t.default_role,
            created_by: t.created_by.clone(),
            created_at_ms: t.created_at_ms,
            updated_at_ms: t.updated_at_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessCriterionDto {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at_ms: Option<u64>,
}

impl From<&SuccessCriterion> for SuccessCriterionDto {
    fn from(c: &SuccessCriterion) -> Self {
        Self {
            id: c.id.to_string(),
            text: c.text.clone(),
            completed: c.completed,
            verified_by: c.verified_by.map(|w| w.to_string()),
            verified_at_ms: c.verified_at_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemDto {
    pub id: String,
    pub title: String,
    pub item_type: WorkItemType,
    pub status: WorkItemStatus,
    pub description: String,
    pub success_criteria: Vec<SuccessCriterionDto>,
    pub linked_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub child_ids: Vec<String>,
    pub blocked_by: Vec<String>,
    pub assigned_agents: HashMap<Role, String>,
    pub requires_approval: HashMap<String, bool>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
}

impl From<&WorkItem> for WorkItemDto {
    fn from(w: &WorkItem) -> Self {
        Self {
            id: w.id.to_string(),
            title: w.title.clone(),
            item_type: w.item_type.clone(),
            status: w.status,
            description: w.description.clone(),
            success_criteria: w.success_criteria.iter().map(SuccessCriterionDto::from).collect(),
            linked_files: w.linked_files.clone(),
            repository_id: w.repository_id.clone(),
            created_by: w.created_by.clone(),
            external_issue: w.external_issue.clone(),
            parent_id: w.parent_id.map(|p| p.to_string()),
            child_ids: w.child_ids.iter().map(|c| c.to_string()).collect(),
            blocked_by: w.blocked_by.iter().map(|b| b.to_string()).collect(),
            assigned_agents: w.assigned_agents.iter().map(|(r, w)| (*r, w.to_string())).collect(),
            requires_approval: w.requires_approval.clone(),
            created_at_ms: w.created_at_ms,
            updated_at_ms: w.updated_at_ms,
            started_at_ms: w.started_at_ms,
            completed_at_ms: w.completed_at_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDto {
    pub id: String,
    pub template_id: String,
    pub session_id: String,
    pub status: WorkerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_work_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_role: Option<Role>,
    pub context_window_used: u64,
    pub context_window_limit: u64,
    pub tokens_used: u64,
    pub cost_usd_micros: u64,
    pub tool_calls_count: u32,
    pub error_count: u32,
    pub spawned_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed_at_ms: Option<u64>,
    pub repo_familiarity: HashMap<String, u32>,
}

impl From<&Worker> for WorkerDto {
    fn from(w: &Worker) -> Self {
        Self {
            id: w.id.to_string(),
            template_id: w.template_id.to_string(),
            session_id: w.session_id.clone(),
            status: w.status,
            current_work_item_id: w.current_work_item_id.map(|i| i.to_string()),
            current_role: w.current_role,
            context_window_used: w.context_window_used,
            context_window_limit: w.context_window_limit,
            tokens_used: w.tokens_used,
            cost_usd_micros: w.cost_usd_micros,
            tool_calls_count: w.tool_calls_count,
            error_count: w.error_count,
            spawned_at_ms: w.spawned_at_ms,
            last_completed_at_ms: w.last_completed_at_ms,
            repo_familiarity: w.repo_familiarity.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDto {
    pub id: String,
    pub worker_id: String,
    pub work_item_id: String,
    pub workspace_id: String,
    pub template_id: String,
    pub status: fm_core::ExecutionStatus,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub tokens_used: u64,
    pub cost_usd_micros: u64,
    pub tool_calls_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl From<&Execution> for ExecutionDto {
    fn from(e: &Execution) -> Self {
        Self {
            id: e.id.to_string(),
            worker_id: e.worker_id.to_string(),
            work_item_id: e.work_item_id.to_string(),
            workspace_id: e.workspace_id.clone(),
            template_id: e.template_id.to_string(),
            status: e.status,
            created_at_ms: e.created_at_ms,
            started_at_ms: e.started_at_ms,
            completed_at_ms: e.completed_at_ms,
            duration_ms: e.duration_ms,
            tokens_used: e.tokens_used,
            cost_usd_micros: e.cost_usd_micros,
            tool_calls_count: e.tool_calls_count,
            error_message: e.error_message.clone(),
            output: e.output.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceDto {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_item_id: Option<String>,
    pub event_type: TraceEventType,
    pub data: serde_json::Value,
    pub timestamp_ms: u64,
}

impl From<&Trace> for TraceDto {
    fn from(t: &Trace) -> Self {
        Self {
            id: t.id.to_string(),
            worker_id: t.worker_id.map(|w| w.to_string()),
            work_item_id: t.work_item_id.map(|w| w.to_string()),
            event_type: t.event_type,
            data: t.data.clone(),
            timestamp_ms: t.timestamp_ms,
        }
    }
}

/// `GET /dashboard/stats`'s worker-state breakdown, grounded on
/// `fm_engine::PoolSummary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerCountsDto {
    pub idle: usize,
    pub working: usize,
    pub paused: usize,
    pub error: usize,
    pub terminated: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemCountsDto {
    pub backlog: usize,
    pub ready: usize,
    pub in_progress: usize,
    pub review: usize,
    pub done: usize,
}

/// The repository-sync breakdown the original dashboard surface reports.
/// The repository manager that would populate this is out of scope, so
/// `fm-daemon` always returns it zeroed; the shape is kept so the route's
/// response stays forward-compatible with a future repository-sync crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStatsDto {
    pub pending: usize,
    pub syncing: usize,
    pub synced: usize,
    pub error: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsDto {
    pub repositories: RepositoryStatsDto,
    pub agents: WorkerCountsDto,
    pub work_items: WorkItemCountsDto,
    pub recent_completions: Vec<WorkItemDto>,
    pub recent_executions: Vec<ExecutionDto>,
}
