// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One variant per REST route (§6). Path and query parameters arrive as
//! plain strings — an (out-of-scope) HTTP layer is responsible for pulling
//! them out of a path/query string and constructing these; parsing a
//! string id into its typed form is `fm-daemon`'s job, not this crate's.

use fm_core::{AllowedWorkItemTypes, PermissionMode, Role, TraceEventType, WorkItemType};
use serde::{Deserialize, Serialize};

use crate::dto::McpDescriptorDto;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateBody {
    pub name: String,
    pub system_prompt: String,
    pub permission_mode: PermissionMode,
    pub max_turns: u32,
    #[serde(default)]
    pub builtin_tools: Vec<String>,
    #[serde(default)]
    pub mcp_servers: Vec<McpDescriptorDto>,
    pub allowed_work_item_types: AllowedWorkItemTypes,
    #[serde(default)]
    pub default_role: Option<Role>,
    pub created_by: String,
}

/// A sparse patch: omitted fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub permission_mode: Option<PermissionMode>,
    #[serde(default)]
    pub max_turns: Option<u32>,
    #[serde(default)]
    pub builtin_tools: Option<Vec<String>>,
    #[serde(default)]
    pub mcp_servers: Option<Vec<McpDescriptorDto>>,
    #[serde(default)]
    pub allowed_work_item_types: Option<AllowedWorkItemTypes>,
    /// Double-`Option`: absent means "leave unchanged", `Some(None)` means
    /// "clear the default role".
    #[serde(default)]
    pub default_role: Option<Option<Role>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneTemplateBody {
    pub new_name: String,
    pub creator: String,
}

/// `GET /executions`'s query parameters, still stringly-typed — the
/// dispatcher parses `status`/dates into `fm_storage::ExecutionFilter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub worker_id: Option<String>,
    #[serde(default)]
    pub work_item_id: Option<String>,
    #[serde(default)]
    pub date_from_ms: Option<u64>,
    #[serde(default)]
    pub date_to_ms: Option<u64>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// `GET /templates`
    ListTemplates,
    /// `POST /templates`
    CreateTemplate { body: CreateTemplateBody },
    /// `GET /templates/builtin`
    GetBuiltInTemplates,
    /// `GET /templates/user-defined?userId=…`
    GetUserDefinedTemplates { user_id: String },
    /// `GET /templates/by-role?role=…`
    GetTemplatesByRole { role: Role },
    /// `GET /templates/for-work-item-type?type=…`
    GetTemplatesForWorkItemType { item_type: WorkItemType },
    /// `GET /templates/{id}`
    GetTemplate { id: String },
    /// `PATCH /templates/{id}`
    UpdateTemplate { id: String, patch: UpdateTemplateBody },
    /// `DELETE /templates/{id}`
    DeleteTemplate { id: String },
    /// `POST /templates/{id}/clone`
    CloneTemplate { id: String, body: CloneTemplateBody },

    /// `GET /executions`
    ListExecutions { query: ExecutionQuery },
    /// `GET /executions/{id}`
    GetExecution { id: String },
    /// `GET /executions/{id}/traces?eventType=…`
    GetExecutionTraces { id: String, event_type: Option<TraceEventType> },

    /// `GET /dashboard/stats`
    GetDashboardStats,

    /// `GET /containers/{id}/logs`
    GetContainerLogs { id: String },
    /// `GET /containers/{id}/logs/stream`
    StreamContainerLogs { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_tags_discriminate_by_type_field() {
        let json = serde_json::to_value(Request::GetTemplate { id: "tpl-abc".into() }).unwrap();
        assert_eq!(json.get("type").unwrap(), "GetTemplate");
        assert_eq!(json.get("id").unwrap(), "tpl-abc");
    }

    #[test]
    fn update_template_body_distinguishes_absent_from_cleared_default_role() {
        let unset: UpdateTemplateBody = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(unset.default_role, None);

        let cleared: UpdateTemplateBody = serde_json::from_value(serde_json::json!({ "defaultRole": null })).unwrap();
        assert_eq!(cleared.default_role, Some(None));

        let set: UpdateTemplateBody = serde_json::from_value(serde_json::json!({ "defaultRole": "tester" })).unwrap();
        assert_eq!(set.default_role, Some(Some(Role::Tester)));
    }
}
