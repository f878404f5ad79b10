// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker templates: blueprints that describe a worker's prompt, tool
//! access, and the kinds of work it is allowed to take.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::TemplateId;
use crate::work_item::WorkItemType;

/// Marks a template as owned by the system rather than a user.
pub const SYSTEM_CREATOR: &str = "system";

const MIN_PROMPT_LEN: usize = 20;
const MAX_TURNS_RANGE: std::ops::RangeInclusive<u32> = 1..=1000;

/// How much latitude a worker has to act without a human in the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionMode {
    AskUser,
    AcceptEdits,
    Bypass,
}

crate::simple_display! {
    PermissionMode {
        AskUser => "ask-user",
        AcceptEdits => "accept-edits",
        Bypass => "bypass",
    }
}

/// The function a worker plays when assigned a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Refiner,
    Implementer,
    Tester,
    Reviewer,
}

crate::simple_display! {
    Role {
        Refiner => "refiner",
        Implementer => "implementer",
        Tester => "tester",
        Reviewer => "reviewer",
    }
}

impl Role {
    /// The role a work item's current status calls for.
    pub fn for_work_item_status(status: crate::work_item::WorkItemStatus) -> Option<Role> {
        use crate::work_item::WorkItemStatus::*;
        match status {
            Backlog => Some(Role::Refiner),
            Ready => Some(Role::Implementer),
            InProgress => Some(Role::Tester),
            Review => Some(Role::Reviewer),
            Done => None,
        }
    }
}

/// Transport kind for a Model Context Protocol server a worker can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpKind {
    Stdio,
    Sse,
}

/// A single MCP server a worker's template wires up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpDescriptor {
    pub name: String,
    pub kind: McpKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: std::collections::BTreeMap<String, String>,
}

impl McpDescriptor {
    fn validate(&self) -> Result<(), TemplateError> {
        match self.kind {
            McpKind::Stdio if self.command.is_none() => {
                Err(TemplateError::Validation(format!("mcp '{}' requires a command", self.name)))
            }
            McpKind::Sse if self.url.is_none() => {
                Err(TemplateError::Validation(format!("mcp '{}' requires a url", self.name)))
            }
            _ => Ok(()),
        }
    }
}

/// Which work-item types a template may be assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowedWorkItemTypes {
    /// The `*` wildcard: any work-item type.
    All,
    /// An explicit, non-empty allowlist.
    Only(Vec<WorkItemType>),
}

impl AllowedWorkItemTypes {
    pub fn matches(&self, ty: &WorkItemType) -> bool {
        match self {
            AllowedWorkItemTypes::All => true,
            AllowedWorkItemTypes::Only(types) => types.contains(ty),
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, AllowedWorkItemTypes::Only(types) if types.is_empty())
    }
}

/// A reusable worker blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub system_prompt: String,
    pub permission_mode: PermissionMode,
    pub max_turns: u32,
    pub builtin_tools: HashSet<String>,
    pub mcp_servers: Vec<McpDescriptor>,
    pub allowed_work_item_types: AllowedWorkItemTypes,
    pub default_role: Option<Role>,
    pub created_by: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Template {
    pub fn is_builtin(&self) -> bool {
        self.created_by == SYSTEM_CREATOR
    }

    /// Whether this template may be assigned a work item of the given type.
    pub fn allows_work_item_type(&self, ty: &WorkItemType) -> bool {
        self.allowed_work_item_types.matches(ty)
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.name.trim().is_empty() {
            return Err(TemplateError::Validation("name must not be empty".into()));
        }
        if self.system_prompt.len() < MIN_PROMPT_LEN {
            return Err(TemplateError::Validation(format!(
                "system_prompt must be at least {MIN_PROMPT_LEN} characters"
            )));
        }
        if !MAX_TURNS_RANGE.contains(&self.max_turns) {
            return Err(TemplateError::Validation(format!(
                "max_turns must be within {MAX_TURNS_RANGE:?}"
            )));
        }
        if self.allowed_work_item_types.is_empty() {
            return Err(TemplateError::Validation(
                "allowed_work_item_types must not be empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for mcp in &self.mcp_servers {
            mcp.validate()?;
            if !seen.insert(&mcp.name) {
                return Err(TemplateError::Validation(format!(
                    "duplicate mcp server name '{}'",
                    mcp.name
                )));
            }
        }
        Ok(())
    }

    #[cfg(any(test, feature = "test-support"))]
    crate::setters! {
        into { name: String, system_prompt: String, created_by: String }
        set { permission_mode: PermissionMode, max_turns: u32, default_role: Option<Role> }
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct TemplateBuilder => Template {
        into {
            name: String = "test-template",
            system_prompt: String = "A template system prompt used only in tests.",
            created_by: String = "tester",
        }
        set {
            permission_mode: PermissionMode = PermissionMode::AcceptEdits,
            max_turns: u32 = 40,
            builtin_tools: HashSet<String> = HashSet::new(),
            mcp_servers: Vec<McpDescriptor> = Vec::new(),
            allowed_work_item_types: AllowedWorkItemTypes = AllowedWorkItemTypes::All,
            default_role: Option<Role> = None,
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
        }
        computed {
            id: TemplateId = TemplateId::new(),
        }
    }
}

/// Errors raised by template registration and validation.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template validation failed: {0}")]
    Validation(String),
    #[error("a template named '{0}' already exists")]
    DuplicateName(String),
    #[error("template {0} not found")]
    NotFound(TemplateId),
    #[error("system template {0} cannot be deleted")]
    SystemTemplateProtected(TemplateId),
    #[error("template {0} is still referenced by a worker")]
    ReferencedBy(TemplateId),
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
