// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn rejects_short_prompt() {
    let t = Template::builder().system_prompt("too short").build();
    assert!(matches!(t.validate(), Err(TemplateError::Validation(_))));
}

#[test]
fn rejects_max_turns_out_of_range() {
    let t = Template::builder().max_turns(0).build();
    assert!(t.validate().is_err());
    let t = Template::builder().max_turns(1001).build();
    assert!(t.validate().is_err());
}

#[test]
fn rejects_empty_allowed_types() {
    let t = Template::builder().allowed_work_item_types(AllowedWorkItemTypes::Only(Vec::new())).build();
    assert!(t.validate().is_err());
}

#[test]
fn stdio_mcp_requires_command() {
    let t = Template::builder()
        .mcp_servers(vec![McpDescriptor {
            name: "fs".into(),
            kind: McpKind::Stdio,
            command: None,
            url: None,
            args: vec![],
            env: Default::default(),
        }])
        .build();
    assert!(t.validate().is_err());
}

#[test]
fn sse_mcp_requires_url() {
    let t = Template::builder()
        .mcp_servers(vec![McpDescriptor {
            name: "remote".into(),
            kind: McpKind::Sse,
            command: None,
            url: None,
            args: vec![],
            env: Default::default(),
        }])
        .build();
    assert!(t.validate().is_err());
}

#[test]
fn duplicate_mcp_names_rejected() {
    let mcp = McpDescriptor {
        name: "fs".into(),
        kind: McpKind::Stdio,
        command: Some("fs-server".into()),
        url: None,
        args: vec![],
        env: Default::default(),
    };
    let t = Template::builder().mcp_servers(vec![mcp.clone(), mcp]).build();
    assert!(t.validate().is_err());
}

#[test]
fn allows_wildcard_type() {
    let t = Template::builder().allowed_work_item_types(AllowedWorkItemTypes::All).build();
    assert!(t.allows_work_item_type(&WorkItemType::Bug));
    assert!(t.allows_work_item_type(&WorkItemType::Feature));
}

#[test]
fn allows_exact_type_only() {
    let t = Template::builder()
        .allowed_work_item_types(AllowedWorkItemTypes::Only(vec![WorkItemType::Bug]))
        .build();
    assert!(t.allows_work_item_type(&WorkItemType::Bug));
    assert!(!t.allows_work_item_type(&WorkItemType::Feature));
}

#[test]
fn is_builtin_checks_creator() {
    let t = Template::builder().created_by(SYSTEM_CREATOR).build();
    assert!(t.is_builtin());
    let t = Template::builder().created_by("alice").build();
    assert!(!t.is_builtin());
}

#[test]
fn role_for_status_maps_the_workflow() {
    use crate::work_item::WorkItemStatus::*;
    assert_eq!(Role::for_work_item_status(Backlog), Some(Role::Refiner));
    assert_eq!(Role::for_work_item_status(Ready), Some(Role::Implementer));
    assert_eq!(Role::for_work_item_status(InProgress), Some(Role::Tester));
    assert_eq!(Role::for_work_item_status(Review), Some(Role::Reviewer));
    assert_eq!(Role::for_work_item_status(Done), None);
}
