// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pure `Request -> Response` dispatcher (§6). Every branch is a thin
//! translation between `fm-wire`'s DTOs and the typed calls `fm-engine`'s
//! `TemplateRegistry` and `fm-storage`'s repositories already expose —
//! this module adds no orchestration logic of its own.

use fm_core::{Clock, ExecutionId, TemplateError, TemplateId};
use fm_storage::ExecutionFilter;
use fm_wire::{
    ContainerLogsDto, ErrorBody, ExecutionDetailDto, ExecutionDto, ExecutionPageDto, McpDescriptorDto,
    Request, Response, TemplateDto, TraceDto,
};

use crate::daemon::Daemon;

pub async fn handle<C: Clock + Clone + Send + Sync + 'static>(daemon: &Daemon<C>, request: Request) -> Response {
    let registry = &daemon.orchestrator.registry;
    let store = &daemon.orchestrator.store;

    match request {
        Request::ListTemplates => Response::Templates { templates: registry.get_all().await.iter().map(TemplateDto::from).collect() },

        Request::CreateTemplate { body } => {
            let template = fm_core::Template {
                id: TemplateId::new(),
                name: body.name,
                system_prompt: body.system_prompt,
                permission_mode: body.permission_mode,
                max_turns: body.max_turns,
                builtin_tools: body.builtin_tools.into_iter().collect(),
                mcp_servers: body.mcp_servers.into_iter().map(McpDescriptorDto::into).collect(),
                allowed_work_item_types: body.allowed_work_item_types,
                default_role: body.default_role,
                created_by: body.created_by,
                created_at_ms: 0,
                updated_at_ms: 0,
            };
            match registry.register(template).await {
                Ok(created) => Response::TemplateCreated { template: TemplateDto::from(&created) },
                Err(err) => Response::error(template_error_body(err)),
            }
        }

        Request::GetBuiltInTemplates => Response::Templates { templates: registry.get_built_in().await.iter().map(TemplateDto::from).collect() },

        Request::GetUserDefinedTemplates { user_id } => {
            Response::Templates { templates: registry.get_user_defined(&user_id).await.iter().map(TemplateDto::from).collect() }
        }

        Request::GetTemplatesByRole { role } => Response::Templates { templates: registry.find_by_role(role).await.iter().map(TemplateDto::from).collect() },

        Request::GetTemplatesForWorkItemType { item_type } => {
            Response::Templates { templates: registry.find_for_work_item_type(&item_type).await.iter().map(TemplateDto::from).collect() }
        }

        Request::GetTemplate { id } => match parse_id::<TemplateId>(&id) {
            Some(id) => match registry.get_by_id(id).await {
                Some(template) => Response::Template { template: TemplateDto::from(&template) },
                None => Response::error(ErrorBody::not_found(format!("template {id} not found"))),
            },
            None => Response::error(ErrorBody::bad_request(format!("malformed template id {id:?}"))),
        },

        Request::UpdateTemplate { id, patch } => match parse_id::<TemplateId>(&id) {
            Some(id) => {
                let result = registry
                    .update(id, |template| {
                        if let Some(name) = patch.name {
                            template.name = name;
                        }
                        if let Some(system_prompt) = patch.system_prompt {
                            template.system_prompt = system_prompt;
                        }
                        if let Some(permission_mode) = patch.permission_mode {
                            template.permission_mode = permission_mode;
                        }
                        if let Some(max_turns) = patch.max_turns {
                            template.max_turns = max_turns;
                        }
                        if let Some(builtin_tools) = patch.builtin_tools {
                            template.builtin_tools = builtin_tools.into_iter().collect();
                        }
                        if let Some(mcp_servers) = patch.mcp_servers {
                            template.mcp_servers = mcp_servers.into_iter().map(McpDescriptorDto::into).collect();
                        }
                        if let Some(allowed) = patch.allowed_work_item_types {
                            template.allowed_work_item_types = allowed;
                        }
                        if let Some(default_role) = patch.default_role {
                            template.default_role = default_role;
                        }
                    })
                    .await;
                match result {
                    Ok(template) => Response::Template { template: TemplateDto::from(&template) },
                    Err(err) => Response::error(template_error_body(err)),
                }
            }
            None => Response::error(ErrorBody::bad_request(format!("malformed template id {id:?}"))),
        },

        Request::DeleteTemplate { id } => match parse_id::<TemplateId>(&id) {
            Some(id) => match registry.unregister(id).await {
                Ok(()) => Response::TemplateDeleted,
                Err(err) => Response::error(template_error_body(err)),
            },
            None => Response::error(ErrorBody::bad_request(format!("malformed template id {id:?}"))),
        },

        Request::CloneTemplate { id, body } => match parse_id::<TemplateId>(&id) {
            Some(id) => match registry.clone_template(id, body.new_name, body.creator).await {
                Ok(cloned) => Response::TemplateCreated { template: TemplateDto::from(&cloned) },
                Err(err) => Response::error(template_error_body(err)),
            },
            None => Response::error(ErrorBody::bad_request(format!("malformed template id {id:?}"))),
        },

        Request::ListExecutions { query } => {
            let filter = match execution_filter(&query) {
                Ok(filter) => filter,
                Err(body) => return Response::error(body),
            };
            let page = store.executions.find(filter).await;
            Response::Executions {
                page: ExecutionPageDto { items: page.items.iter().map(ExecutionDto::from).collect(), total: page.total, has_more: page.has_more },
            }
        }

        Request::GetExecution { id } => match parse_id::<ExecutionId>(&id) {
            Some(id) => match store.executions.find_by_id(id).await {
                Some(execution) => {
                    let traces = store.traces.find_for_execution(id).await;
                    Response::Execution {
                        execution: ExecutionDetailDto { execution: ExecutionDto::from(&execution), traces: traces.iter().map(TraceDto::from).collect() },
                    }
                }
                None => Response::error(ErrorBody::not_found(format!("execution {id} not found"))),
            },
            None => Response::error(ErrorBody::bad_request(format!("malformed execution id {id:?}"))),
        },

        Request::GetExecutionTraces { id, event_type } => match parse_id::<ExecutionId>(&id) {
            Some(id) => {
                let traces = match event_type {
                    Some(event_type) => store.traces.find_by_event_type(id, event_type).await,
                    None => store.traces.find_for_execution(id).await,
                };
                Response::Traces { traces: traces.iter().map(TraceDto::from).collect() }
            }
            None => Response::error(ErrorBody::bad_request(format!("malformed execution id {id:?}"))),
        },

        Request::GetDashboardStats => {
            let stats = daemon.dashboard_cache.get_or_compute(store, &daemon.orchestrator.pool, daemon.orchestrator.clock()).await;
            Response::DashboardStats { stats }
        }

        Request::GetContainerLogs { id } | Request::StreamContainerLogs { id } => {
            // The container manager and log streaming are out-of-scope external
            // collaborators (§1); this route exists in the type system but has
            // no backing implementation to call into.
            let _ = id;
            Response::ContainerLogs { logs: ContainerLogsDto { container_id: String::new(), lines: Vec::new() } }
        }
    }
}

fn parse_id<T: From<String>>(raw: &str) -> Option<T> {
    if raw.is_empty() {
        return None;
    }
    Some(T::from(raw.to_string()))
}

fn execution_filter(query: &fm_wire::ExecutionQuery) -> Result<ExecutionFilter, ErrorBody> {
    let status = match &query.status {
        Some(raw) => Some(parse_execution_status(raw).ok_or_else(|| ErrorBody::bad_request(format!("unknown execution status {raw:?}")))?),
        None => None,
    };
    let worker_id = query.worker_id.as_ref().map(|raw| raw.clone().into());
    let work_item_id = query.work_item_id.as_ref().map(|raw| raw.clone().into());
    Ok(ExecutionFilter {
        status,
        worker_id,
        work_item_id,
        date_from_ms: query.date_from_ms,
        date_to_ms: query.date_to_ms,
        limit: query.limit,
        offset: query.offset,
    })
}

fn parse_execution_status(raw: &str) -> Option<fm_core::ExecutionStatus> {
    use fm_core::ExecutionStatus::*;
    Some(match raw {
        "pending" => Pending,
        "running" => Running,
        "success" => Success,
        "error" => Error,
        "cancelled" => Cancelled,
        _ => return None,
    })
}

fn template_error_body(err: TemplateError) -> ErrorBody {
    match err {
        TemplateError::Validation(msg) => ErrorBody::bad_request(msg),
        TemplateError::DuplicateName(name) => ErrorBody::conflict(format!("a template named '{name}' already exists")),
        TemplateError::NotFound(id) => ErrorBody::not_found(format!("template {id} not found")),
        TemplateError::SystemTemplateProtected(id) => ErrorBody::conflict(format!("Cannot delete system template {id}")),
        TemplateError::ReferencedBy(id) => ErrorBody::conflict(format!("template {id} is still referenced by a worker")),
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
