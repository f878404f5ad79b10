// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template registry (C2): CRUD plus capability queries over [`Template`]s,
//! with a lookup cache invalidated on every write.

use std::collections::HashMap;
use std::sync::Arc;

use fm_core::{
    AllowedWorkItemTypes, Clock, PermissionMode, Role, Template, TemplateError, TemplateId,
    WorkItemType, SYSTEM_CREATOR,
};
use fm_storage::{OrderBy, TemplateRepository, WorkerRepository};
use parking_lot::RwLock;

/// The four built-in role templates, each with its canonical permission
/// mode (§4.2's resolution of the built-in-permission-mode Open Question).
const BUILT_INS: &[(&str, Role, PermissionMode)] = &[
    ("Refiner", Role::Refiner, PermissionMode::AskUser),
    ("Implementer", Role::Implementer, PermissionMode::AcceptEdits),
    ("Tester", Role::Tester, PermissionMode::AcceptEdits),
    ("Reviewer", Role::Reviewer, PermissionMode::AskUser),
];

/// A cache entry keyed by template id, invalidated wholesale on any write.
#[derive(Default)]
struct Cache {
    by_id: HashMap<TemplateId, Template>,
    valid: bool,
}

pub struct TemplateRegistry<C: Clock> {
    repo: Arc<dyn TemplateRepository>,
    workers: Arc<dyn WorkerRepository>,
    clock: C,
    cache: RwLock<Cache>,
}

impl<C: Clock> TemplateRegistry<C> {
    pub fn new(repo: Arc<dyn TemplateRepository>, workers: Arc<dyn WorkerRepository>, clock: C) -> Self {
        Self { repo, workers, clock, cache: RwLock::new(Cache::default()) }
    }

    fn invalidate(&self) {
        self.cache.write().valid = false;
    }

    pub async fn register(&self, mut template: Template) -> Result<Template, TemplateError> {
        template.validate()?;
        if self.repo.find_by_name(&template.name).await.is_some() {
            return Err(TemplateError::DuplicateName(template.name.clone()));
        }
        let now = self.clock.epoch_ms();
        template.created_at_ms = now;
        template.updated_at_ms = now;
        self.repo.create(template.clone()).await.map_err(|_| TemplateError::DuplicateName(template.name.clone()))?;
        self.invalidate();
        Ok(template)
    }

    pub async fn update(&self, id: TemplateId, mutate: impl FnOnce(&mut Template)) -> Result<Template, TemplateError> {
        let mut template = self.repo.find_by_id(id).await.ok_or(TemplateError::NotFound(id))?;
        mutate(&mut template);
        template.validate()?;
        template.updated_at_ms = self.clock.epoch_ms();
        self.repo
            .update(template.clone())
            .await
            .map_err(|_| TemplateError::DuplicateName(template.name.clone()))?;
        self.invalidate();
        Ok(template)
    }

    pub async fn unregister(&self, id: TemplateId) -> Result<(), TemplateError> {
        let template = self.repo.find_by_id(id).await.ok_or(TemplateError::NotFound(id))?;
        if template.is_builtin() {
            return Err(TemplateError::SystemTemplateProtected(id));
        }
        if !self.workers.find_by_template(id).await.is_empty() {
            return Err(TemplateError::ReferencedBy(id));
        }
        self.repo.delete(id).await.map_err(|_| TemplateError::NotFound(id))?;
        self.invalidate();
        Ok(())
    }

    pub async fn get_by_id(&self, id: TemplateId) -> Option<Template> {
        if let Some(hit) = self.cache_hit(id) {
            return Some(hit);
        }
        let template = self.repo.find_by_id(id).await?;
        self.cache.write().by_id.insert(id, template.clone());
        Some(template)
    }

    fn cache_hit(&self, id: TemplateId) -> Option<Template> {
        let cache = self.cache.read();
        if cache.valid {
            cache.by_id.get(&id).cloned()
        } else {
            None
        }
    }

    pub async fn get_all(&self) -> Vec<Template> {
        self.repo.find_all(OrderBy::CreatedAtAsc).await
    }

    pub async fn get_built_in(&self) -> Vec<Template> {
        self.repo.find_built_in().await
    }

    pub async fn get_user_defined(&self, user_id: &str) -> Vec<Template> {
        self.repo.find_user_defined(user_id).await
    }

    pub async fn find_by_role(&self, role: Role) -> Vec<Template> {
        self.get_all().await.into_iter().filter(|t| t.default_role == Some(role)).collect()
    }

    pub async fn find_for_work_item_type(&self, item_type: &WorkItemType) -> Vec<Template> {
        self.get_all().await.into_iter().filter(|t| t.allows_work_item_type(item_type)).collect()
    }

    pub async fn clone_template(
        &self,
        id: TemplateId,
        new_name: impl Into<String>,
        creator: impl Into<String>,
    ) -> Result<Template, TemplateError> {
        let source = self.repo.find_by_id(id).await.ok_or(TemplateError::NotFound(id))?;
        let mut cloned = source;
        cloned.id = TemplateId::new();
        cloned.name = new_name.into();
        cloned.created_by = creator.into();
        self.register(cloned).await
    }

    /// Idempotent: seeds the four built-ins if absent, never duplicates them.
    pub async fn initialize_built_ins(&self) -> Result<(), TemplateError> {
        for (name, role, mode) in BUILT_INS {
            if self.repo.find_by_name(name).await.is_some() {
                continue;
            }
            let now = self.clock.epoch_ms();
            let template = Template {
                id: TemplateId::new(),
                name: (*name).to_string(),
                system_prompt: format!(
                    "You are the {name} agent. Operate within your role's capability boundary and hand off work as your role requires."
                ),
                permission_mode: *mode,
                max_turns: 40,
                builtin_tools: Default::default(),
                mcp_servers: Vec::new(),
                allowed_work_item_types: AllowedWorkItemTypes::All,
                default_role: Some(*role),
                created_by: SYSTEM_CREATOR.to_string(),
                created_at_ms: now,
                updated_at_ms: now,
            };
            self.repo.create(template).await.map_err(|_| TemplateError::DuplicateName((*name).to_string()))?;
        }
        self.invalidate();
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
