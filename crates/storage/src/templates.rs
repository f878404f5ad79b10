// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence port for [`Template`]s (C1).

use std::collections::HashMap;

use async_trait::async_trait;
use fm_core::{Template, TemplateId};
use parking_lot::RwLock;

use crate::error::StorageError;
use crate::order::OrderBy;

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, template: Template) -> Result<(), StorageError>;
    async fn update(&self, template: Template) -> Result<(), StorageError>;
    async fn delete(&self, id: TemplateId) -> Result<(), StorageError>;
    async fn find_by_id(&self, id: TemplateId) -> Option<Template>;
    async fn find_by_name(&self, name: &str) -> Option<Template>;
    async fn find_all(&self, order: OrderBy) -> Vec<Template>;
    async fn find_built_in(&self) -> Vec<Template>;
    async fn find_user_defined(&self, created_by: &str) -> Vec<Template>;
}

/// In-memory implementation. Production-usable for single-process
/// deployments; a real driver would sit behind the same trait.
#[derive(Default)]
pub struct InMemoryTemplateRepository {
    templates: RwLock<HashMap<TemplateId, Template>>,
}

impl InMemoryTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_taken(templates: &HashMap<TemplateId, Template>, name: &str, excluding: Option<TemplateId>) -> bool {
        templates
            .values()
            .any(|t| t.name.eq_ignore_ascii_case(name) && Some(t.id) != excluding)
    }

    fn sorted(mut templates: Vec<Template>, order: OrderBy) -> Vec<Template> {
        match order {
            OrderBy::CreatedAtAsc => templates.sort_by_key(|t| t.created_at_ms),
            OrderBy::CreatedAtDesc => templates.sort_by_key(|t| std::cmp::Reverse(t.created_at_ms)),
        }
        templates
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn create(&self, template: Template) -> Result<(), StorageError> {
        let mut templates = self.templates.write();
        if Self::name_taken(&templates, &template.name, None) {
            return Err(StorageError::DuplicateName { kind: "template", name: template.name });
        }
        templates.insert(template.id, template);
        Ok(())
    }

    async fn update(&self, template: Template) -> Result<(), StorageError> {
        let mut templates = self.templates.write();
        if !templates.contains_key(&template.id) {
            return Err(StorageError::NotFound { kind: "template", id: template.id.to_string() });
        }
        if Self::name_taken(&templates, &template.name, Some(template.id)) {
            return Err(StorageError::DuplicateName { kind: "template", name: template.name });
        }
        templates.insert(template.id, template);
        Ok(())
    }

    async fn delete(&self, id: TemplateId) -> Result<(), StorageError> {
        let mut templates = self.templates.write();
        templates
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound { kind: "template", id: id.to_string() })
    }

    async fn find_by_id(&self, id: TemplateId) -> Option<Template> {
        self.templates.read().get(&id).cloned()
    }

    async fn find_by_name(&self, name: &str) -> Option<Template> {
        self.templates.read().values().find(|t| t.name.eq_ignore_ascii_case(name)).cloned()
    }

    async fn find_all(&self, order: OrderBy) -> Vec<Template> {
        Self::sorted(self.templates.read().values().cloned().collect(), order)
    }

    async fn find_built_in(&self) -> Vec<Template> {
        self.templates.read().values().filter(|t| t.is_builtin()).cloned().collect()
    }

    async fn find_user_defined(&self, created_by: &str) -> Vec<Template> {
        self.templates.read().values().filter(|t| t.created_by == created_by).cloned().collect()
    }
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
