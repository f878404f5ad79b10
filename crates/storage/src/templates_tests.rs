// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fm_core::Template;

#[tokio::test]
async fn create_rejects_duplicate_name_case_insensitive() {
    let repo = InMemoryTemplateRepository::new();
    let a = Template::builder().name("Implementer").build();
    let b = Template::builder().name("implementer").build();
    repo.create(a).await.unwrap();
    let err = repo.create(b).await.unwrap_err();
    assert!(matches!(err, StorageError::DuplicateName { .. }));
}

#[tokio::test]
async fn update_missing_template_errors() {
    let repo = InMemoryTemplateRepository::new();
    let t = Template::builder().build();
    let err = repo.update(t).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[tokio::test]
async fn find_by_name_is_case_insensitive() {
    let repo = InMemoryTemplateRepository::new();
    let t = Template::builder().name("Reviewer").build();
    repo.create(t.clone()).await.unwrap();
    assert_eq!(repo.find_by_name("reviewer").await.map(|t| t.id), Some(t.id));
}

#[tokio::test]
async fn find_built_in_filters_by_creator() {
    let repo = InMemoryTemplateRepository::new();
    let builtin = Template::builder().name("Tester").created_by(fm_core::SYSTEM_CREATOR).build();
    let custom = Template::builder().name("Custom").created_by("alice").build();
    repo.create(builtin.clone()).await.unwrap();
    repo.create(custom).await.unwrap();
    let found = repo.find_built_in().await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, builtin.id);
}

#[tokio::test]
async fn delete_missing_template_errors() {
    let repo = InMemoryTemplateRepository::new();
    let err = repo.delete(fm_core::TemplateId::new()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}
