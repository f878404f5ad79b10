// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fm_core::{FakeClock, Template, TemplateBuilder, WorkItemBuilder};

fn template() -> Template {
    TemplateBuilder::new()
        .name("refiner")
        .system_prompt("refine backlog items into ready work with enough detail")
        .build()
}

#[tokio::test]
async fn work_item_update_stamps_updated_at_from_the_clock() {
    let clock = FakeClock::new();
    let store = Store::in_memory(clock.clone());
    let item = WorkItemBuilder::default().created_at_ms(0).updated_at_ms(0).build();
    store.work_items.create(item.clone()).await.unwrap();

    clock.advance(std::time::Duration::from_secs(5));
    let mut edited = item.clone();
    edited.title = "renamed".to_string();
    store.work_items.update(edited).await.unwrap();

    let reloaded = store.work_items.find_by_id(item.id).await.unwrap();
    assert_eq!(reloaded.updated_at_ms, clock.epoch_ms());
    assert_ne!(reloaded.updated_at_ms, 0);
}

#[tokio::test]
async fn template_create_and_find() {
    let store = Store::in_memory(FakeClock::new());
    let tpl = template();
    store.templates.create(tpl.clone()).await.unwrap();
    assert_eq!(store.templates.find_by_id(tpl.id).await.unwrap().name, tpl.name);
}
