use super::*;
use fm_core::{FakeClock, MetricsDelta, PermissionMode, Role, Template, WorkItemBuilder, WorkItemStatus, WorkerBuilder};
use fm_storage::{InMemoryTemplateRepository, InMemoryWorkerRepository};

async fn scorer() -> (AssignmentScorer<FakeClock>, Arc<InMemoryWorkerRepository>, Arc<InMemoryTemplateRepository>) {
    let workers = Arc::new(InMemoryWorkerRepository::new());
    let templates = Arc::new(InMemoryTemplateRepository::new());
    let registry = Arc::new(TemplateRegistry::new(templates.clone(), workers.clone(), FakeClock::new()));
    (AssignmentScorer::new(workers.clone(), registry, FakeClock::new()), workers, templates)
}

fn implementer_template() -> Template {
    Template::builder().name("Implementer").permission_mode(PermissionMode::AcceptEdits).default_role(Some(Role::Implementer)).build()
}

#[tokio::test]
async fn role_match_beats_non_match() {
    let (scorer, workers, templates) = scorer().await;
    let implementer = implementer_template();
    templates.create(implementer.clone()).await.unwrap();
    let reviewer = Template::builder().name("Reviewer").default_role(Some(Role::Reviewer)).build();
    templates.create(reviewer.clone()).await.unwrap();

    let w1 = WorkerBuilder::default().template_id(implementer.id).build();
    let w2 = WorkerBuilder::default().template_id(reviewer.id).build();
    workers.create(w1.clone()).await.unwrap();
    workers.create(w2.clone()).await.unwrap();

    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).build();
    let best = scorer.find_best_worker(&item, Role::Implementer).await.unwrap();
    assert_eq!(best, w1.id);
}

#[tokio::test]
async fn capability_filter_excludes_non_matching_template() {
    let (scorer, workers, templates) = scorer().await;
    let tpl = Template::builder()
        .name("BugOnly")
        .allowed_work_item_types(fm_core::AllowedWorkItemTypes::Only(vec![fm_core::WorkItemType::Bug]))
        .build();
    templates.create(tpl.clone()).await.unwrap();
    let w = WorkerBuilder::default().template_id(tpl.id).build();
    workers.create(w).await.unwrap();

    let item = WorkItemBuilder::default().item_type(fm_core::WorkItemType::Feature).status(WorkItemStatus::Ready).build();
    assert!(scorer.find_best_worker(&item, Role::Implementer).await.is_none());
}

#[tokio::test]
async fn no_idle_workers_returns_none() {
    let (scorer, _workers, _templates) = scorer().await;
    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).build();
    assert!(scorer.find_best_worker(&item, Role::Implementer).await.is_none());
}

#[tokio::test]
async fn repo_familiarity_breaks_tie_between_equally_loaded_workers() {
    let (scorer, workers, templates) = scorer().await;
    let tpl = implementer_template();
    templates.create(tpl.clone()).await.unwrap();

    let mut familiar = WorkerBuilder::default().template_id(tpl.id).build();
    familiar.record_repo_experience("repo-x");
    familiar.record_repo_experience("repo-x");
    let unfamiliar = WorkerBuilder::default().template_id(tpl.id).build();
    workers.create(familiar.clone()).await.unwrap();
    workers.create(unfamiliar.clone()).await.unwrap();

    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).repository_id(Some("repo-x".to_string())).build();
    let best = scorer.find_best_worker(&item, Role::Implementer).await.unwrap();
    assert_eq!(best, familiar.id);
}

#[tokio::test]
async fn context_exhausted_worker_is_deprioritized() {
    let (scorer, workers, templates) = scorer().await;
    let tpl = implementer_template();
    templates.create(tpl.clone()).await.unwrap();

    let fresh = WorkerBuilder::default().template_id(tpl.id).build();
    let mut loaded = WorkerBuilder::default().template_id(tpl.id).build();
    loaded.apply_metrics(MetricsDelta { context_window_used: 199_000, ..Default::default() });
    workers.create(fresh.clone()).await.unwrap();
    workers.create(loaded.clone()).await.unwrap();

    let item = WorkItemBuilder::default().status(WorkItemStatus::Ready).build();
    let best = scorer.find_best_worker(&item, Role::Implementer).await.unwrap();
    assert_eq!(best, fresh.id);
}

#[tokio::test]
async fn record_repo_experience_increments_counter() {
    let (scorer, workers, templates) = scorer().await;
    let tpl = implementer_template();
    templates.create(tpl.clone()).await.unwrap();
    let w = WorkerBuilder::default().template_id(tpl.id).build();
    workers.create(w.clone()).await.unwrap();

    scorer.record_repo_experience(w.id, "repo-x").await;
    let updated = workers.find_by_id(w.id).await.unwrap();
    assert_eq!(updated.repo_familiarity.get("repo-x"), Some(&1));
}

#[test]
fn role_for_status_matches_table() {
    assert_eq!(role_for_status(WorkItemStatus::Backlog), Some(Role::Refiner));
    assert_eq!(role_for_status(WorkItemStatus::Ready), Some(Role::Implementer));
    assert_eq!(role_for_status(WorkItemStatus::InProgress), Some(Role::Tester));
    assert_eq!(role_for_status(WorkItemStatus::Review), Some(Role::Reviewer));
    assert_eq!(role_for_status(WorkItemStatus::Done), None);
}
