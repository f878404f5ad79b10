use super::*;

#[test]
fn error_response_is_not_success() {
    let response = Response::error(ErrorBody::not_found("template tpl-xyz not found"));
    assert!(!response.is_success());
}

#[test]
fn template_created_tags_as_its_own_type() {
    let template = fm_core::TemplateBuilder::default().build();
    let response = Response::TemplateCreated { template: TemplateDto::from(&template) };
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json.get("type").unwrap(), "TemplateCreated");
}

#[test]
fn execution_detail_flattens_the_execution_fields_alongside_traces() {
    let worker_id = fm_core::WorkerId::new();
    let item_id = fm_core::WorkItemId::new();
    let execution = fm_core::Execution::new(worker_id, item_id, "workspace-1", fm_core::TemplateId::new(), 0);
    let detail = ExecutionDetailDto { execution: ExecutionDto::from(&execution), traces: Vec::new() };
    let json = serde_json::to_value(detail).unwrap();
    assert!(json.get("workerId").is_some(), "execution fields should be flattened, not nested");
    assert!(json.get("traces").is_some());
}
