mod common;

use common::*;
use partial_context::*;

const EXECUTE: &str = "jakarta.faces.partial.execute";
const RENDER: &str = "jakarta.faces.partial.render";
const RESET: &str = "jakarta.faces.partial.resetValues";

/// Run every phase in order, stopping at the first failure.
fn run_lifecycle(ctx: &mut RequestContext, view: &mut ViewRoot) -> Result<(), PartialError> {
    for phase in PhaseId::ALL {
        process_partial(ctx, view, phase)?;
    }
    Ok(())
}

fn body(ctx: &RequestContext) -> String {
    ctx.external().response().body_string()
}

#[test]
fn test_execute_and_render_all() {
    let journal = journal();
    let mut view = sample_view(&journal);
    let request = partial_request()
        .with_param(EXECUTE, "form:input1 form:input2")
        .with_param(RENDER, "@all");
    let mut ctx = context(request, application());

    assert!(ctx.partial_view_context_mut().is_ajax_request().unwrap());
    assert_eq!(
        ctx.partial_view_context_mut()
            .execute_ids(&view)
            .unwrap()
            .to_vec(),
        ["form:input1", "form:input2"]
    );
    assert!(ctx.partial_view_context_mut().is_render_all(&view).unwrap());

    run_lifecycle(&mut ctx, &mut view).unwrap();

    let calls = entries(&journal);
    assert_eq!(
        calls[..6],
        [
            "decode:form:input1",
            "decode:form:input2",
            "validate:form:input1",
            "validate:form:input2",
            "update:form:input1",
            "update:form:input2",
        ]
    );

    let sections = updates(&body(&ctx));
    let keys: Vec<&str> = sections.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, ["jakarta.faces.ViewRoot", "view:jakarta.faces.ViewState:0"]);
    assert_eq!(
        sections[0].1,
        "<div id=\"form\"><div id=\"form:input1\"></div><div id=\"form:input2\"></div></div>\
         <div id=\"panelA\"><div id=\"panelA:text\"></div></div><div id=\"panelB\"></div>"
    );
    assert_eq!(sections[1].1, "STATE");
    assert!(!body(&ctx).contains("<eval>"));
}

#[test]
fn test_empty_execute_skips_phase_and_defers_writer() {
    let journal = journal();
    let mut view = sample_view(&journal);
    let mut ctx = context(partial_request().with_param(RENDER, "panelB"), application());

    process_partial(&mut ctx, &mut view, PhaseId::ApplyRequestValues).unwrap();

    assert!(entries(&journal).is_empty());
    assert!(!ctx.is_partial_writer_installed());
    assert!(!ctx.partial_writer().unwrap().is_bound());
    assert!(ctx
        .logger()
        .entries()
        .iter()
        .any(|e| e.message.contains("Skipping component processing")));
}

#[test]
fn test_apply_request_values_installs_partial_writer() {
    let journal = journal();
    let mut view = sample_view(&journal);
    let mut ctx = context(partial_request().with_param(EXECUTE, "panelB"), application());

    process_partial(&mut ctx, &mut view, PhaseId::ApplyRequestValues).unwrap();

    assert_eq!(entries(&journal), ["decode:panelB"]);
    assert!(ctx.is_partial_writer_installed());
    assert!(!ctx.partial_writer().unwrap().is_bound());
}

#[test]
fn test_reset_values_then_render_ids() {
    let journal = journal();
    let mut view = sample_view(&journal);
    let request = partial_request()
        .with_param(RENDER, "panelA panelB")
        .with_param(RESET, "true");
    let mut ctx = context(request, application());

    process_partial(&mut ctx, &mut view, PhaseId::RenderResponse).unwrap();

    assert_eq!(
        entries(&journal),
        [
            "reset:panelA",
            "reset:panelA:text",
            "reset:panelB",
            "encode:panelA",
            "encode:panelA:text",
            "encode:panelB",
        ]
    );

    let sections = updates(&body(&ctx));
    assert_eq!(
        sections,
        [
            (
                "panelA".to_string(),
                "<div id=\"panelA\"><div id=\"panelA:text\"></div></div>".to_string()
            ),
            ("panelB".to_string(), "<div id=\"panelB\"></div>".to_string()),
            (
                "view:jakarta.faces.ViewState:0".to_string(),
                "STATE".to_string()
            ),
        ]
    );
}

#[test]
fn test_reset_values_not_requested() {
    let journal = journal();
    let mut view = sample_view(&journal);
    let request = partial_request()
        .with_param(RENDER, "panelB")
        .with_param(RESET, "TRUE");
    let mut ctx = context(request, application());

    process_partial(&mut ctx, &mut view, PhaseId::RenderResponse).unwrap();

    assert_eq!(entries(&journal), ["encode:panelB"]);
}

#[test]
fn test_failing_validator_aborts_request() {
    let journal = journal();
    let mut view = ViewRoot::new("view").with_child(
        TestNode::new("form", &journal)
            .child(TestNode::new("form:input1", &journal))
            .child(TestNode::new("form:input2", &journal).failing_validation())
            .child(TestNode::new("form:input3", &journal)),
    );
    let request = partial_request()
        .with_param(EXECUTE, "form:input1 form:input2 form:input3")
        .with_param(RENDER, "form");
    let mut ctx = context(request, application());

    let err = run_lifecycle(&mut ctx, &mut view).unwrap_err();

    match err {
        PartialError::Processing {
            phase,
            client_id,
            source,
        } => {
            assert_eq!(phase, PhaseId::ProcessValidations);
            assert_eq!(client_id, "form:input2");
            assert!(matches!(*source, PartialError::Component(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let calls = entries(&journal);
    assert_eq!(
        calls[3..],
        ["validate:form:input1", "validate:form:input2"]
    );
    assert!(!calls.iter().any(|c| c.starts_with("encode:")));
    assert!(ctx.external().response().body().is_empty());
    assert!(!ctx.partial_writer().unwrap().is_bound());

    let logs = ctx.logger().entries();
    assert!(logs
        .iter()
        .any(|e| e.level == partial_observability::LogLevel::Error
            && e.message.contains("form:input2")));
    assert!(logs
        .iter()
        .any(|e| e.level == partial_observability::LogLevel::Info
            && e.message.contains("validator rejected")));
}

#[test]
fn test_execute_all_processes_whole_tree() {
    let journal = journal();
    let mut view = sample_view(&journal);
    let mut ctx = context(partial_request().with_param(EXECUTE, "@all"), application());

    process_partial(&mut ctx, &mut view, PhaseId::ApplyRequestValues).unwrap();

    assert_eq!(
        entries(&journal),
        [
            "decode:form:input1",
            "decode:form:input2",
            "decode:form",
            "decode:panelA:text",
            "decode:panelA",
            "decode:panelB",
        ]
    );
}

#[test]
fn test_metadata_facet_executes_first() {
    let journal = journal();
    let mut view = sample_view(&journal).with_facet(
        protocol::METADATA_FACET_NAME,
        TestNode::new(protocol::METADATA_FACET_NAME, &journal),
    );
    let mut ctx = context(partial_request().with_param(EXECUTE, "panelB"), application());

    process_partial(&mut ctx, &mut view, PhaseId::ApplyRequestValues).unwrap();

    assert_eq!(
        entries(&journal),
        ["decode:jakarta_faces_metadata", "decode:panelB"]
    );
}

#[test]
fn test_unrendered_nodes_are_skipped_and_reported() {
    let journal = journal();
    let mut view = ViewRoot::new("view")
        .with_child(TestNode::new("hidden", &journal).unrendered())
        .with_child(TestNode::new("shown", &journal));
    let mut ctx = context(
        partial_request().with_param(EXECUTE, "hidden shown missing"),
        application(),
    );

    process_partial(&mut ctx, &mut view, PhaseId::ApplyRequestValues).unwrap();

    assert_eq!(entries(&journal), ["decode:shown"]);
    let entry = ctx
        .logger()
        .entries()
        .into_iter()
        .find(|e| e.message.contains("not visited"))
        .expect("unvisited ids logged");
    assert_eq!(entry.level, partial_observability::LogLevel::Trace);
    assert_eq!(
        entry.field("client_ids"),
        Some(&serde_json::json!(["hidden", "missing"]))
    );
}

#[test]
fn test_traversal_stops_once_all_ids_visited() {
    let journal = journal();
    let mut view = sample_view(&journal);
    let mut ctx = context(partial_request().with_param(EXECUTE, "form:input1"), application());

    process_partial(&mut ctx, &mut view, PhaseId::UpdateModelValues).unwrap();

    assert_eq!(entries(&journal), ["update:form:input1"]);
    assert!(!ctx
        .logger()
        .entries()
        .iter()
        .any(|e| e.message.contains("not visited")));
}

#[test]
fn test_restore_view_and_invoke_application_are_no_ops() {
    let journal = journal();
    let mut view = sample_view(&journal);
    let mut ctx = context(
        partial_request()
            .with_param(EXECUTE, "@all")
            .with_param(RENDER, "@all"),
        application(),
    );

    process_partial(&mut ctx, &mut view, PhaseId::RestoreView).unwrap();
    process_partial(&mut ctx, &mut view, PhaseId::InvokeApplication).unwrap();

    assert!(entries(&journal).is_empty());
    assert!(ctx.external().response().body().is_empty());
}

#[test]
fn test_process_partial_after_release() {
    let journal = journal();
    let mut view = sample_view(&journal);
    let mut ctx = context(partial_request().with_param(EXECUTE, "form"), application());
    ctx.release();

    assert!(matches!(
        process_partial(&mut ctx, &mut view, PhaseId::ApplyRequestValues),
        Err(PartialError::Released)
    ));
    assert!(entries(&journal).is_empty());
}
