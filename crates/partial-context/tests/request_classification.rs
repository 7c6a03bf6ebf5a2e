mod common;

use common::*;
use partial_context::*;

struct Metadata;

impl Component for Metadata {
    fn id(&self) -> &str {
        protocol::METADATA_FACET_NAME
    }

    fn client_id(&self) -> &str {
        protocol::METADATA_FACET_NAME
    }
}

fn request_with(name: &str, value: &str) -> HttpRequest {
    partial_request().with_param(name, value)
}

#[test]
fn test_classification_is_idempotent() {
    let requests = [
        HttpRequest::new(),
        partial_request(),
        HttpRequest::new().with_header("Faces-Request", "partial/process"),
        HttpRequest::new().with_param("Faces-Request", "partial/ajax"),
        HttpRequest::new().with_header("Faces-Request", "full"),
    ];

    for request in requests {
        let mut ctx = context(request, application());
        let pvc = ctx.partial_view_context_mut();

        let ajax = pvc.is_ajax_request().unwrap();
        let partial = pvc.is_partial_request().unwrap();
        for _ in 0..3 {
            assert_eq!(pvc.is_ajax_request().unwrap(), ajax);
            assert_eq!(pvc.is_partial_request().unwrap(), partial);
        }
        if ajax {
            assert!(partial);
        }
    }
}

#[test]
fn test_process_header_is_partial_but_not_ajax() {
    let mut ctx = context(
        HttpRequest::new().with_header("Faces-Request", "partial/process"),
        application(),
    );
    let pvc = ctx.partial_view_context_mut();
    assert!(!pvc.is_ajax_request().unwrap());
    assert!(pvc.is_partial_request().unwrap());
}

#[test]
fn test_configured_request_header() {
    let application = std::sync::Arc::new(
        Application::new(FixedState("S"))
            .with_config(PartialConfig::default().with_request_header("X-Partial")),
    );
    let mut ctx = context(
        HttpRequest::new().with_header("X-Partial", "partial/ajax"),
        application,
    );
    assert!(ctx.partial_view_context_mut().is_ajax_request().unwrap());
}

#[test]
fn test_metadata_facet_leads_non_empty_execute_ids() {
    let view = ViewRoot::new("view").with_facet(protocol::METADATA_FACET_NAME, Metadata);

    let mut ctx = context(
        request_with("jakarta.faces.partial.execute", "form:input1 form:input2"),
        application(),
    );
    let ids = ctx.partial_view_context_mut().execute_ids(&view).unwrap();
    assert_eq!(
        ids.to_vec(),
        [protocol::METADATA_FACET_NAME, "form:input1", "form:input2"]
    );

    let mut ctx = context(request_with("jakarta.faces.partial.execute", ""), application());
    assert!(ctx
        .partial_view_context_mut()
        .execute_ids(&view)
        .unwrap()
        .is_empty());

    let mut ctx = context(partial_request(), application());
    assert!(ctx
        .partial_view_context_mut()
        .execute_ids(&view)
        .unwrap()
        .is_empty());
}

#[test]
fn test_execute_ids_without_facet() {
    let view = ViewRoot::new("view");
    let mut ctx = context(
        request_with("jakarta.faces.partial.execute", "form:input1 form:input2"),
        application(),
    );
    assert_eq!(
        ctx.partial_view_context_mut()
            .execute_ids(&view)
            .unwrap()
            .to_vec(),
        ["form:input1", "form:input2"]
    );
}

#[test]
fn test_all_sentinel_must_match_exactly() {
    let view = ViewRoot::new("view");
    let cases = [
        ("@all", true),
        ("@ALL", false),
        (" @all", false),
        ("@all form", false),
        ("all", false),
        ("", false),
    ];

    for (value, expected) in cases {
        let request = partial_request()
            .with_param("jakarta.faces.partial.execute", value)
            .with_param("jakarta.faces.partial.render", value);
        let mut ctx = context(request, application());
        let pvc = ctx.partial_view_context_mut();
        assert_eq!(pvc.is_execute_all(&view).unwrap(), expected, "execute {:?}", value);
        assert_eq!(pvc.is_render_all(&view).unwrap(), expected, "render {:?}", value);
    }

    let mut ctx = context(partial_request(), application());
    assert!(!ctx.partial_view_context_mut().is_render_all(&view).unwrap());
    assert!(!ctx.partial_view_context().is_execute_all(&view).unwrap());
}

#[test]
fn test_reset_values_requires_exact_true() {
    let view = ViewRoot::new("view");
    let cases = [
        ("true", true),
        ("TRUE", false),
        ("True", false),
        ("1", false),
        ("", false),
    ];

    for (value, expected) in cases {
        let ctx = context(
            request_with("jakarta.faces.partial.resetValues", value),
            application(),
        );
        assert_eq!(
            ctx.partial_view_context().is_reset_values(&view).unwrap(),
            expected,
            "resetValues {:?}",
            value
        );
    }

    let ctx = context(partial_request(), application());
    assert!(!ctx.partial_view_context().is_reset_values(&view).unwrap());
}

#[test]
fn test_none_keyword_yields_empty_render_ids() {
    let view = ViewRoot::new("view");
    let mut ctx = context(request_with("jakarta.faces.partial.render", "@none"), application());
    assert!(ctx
        .partial_view_context_mut()
        .render_ids(&view)
        .unwrap()
        .is_empty());
}

#[test]
fn test_release_through_request_context() {
    let view = ViewRoot::new("view");
    let mut ctx = context(partial_request(), application());
    assert!(ctx.partial_view_context_mut().is_ajax_request().unwrap());

    ctx.release();
    assert!(matches!(
        ctx.partial_view_context_mut().is_ajax_request(),
        Err(PartialError::Released)
    ));
    assert!(matches!(
        ctx.partial_view_context_mut().render_ids(&view),
        Err(PartialError::Released)
    ));
}
