//! Per-phase entry point of the partial lifecycle.

use http::header::CACHE_CONTROL;

use partial_core::{protocol, NodeIdSet, PartialError, PhaseId};
use partial_streaming::PartialResponseWriter;

use crate::component::{Component, ViewRoot};
use crate::context::RequestContext;
use crate::processing::process_components;

/// Run the partial part of `phase` for `view`.
///
/// Execute phases process the nodes listed in the execute ids. Render
/// response streams the partial-response document. Other phases have no
/// partial work.
pub fn process_partial(
    ctx: &mut RequestContext,
    view: &mut ViewRoot,
    phase: PhaseId,
) -> Result<(), PartialError> {
    ctx.set_phase(phase);
    let execute_ids = ctx.partial_view_context_mut().execute_ids(view)?.clone();
    let render_ids = ctx.partial_view_context_mut().render_ids(view)?.clone();

    match phase {
        phase if phase.is_execute_phase() => execute_phase(ctx, view, phase, &execute_ids),
        PhaseId::RenderResponse => render_response(ctx, view, &render_ids),
        _ => Ok(()),
    }
}

fn execute_phase(
    ctx: &mut RequestContext,
    view: &mut ViewRoot,
    phase: PhaseId,
    execute_ids: &NodeIdSet,
) -> Result<(), PartialError> {
    if execute_ids.is_empty() {
        ctx.logger()
            .debug("No execute and render identifiers specified. Skipping component processing.");
        return Ok(());
    }

    if let Err(err) = process_components(view, phase, execute_ids, ctx) {
        ctx.logger()
            .info_builder(err.to_string())
            .field("phase", phase.as_str())
            .emit();
        return Err(PartialError::processing(
            phase,
            view.container_client_id(),
            err,
        ));
    }

    if phase == PhaseId::ApplyRequestValues {
        ctx.install_partial_writer()?;
    }
    Ok(())
}

fn render_response(
    ctx: &mut RequestContext,
    view: &mut ViewRoot,
    render_ids: &NodeIdSet,
) -> Result<(), PartialError> {
    let result = ctx
        .save_and_install_partial_writer()
        .and_then(|()| render_partial_document(ctx, view, render_ids));

    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is_io() => {
            ctx.logger()
                .debug_builder("Writing the partial response failed")
                .field("error", err.to_string())
                .emit();
            ctx.restore_saved_writer();
            Ok(())
        }
        Err(err) => {
            ctx.restore_saved_writer();
            Err(err)
        }
    }
}

fn render_partial_document(
    ctx: &mut RequestContext,
    view: &mut ViewRoot,
    render_ids: &NodeIdSet,
) -> Result<(), PartialError> {
    let response = ctx.external().response().clone();
    response.set_content_type(protocol::PARTIAL_CONTENT_TYPE);
    response.add_header(CACHE_CONTROL.as_str(), "no-cache");

    let document_id = view.container_client_id().to_string();
    ctx.partial_writer()?.start_document(Some(&document_id))?;

    if ctx.partial_view_context().is_reset_values(view)? {
        view.reset_values(ctx, render_ids)?;
    }

    if ctx.partial_view_context_mut().is_render_all(view)? {
        render_all(ctx, view)?;
        render_state(ctx, view)?;
        ctx.do_flash_post_phase_actions()?;
        return ctx.partial_writer()?.end_document();
    }

    render_component_resources(ctx, view)?;
    if !render_ids.is_empty() {
        process_components(view, PhaseId::RenderResponse, render_ids, ctx)?;
    }
    render_state(ctx, view)?;
    render_eval_scripts(ctx)?;
    ctx.do_flash_post_phase_actions()?;
    ctx.partial_writer()?.end_document()
}

/// Render the whole view inside one update section.
///
/// A root that is a naming container is keyed by its own client id and
/// encodes its begin and end markup; otherwise only the children are
/// encoded under the render-all marker.
pub fn render_all(ctx: &mut RequestContext, view: &mut ViewRoot) -> Result<(), PartialError> {
    if view.is_naming_container() {
        let key = view.client_id().to_string();
        ctx.partial_writer()?.start_update(&key)?;
        view.encode_begin(ctx)?;
        for child in view.children_mut() {
            child.encode_all(ctx)?;
        }
        view.encode_end(ctx)?;
    } else {
        ctx.partial_writer()?
            .start_update(protocol::RENDER_ALL_MARKER)?;
        for child in view.children_mut() {
            child.encode_all(ctx)?;
        }
    }
    ctx.partial_writer()?.end_update()
}

/// Render the component resources not yet rendered by this request into one
/// resource update section. No section is written when none qualifies.
pub fn render_component_resources(
    ctx: &mut RequestContext,
    view: &mut ViewRoot,
) -> Result<(), PartialError> {
    let application = ctx.application().clone();
    let handler = application.resource_handler();
    let mut section_open = false;

    for resource in view.component_resources_mut() {
        let eligible = resource.child_count() == 0
            && match resource.attribute("name") {
                Some(name) => {
                    handler.renderer_type_for_resource_name(name).is_some()
                        && !handler.is_resource_rendered(ctx, name, resource.attribute("library"))
                }
                None => false,
            };
        if !eligible {
            continue;
        }

        if !section_open {
            ctx.partial_writer()?
                .start_update(protocol::RESOURCE_UPDATE_KEY)?;
            section_open = true;
        }
        resource.encode_all(ctx)?;
    }

    if section_open {
        ctx.partial_writer()?.end_update()?;
    }
    Ok(())
}

/// Write the view state and, when a client window is active, its id.
pub fn render_state(ctx: &mut RequestContext, view: &mut ViewRoot) -> Result<(), PartialError> {
    let application = ctx.application().clone();

    let view_state_id = ctx.next_view_state_id(view);
    let state = application.state_manager().view_state(ctx, view)?;
    let writer = ctx.partial_writer()?;
    writer.start_update(&view_state_id)?;
    writer.write_guarded(&state)?;
    writer.end_update()?;

    if let Some(window) = ctx.external().client_window().cloned() {
        let window_id = ctx.next_client_window_id(view);
        let writer = ctx.partial_writer()?;
        writer.start_update(&window_id)?;
        writer.write_guarded(window.id())?;
        writer.end_update()?;
    }
    Ok(())
}

/// Write one eval section per queued script, in order.
pub fn render_eval_scripts(ctx: &mut RequestContext) -> Result<(), PartialError> {
    let scripts = ctx.partial_view_context().eval_scripts()?.to_vec();
    let writer = ctx.partial_writer()?;
    for script in &scripts {
        writer.start_eval()?;
        writer.write_guarded(script)?;
        writer.end_eval()?;
    }
    Ok(())
}
