//! Phase-aware processing of the nodes matched by a scoped traversal.

use partial_core::{NodeIdSet, PartialError, PhaseId};
use partial_observability::StructuredLogger;
use partial_streaming::PartialResponseWriter;

use crate::component::{Component, ComponentResult};
use crate::context::RequestContext;
use crate::visit::{visit_tree, VisitCallback, VisitHint, VisitHints, VisitResult};

/// What a matched node does during a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAction {
    Decode,
    Validate,
    Update,
    /// Encode the node inside an update section keyed by its client id.
    Encode,
}

impl PhaseAction {
    pub fn for_phase(phase: PhaseId) -> Result<Self, PartialError> {
        match phase {
            PhaseId::ApplyRequestValues => Ok(PhaseAction::Decode),
            PhaseId::ProcessValidations => Ok(PhaseAction::Validate),
            PhaseId::UpdateModelValues => Ok(PhaseAction::Update),
            PhaseId::RenderResponse => Ok(PhaseAction::Encode),
            other => Err(PartialError::UnexpectedPhase(other)),
        }
    }

    /// Run the action on `component` and its subtree.
    pub fn apply(self, ctx: &mut RequestContext, component: &mut dyn Component) -> ComponentResult {
        match self {
            PhaseAction::Decode => component.process_decodes(ctx),
            PhaseAction::Validate => component.process_validators(ctx),
            PhaseAction::Update => component.process_updates(ctx),
            PhaseAction::Encode => {
                let key = component.client_id().to_string();
                ctx.partial_writer()?.start_update(&key)?;
                component.encode_all(ctx)?;
                ctx.partial_writer()?.end_update()
            }
        }
    }
}

/// Callback running the phase action on every matched node.
///
/// Matched nodes are handled together with their subtree, so the callback
/// always rejects.
pub struct PhaseAwareVisitCallback {
    phase: PhaseId,
    logger: StructuredLogger,
}

impl PhaseAwareVisitCallback {
    pub fn new(phase: PhaseId, logger: StructuredLogger) -> Self {
        Self { phase, logger }
    }
}

impl VisitCallback for PhaseAwareVisitCallback {
    fn visit(
        &mut self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> Result<VisitResult, PartialError> {
        let action = PhaseAction::for_phase(self.phase)?;

        if let Err(err) = action.apply(ctx, component) {
            let client_id = component.client_id().to_string();
            self.logger
                .error_builder(format!("Processing '{}' failed", client_id))
                .field("client_id", client_id.clone())
                .field("error", err.to_string())
                .emit();
            self.logger
                .debug_builder("Processing failure detail")
                .field("client_id", client_id.clone())
                .field("detail", format!("{:?}", err))
                .emit();
            return Err(PartialError::processing(self.phase, client_id, err));
        }

        Ok(VisitResult::Reject)
    }
}

/// Run `phase` over the nodes of `root` listed in `ids`.
pub fn process_components(
    root: &mut dyn Component,
    phase: PhaseId,
    ids: &NodeIdSet,
    ctx: &mut RequestContext,
) -> Result<(), PartialError> {
    let hints: VisitHints = [VisitHint::SkipUnrendered, VisitHint::ExecuteLifecycle]
        .into_iter()
        .collect();
    let application = ctx.application().clone();
    let mut visit_context = application
        .visit_context_factory()
        .visit_context(Some(ids), hints);

    let logger = ctx.logger().for_phase(phase);
    let mut callback = PhaseAwareVisitCallback::new(phase, logger.clone());
    visit_tree(root, visit_context.as_mut(), ctx, &mut callback)?;

    if let Some(diagnostics) = visit_context.unvisited() {
        let unvisited = diagnostics.unvisited_client_ids();
        if !unvisited.is_empty() {
            logger
                .trace_builder("Some client ids were not visited")
                .field_list("client_ids", unvisited)
                .emit();
        }
    }
    Ok(())
}
