//! Request classification and execute/render target sets.

use std::rc::Rc;
use std::sync::Arc;

use partial_core::{
    protocol, ExternalContext, HttpRequest, HttpResponse, NodeIdSet, PartialConfig, PartialError,
};
use partial_observability::StructuredLogger;
use partial_streaming::{DeferredPartialWriter, RenderKit, WriterDescriptor};

use crate::application::Application;
use crate::component::ViewRoot;

/// Lazily computed facts about the current request.
struct PartialRequestState {
    request: Rc<HttpRequest>,
    response: HttpResponse,
    config: Arc<PartialConfig>,
    render_kit: Arc<dyn RenderKit>,
    logger: StructuredLogger,
    character_encoding: String,
    ajax_request: Option<bool>,
    partial_request: Option<bool>,
    render_all: Option<bool>,
    execute_ids: Option<NodeIdSet>,
    render_ids: Option<NodeIdSet>,
    eval_scripts: Option<Vec<String>>,
    writer: Option<DeferredPartialWriter>,
}

impl PartialRequestState {
    /// Value of a partial-request parameter, namespaced by the view root
    /// when it is a naming container.
    fn param(&self, name: &str, view: &ViewRoot) -> Option<&str> {
        match view.namespace_prefix(self.config.separator) {
            Some(prefix) => self.request.param(&format!("{}{}", prefix, name)),
            None => self.request.param(name),
        }
    }

    fn is_ajax(&mut self) -> bool {
        if let Some(ajax) = self.ajax_request {
            return ajax;
        }
        let header = &self.config.request_header;
        let ajax = self.request.header(header) == Some(protocol::PARTIAL_AJAX)
            || self.request.param(header) == Some(protocol::PARTIAL_AJAX);
        self.ajax_request = Some(ajax);
        ajax
    }

    fn resolve_ids(&self, name: &str, view: &ViewRoot) -> NodeIdSet {
        self.param(name, view)
            .map(NodeIdSet::parse)
            .unwrap_or_default()
    }
}

/// Partial view state of one request.
///
/// Classification and target sets are computed on first access and reused
/// for the rest of the request. After [`release`](Self::release) every
/// accessor fails with [`PartialError::Released`].
pub struct PartialViewContext {
    state: Option<PartialRequestState>,
}

impl PartialViewContext {
    pub fn new(
        external: &ExternalContext,
        application: &Application,
        logger: StructuredLogger,
    ) -> Self {
        let config = Arc::clone(application.config());
        let character_encoding = external
            .request_character_encoding()
            .unwrap_or(&config.character_encoding)
            .to_string();
        Self {
            state: Some(PartialRequestState {
                request: Rc::clone(external.request()),
                response: external.response().clone(),
                config,
                render_kit: Arc::clone(application.render_kit()),
                logger,
                character_encoding,
                ajax_request: None,
                partial_request: None,
                render_all: None,
                execute_ids: None,
                render_ids: None,
                eval_scripts: None,
                writer: None,
            }),
        }
    }

    fn state(&self) -> Result<&PartialRequestState, PartialError> {
        self.state.as_ref().ok_or(PartialError::Released)
    }

    fn state_mut(&mut self) -> Result<&mut PartialRequestState, PartialError> {
        self.state.as_mut().ok_or(PartialError::Released)
    }

    /// Whether the request kind header (or parameter) says `partial/ajax`.
    pub fn is_ajax_request(&mut self) -> Result<bool, PartialError> {
        Ok(self.state_mut()?.is_ajax())
    }

    /// Whether the request is ajax or the header says `partial/process`.
    pub fn is_partial_request(&mut self) -> Result<bool, PartialError> {
        let state = self.state_mut()?;
        if let Some(partial) = state.partial_request {
            return Ok(partial);
        }
        let partial = state.is_ajax()
            || state.request.header(&state.config.request_header) == Some(protocol::PARTIAL_PROCESS);
        state.partial_request = Some(partial);
        Ok(partial)
    }

    /// Override the partial-request classification.
    pub fn set_partial_request(&mut self, partial: bool) -> Result<(), PartialError> {
        self.state_mut()?.partial_request = Some(partial);
        Ok(())
    }

    /// Whether the execute parameter is exactly `@all`.
    pub fn is_execute_all(&self, view: &ViewRoot) -> Result<bool, PartialError> {
        let state = self.state()?;
        Ok(state.param(&state.config.execute_param, view) == Some(protocol::ALL_CLIENT_IDS))
    }

    /// Whether the render parameter is exactly `@all`.
    pub fn is_render_all(&mut self, view: &ViewRoot) -> Result<bool, PartialError> {
        let state = self.state_mut()?;
        if let Some(render_all) = state.render_all {
            return Ok(render_all);
        }
        let render_all =
            state.param(&state.config.render_param, view) == Some(protocol::ALL_CLIENT_IDS);
        state.render_all = Some(render_all);
        Ok(render_all)
    }

    /// Override the render-all classification.
    pub fn set_render_all(&mut self, render_all: bool) -> Result<(), PartialError> {
        self.state_mut()?.render_all = Some(render_all);
        Ok(())
    }

    /// Whether the reset-values parameter is exactly `true`. Recomputed on
    /// every call.
    pub fn is_reset_values(&self, view: &ViewRoot) -> Result<bool, PartialError> {
        let state = self.state()?;
        Ok(state.param(&state.config.reset_values_param, view) == Some("true"))
    }

    /// Client ids to execute. When non-empty and the view carries the
    /// metadata facet, the facet id comes first.
    pub fn execute_ids(&mut self, view: &ViewRoot) -> Result<&NodeIdSet, PartialError> {
        let state = self.state_mut()?;
        if state.execute_ids.is_none() {
            let mut ids = state.resolve_ids(&state.config.execute_param, view);
            if !ids.is_empty() && view.has_metadata_facet() {
                ids.prepend(protocol::METADATA_FACET_NAME);
            }
            state
                .logger
                .trace_builder("Resolved execute ids")
                .field_list("client_ids", ids.iter())
                .emit();
            state.execute_ids = Some(ids);
        }
        Ok(&*state.execute_ids.get_or_insert_with(NodeIdSet::new))
    }

    /// Client ids to render.
    pub fn render_ids(&mut self, view: &ViewRoot) -> Result<&NodeIdSet, PartialError> {
        let state = self.state_mut()?;
        if state.render_ids.is_none() {
            let ids = state.resolve_ids(&state.config.render_param, view);
            state
                .logger
                .trace_builder("Resolved render ids")
                .field_list("client_ids", ids.iter())
                .emit();
            state.render_ids = Some(ids);
        }
        Ok(&*state.render_ids.get_or_insert_with(NodeIdSet::new))
    }

    /// Scripts to evaluate on the client after the updates are applied.
    pub fn eval_scripts_mut(&mut self) -> Result<&mut Vec<String>, PartialError> {
        Ok(self.state_mut()?.eval_scripts.get_or_insert_with(Vec::new))
    }

    pub fn eval_scripts(&self) -> Result<&[String], PartialError> {
        Ok(self.state()?.eval_scripts.as_deref().unwrap_or_default())
    }

    /// The partial response writer, described on first access and bound to
    /// the transport on its first write.
    pub fn partial_response_writer(&mut self) -> Result<&mut DeferredPartialWriter, PartialError> {
        let state = self.state_mut()?;
        let PartialRequestState {
            response,
            config,
            render_kit,
            logger,
            character_encoding,
            writer,
            ..
        } = state;
        Ok(writer.get_or_insert_with(|| {
            let descriptor = WriterDescriptor {
                content_type: protocol::PARTIAL_CONTENT_TYPE.to_string(),
                character_encoding: character_encoding.clone(),
                buffer_size: config.response_buffer_size,
                flush: config.flush,
            };
            DeferredPartialWriter::new(
                descriptor,
                response.clone(),
                Arc::clone(render_kit),
                logger.clone(),
            )
        }))
    }

    /// Drop the request state. Later accessor calls fail.
    pub fn release(&mut self) {
        if let Some(state) = self.state.take() {
            state.logger.trace("Partial view context released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.state.is_none()
    }
}
