//! Application-scoped collaborators shared by every request.

use std::sync::Arc;

use partial_core::{PartialConfig, PartialError};
use partial_streaming::{MarkupRenderKit, RenderKit};

use crate::component::ViewRoot;
use crate::context::RequestContext;
use crate::visit::{DefaultVisitContextFactory, VisitContextFactory};

/// Renderer type for script resources.
pub const SCRIPT_RENDERER_TYPE: &str = "jakarta.faces.resource.Script";

/// Renderer type for stylesheet resources.
pub const STYLESHEET_RENDERER_TYPE: &str = "jakarta.faces.resource.Stylesheet";

/// Produces the serialized view state sent back with every partial response.
pub trait StateManager: Send + Sync {
    fn view_state(&self, ctx: &RequestContext, view: &ViewRoot) -> Result<String, PartialError>;
}

/// Resolves resources referenced by component resources of the view.
pub trait ResourceHandler: Send + Sync {
    /// Renderer type able to render the named resource, if any.
    fn renderer_type_for_resource_name(&self, name: &str) -> Option<&str>;

    /// Whether the resource was already rendered during this request.
    fn is_resource_rendered(
        &self,
        ctx: &RequestContext,
        name: &str,
        library: Option<&str>,
    ) -> bool {
        ctx.is_resource_rendered(name, library)
    }
}

/// Maps `.js` and `.css` resource names to the script and stylesheet
/// renderers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResourceHandler;

impl ResourceHandler for DefaultResourceHandler {
    fn renderer_type_for_resource_name(&self, name: &str) -> Option<&str> {
        let (_, extension) = name.rsplit_once('.')?;
        match extension {
            "js" | "mjs" => Some(SCRIPT_RENDERER_TYPE),
            "css" => Some(STYLESHEET_RENDERER_TYPE),
            _ => None,
        }
    }
}

/// Shared, read-only application state.
pub struct Application {
    config: Arc<PartialConfig>,
    state_manager: Box<dyn StateManager>,
    resource_handler: Box<dyn ResourceHandler>,
    render_kit: Arc<dyn RenderKit>,
    visit_context_factory: Box<dyn VisitContextFactory>,
}

impl Application {
    /// Create an application with default configuration, resource handler,
    /// render kit and visit contexts.
    pub fn new(state_manager: impl StateManager + 'static) -> Self {
        Self {
            config: Arc::new(PartialConfig::default()),
            state_manager: Box::new(state_manager),
            resource_handler: Box::new(DefaultResourceHandler),
            render_kit: Arc::new(MarkupRenderKit),
            visit_context_factory: Box::new(DefaultVisitContextFactory),
        }
    }

    pub fn with_config(mut self, config: PartialConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn with_resource_handler(mut self, handler: impl ResourceHandler + 'static) -> Self {
        self.resource_handler = Box::new(handler);
        self
    }

    pub fn with_render_kit(mut self, render_kit: Arc<dyn RenderKit>) -> Self {
        self.render_kit = render_kit;
        self
    }

    pub fn with_visit_context_factory(
        mut self,
        factory: impl VisitContextFactory + 'static,
    ) -> Self {
        self.visit_context_factory = Box::new(factory);
        self
    }

    pub fn config(&self) -> &Arc<PartialConfig> {
        &self.config
    }

    pub fn state_manager(&self) -> &dyn StateManager {
        self.state_manager.as_ref()
    }

    pub fn resource_handler(&self) -> &dyn ResourceHandler {
        self.resource_handler.as_ref()
    }

    pub fn render_kit(&self) -> &Arc<dyn RenderKit> {
        &self.render_kit
    }

    pub fn visit_context_factory(&self) -> &dyn VisitContextFactory {
        self.visit_context_factory.as_ref()
    }
}
