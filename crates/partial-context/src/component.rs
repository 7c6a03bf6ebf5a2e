//! Component tree interface consumed by the partial lifecycle.

use indexmap::IndexMap;

use partial_core::{protocol, NodeIdSet, PartialError};

use crate::context::RequestContext;
use crate::visit::{visit_tree, VisitCallback, VisitHints, VisitResult};

/// Result of a component lifecycle hook.
pub type ComponentResult = Result<(), PartialError>;

/// A node of the server-side component tree.
///
/// The lifecycle methods (`process_*`, `encode_all`) recurse into facets and
/// children and skip nodes that are not rendered. Implementations normally
/// override only the per-node hooks (`decode`, `validate`, `update_model`,
/// `encode_begin`, `encode_end`).
pub trait Component {
    /// Id local to the enclosing naming container.
    fn id(&self) -> &str;

    /// Id unique within the rendered tree.
    fn client_id(&self) -> &str;

    fn is_rendered(&self) -> bool {
        true
    }

    fn is_naming_container(&self) -> bool {
        false
    }

    fn attribute(&self, _name: &str) -> Option<&str> {
        None
    }

    fn children(&self) -> &[Box<dyn Component>] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Component>] {
        &mut []
    }

    fn child_count(&self) -> usize {
        self.children().len()
    }

    fn facet(&self, _name: &str) -> Option<&dyn Component> {
        None
    }

    fn facets_mut(&mut self) -> Vec<&mut Box<dyn Component>> {
        Vec::new()
    }

    fn decode(&mut self, _ctx: &mut RequestContext) -> ComponentResult {
        Ok(())
    }

    fn validate(&mut self, _ctx: &mut RequestContext) -> ComponentResult {
        Ok(())
    }

    fn update_model(&mut self, _ctx: &mut RequestContext) -> ComponentResult {
        Ok(())
    }

    /// Clear locally held and submitted values.
    fn reset_value(&mut self) {}

    fn process_decodes(&mut self, ctx: &mut RequestContext) -> ComponentResult {
        if !self.is_rendered() {
            return Ok(());
        }
        for facet in self.facets_mut() {
            facet.process_decodes(ctx)?;
        }
        for child in self.children_mut() {
            child.process_decodes(ctx)?;
        }
        self.decode(ctx)
    }

    fn process_validators(&mut self, ctx: &mut RequestContext) -> ComponentResult {
        if !self.is_rendered() {
            return Ok(());
        }
        for facet in self.facets_mut() {
            facet.process_validators(ctx)?;
        }
        for child in self.children_mut() {
            child.process_validators(ctx)?;
        }
        self.validate(ctx)
    }

    fn process_updates(&mut self, ctx: &mut RequestContext) -> ComponentResult {
        if !self.is_rendered() {
            return Ok(());
        }
        for facet in self.facets_mut() {
            facet.process_updates(ctx)?;
        }
        for child in self.children_mut() {
            child.process_updates(ctx)?;
        }
        self.update_model(ctx)
    }

    fn encode_begin(&mut self, _ctx: &mut RequestContext) -> ComponentResult {
        Ok(())
    }

    fn encode_children(&mut self, ctx: &mut RequestContext) -> ComponentResult {
        for child in self.children_mut() {
            child.encode_all(ctx)?;
        }
        Ok(())
    }

    fn encode_end(&mut self, _ctx: &mut RequestContext) -> ComponentResult {
        Ok(())
    }

    /// Encode this node and its subtree.
    fn encode_all(&mut self, ctx: &mut RequestContext) -> ComponentResult {
        if !self.is_rendered() {
            return Ok(());
        }
        self.encode_begin(ctx)?;
        self.encode_children(ctx)?;
        self.encode_end(ctx)
    }
}

/// Root of a component tree.
///
/// Besides the visible content the root carries facets (among them the
/// metadata facet) and the component resources rendered into the head of
/// the page.
pub struct ViewRoot {
    id: String,
    naming_container: bool,
    children: Vec<Box<dyn Component>>,
    facets: IndexMap<String, Box<dyn Component>>,
    resources: Vec<Box<dyn Component>>,
}

impl ViewRoot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            naming_container: false,
            children: Vec::new(),
            facets: IndexMap::new(),
            resources: Vec::new(),
        }
    }

    /// Make the root a naming container; request parameters are then
    /// namespaced with its client id.
    pub fn with_naming_container(mut self, naming_container: bool) -> Self {
        self.naming_container = naming_container;
        self
    }

    pub fn with_child(mut self, child: impl Component + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn with_facet(mut self, name: impl Into<String>, facet: impl Component + 'static) -> Self {
        self.facets.insert(name.into(), Box::new(facet));
        self
    }

    pub fn with_component_resource(mut self, resource: impl Component + 'static) -> Self {
        self.resources.push(Box::new(resource));
        self
    }

    pub fn component_resources(&self) -> &[Box<dyn Component>] {
        &self.resources
    }

    pub fn component_resources_mut(&mut self) -> &mut [Box<dyn Component>] {
        &mut self.resources
    }

    /// Whether the metadata facet is present.
    pub fn has_metadata_facet(&self) -> bool {
        self.facets.contains_key(protocol::METADATA_FACET_NAME)
    }

    /// Client id used as the document id and naming prefix.
    pub fn container_client_id(&self) -> &str {
        &self.id
    }

    /// Prefix applied to request parameter names, when the root is a naming
    /// container.
    pub fn namespace_prefix(&self, separator: char) -> Option<String> {
        self.naming_container
            .then(|| format!("{}{}", self.id, separator))
    }

    /// Key of the `counter`-th view-state section.
    pub fn view_state_id(&self, separator: char, counter: u32) -> String {
        self.section_id(protocol::VIEW_STATE_PARAM, separator, counter)
    }

    /// Key of the `counter`-th client-window section.
    pub fn client_window_id(&self, separator: char, counter: u32) -> String {
        self.section_id(protocol::CLIENT_WINDOW_PARAM, separator, counter)
    }

    fn section_id(&self, param: &str, separator: char, counter: u32) -> String {
        format!("{root}{sep}{param}{sep}{counter}", root = self.id, sep = separator)
    }

    /// Reset the values of the nodes listed in `ids` and of their subtrees.
    pub fn reset_values(&mut self, ctx: &mut RequestContext, ids: &NodeIdSet) -> ComponentResult {
        if ids.is_empty() {
            return Ok(());
        }
        let application = ctx.application().clone();
        let mut visit_context = application
            .visit_context_factory()
            .visit_context(Some(ids), VisitHints::new());
        visit_tree(self, visit_context.as_mut(), ctx, &mut ResetValuesCallback)?;
        Ok(())
    }
}

impl Component for ViewRoot {
    fn id(&self) -> &str {
        &self.id
    }

    fn client_id(&self) -> &str {
        &self.id
    }

    fn is_naming_container(&self) -> bool {
        self.naming_container
    }

    fn children(&self) -> &[Box<dyn Component>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Component>] {
        &mut self.children
    }

    fn facet(&self, name: &str) -> Option<&dyn Component> {
        self.facets.get(name).map(|facet| facet.as_ref())
    }

    fn facets_mut(&mut self) -> Vec<&mut Box<dyn Component>> {
        self.facets.values_mut().collect()
    }
}

struct ResetValuesCallback;

impl VisitCallback for ResetValuesCallback {
    fn visit(
        &mut self,
        _ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> Result<VisitResult, PartialError> {
        reset_subtree(component);
        Ok(VisitResult::Reject)
    }
}

fn reset_subtree(component: &mut dyn Component) {
    component.reset_value();
    for facet in component.facets_mut() {
        reset_subtree(facet.as_mut());
    }
    for child in component.children_mut() {
        reset_subtree(child.as_mut());
    }
}
