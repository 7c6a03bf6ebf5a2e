//! Tree traversal scoped to a set of client ids.

use std::collections::HashSet;

use indexmap::IndexSet;

use partial_core::{NodeIdSet, PartialError};

use crate::component::Component;
use crate::context::RequestContext;

/// Hints narrowing a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitHint {
    /// Do not visit nodes that are not rendered, nor their subtrees.
    SkipUnrendered,
    /// The traversal runs a lifecycle phase.
    ExecuteLifecycle,
}

pub type VisitHints = HashSet<VisitHint>;

/// Outcome of visiting one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitResult {
    /// Continue into the node's subtree.
    Accept,
    /// The node is handled; skip its subtree.
    Reject,
    /// Stop the whole traversal.
    Complete,
}

/// Work performed on each visited node.
pub trait VisitCallback {
    fn visit(
        &mut self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> Result<VisitResult, PartialError>;
}

/// Diagnostic capability: ids a traversal was asked for but never reached.
pub trait UnvisitedIds {
    fn unvisited_client_ids(&self) -> Vec<String>;
}

/// Decides which nodes a traversal hands to the callback.
pub trait VisitContext {
    fn hints(&self) -> &VisitHints;

    /// Ids targeted by the traversal; `None` targets every node.
    fn id_set(&self) -> Option<&NodeIdSet>;

    fn invoke_visit_callback(
        &mut self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
        callback: &mut dyn VisitCallback,
    ) -> Result<VisitResult, PartialError>;

    /// Unvisited-ids diagnostics, for contexts that track them.
    fn unvisited(&self) -> Option<&dyn UnvisitedIds> {
        None
    }
}

/// Creates visit contexts for the application.
pub trait VisitContextFactory: Send + Sync {
    fn visit_context(&self, ids: Option<&NodeIdSet>, hints: VisitHints) -> Box<dyn VisitContext>;
}

/// Full traversal when the id set is absent or holds `@all`, scoped
/// traversal otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultVisitContextFactory;

impl VisitContextFactory for DefaultVisitContextFactory {
    fn visit_context(&self, ids: Option<&NodeIdSet>, hints: VisitHints) -> Box<dyn VisitContext> {
        match ids {
            Some(ids) if !ids.is_all() => Box::new(PartialVisitContext::new(ids.clone(), hints)),
            _ => Box::new(FullVisitContext::new(hints)),
        }
    }
}

/// Hands every node to the callback.
#[derive(Debug, Clone, Default)]
pub struct FullVisitContext {
    hints: VisitHints,
}

impl FullVisitContext {
    pub fn new(hints: VisitHints) -> Self {
        Self { hints }
    }
}

impl VisitContext for FullVisitContext {
    fn hints(&self) -> &VisitHints {
        &self.hints
    }

    fn id_set(&self) -> Option<&NodeIdSet> {
        None
    }

    fn invoke_visit_callback(
        &mut self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
        callback: &mut dyn VisitCallback,
    ) -> Result<VisitResult, PartialError> {
        callback.visit(ctx, component)
    }
}

/// Hands only the listed nodes to the callback and completes once all of
/// them have been visited.
#[derive(Debug, Clone)]
pub struct PartialVisitContext {
    hints: VisitHints,
    ids: NodeIdSet,
    unvisited: IndexSet<String>,
}

impl PartialVisitContext {
    pub fn new(ids: NodeIdSet, hints: VisitHints) -> Self {
        let unvisited = ids.iter().map(str::to_string).collect();
        Self {
            hints,
            ids,
            unvisited,
        }
    }
}

impl VisitContext for PartialVisitContext {
    fn hints(&self) -> &VisitHints {
        &self.hints
    }

    fn id_set(&self) -> Option<&NodeIdSet> {
        Some(&self.ids)
    }

    fn invoke_visit_callback(
        &mut self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
        callback: &mut dyn VisitCallback,
    ) -> Result<VisitResult, PartialError> {
        if self.unvisited.is_empty() {
            return Ok(VisitResult::Complete);
        }
        if !self.ids.contains(component.client_id()) {
            return Ok(VisitResult::Accept);
        }

        self.unvisited.shift_remove(component.client_id());
        let result = callback.visit(ctx, component)?;

        if self.unvisited.is_empty() {
            Ok(VisitResult::Complete)
        } else {
            Ok(result)
        }
    }

    fn unvisited(&self) -> Option<&dyn UnvisitedIds> {
        Some(self)
    }
}

impl UnvisitedIds for PartialVisitContext {
    fn unvisited_client_ids(&self) -> Vec<String> {
        self.unvisited.iter().cloned().collect()
    }
}

/// Walk `component` and its subtree (facets first, then children).
///
/// Returns `true` when the traversal completed early.
pub fn visit_tree(
    component: &mut dyn Component,
    visit_context: &mut dyn VisitContext,
    ctx: &mut RequestContext,
    callback: &mut dyn VisitCallback,
) -> Result<bool, PartialError> {
    if visit_context.hints().contains(&VisitHint::SkipUnrendered) && !component.is_rendered() {
        return Ok(false);
    }

    match visit_context.invoke_visit_callback(ctx, component, callback)? {
        VisitResult::Complete => Ok(true),
        VisitResult::Reject => Ok(false),
        VisitResult::Accept => {
            for facet in component.facets_mut() {
                if visit_tree(facet.as_mut(), visit_context, ctx, callback)? {
                    return Ok(true);
                }
            }
            for child in component.children_mut() {
                if visit_tree(child.as_mut(), visit_context, ctx, callback)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}
