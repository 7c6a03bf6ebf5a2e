//! Partial view context for the partial-update lifecycle.
//!
//! Given a request flagged as partial, this crate decides which parts of the
//! component tree to execute and render, runs the lifecycle phases over only
//! those parts and streams a partial-response document:
//!
//! - `PartialViewContext` - Request classification and execute/render id sets
//! - `visit` - Scoped tree traversal with early termination
//! - `process_components` - Phase-aware processing of matched nodes
//! - `process_partial` - Per-phase orchestration and partial rendering
//!
//! # Example
//!
//! ```rust,ignore
//! use partial_context::*;
//!
//! let external = ExternalContext::new(
//!     HttpRequest::new()
//!         .with_header("Faces-Request", "partial/ajax")
//!         .with_param("jakarta.faces.partial.execute", "form:name")
//!         .with_param("jakarta.faces.partial.render", "form:greeting"),
//! );
//! let mut ctx = RequestContext::new(external, application);
//!
//! for phase in PhaseId::ALL {
//!     process_partial(&mut ctx, &mut view, phase)?;
//! }
//! ctx.release();
//! ```

mod application;
mod component;
mod context;
mod orchestrator;
mod partial_view;
mod processing;
pub mod visit;

pub use application::*;
pub use component::*;
pub use context::*;
pub use orchestrator::*;
pub use partial_view::*;
pub use processing::*;

pub use partial_core::{
    protocol, ClientWindow, ExternalContext, HttpRequest, HttpResponse, NodeIdSet, PartialConfig,
    PartialError, PhaseId,
};
pub use partial_streaming::{
    DeferredPartialWriter, PartialResponseWriter, RenderKit, ResponseWriter,
};
