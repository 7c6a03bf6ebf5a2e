//! Section-oriented writers for partial responses.
//!
//! This crate enforces the partial-response protocol:
//! - `ResponseWriter` / `MarkupWriter` - Markup-level output
//! - `PartialResponseWriter` - Update/eval sections inside one document
//! - `SectionAdapter` - Section protocol on top of any markup writer
//! - `DeferredPartialWriter` - Checked section state, binds the transport on first write
//! - `RenderKit` - Writer construction for a rendering backend
//! - `FlushController` - Explicit flush control

mod deferred;
pub mod escape;
mod flush;
mod markup;
mod partial;
mod render_kit;

pub use deferred::*;
pub use flush::*;
pub use markup::*;
pub use partial::*;
pub use render_kit::*;
