//! Public SDK for the partial-update lifecycle.
//!
//! This crate re-exports all partial lifecycle functionality:
//!
//! ```ignore
//! use partial_sdk::prelude::*;
//!
//! struct Greeting;
//!
//! impl Component for Greeting {
//!     fn id(&self) -> &str { "greeting" }
//!     fn client_id(&self) -> &str { "form:greeting" }
//!
//!     fn encode_begin(&mut self, ctx: &mut RequestContext) -> ComponentResult {
//!         let writer = ctx.response_writer()?;
//!         writer.start_element("span")?;
//!         writer.write_text("Hello")?;
//!         writer.end_element("span")
//!     }
//! }
//!
//! let application = Arc::new(Application::new(my_state_manager));
//! let mut ctx = RequestContext::new(ExternalContext::new(request), application);
//! for phase in PhaseId::ALL {
//!     process_partial(&mut ctx, &mut view, phase)?;
//! }
//! ctx.release();
//! ```

pub use partial_context;
pub use partial_core;
pub use partial_observability;
pub use partial_streaming;

/// Prelude for convenient imports.
pub mod prelude {
    pub use partial_context::*;
    pub use partial_core::*;
    pub use partial_observability::*;
    pub use partial_streaming::*;
    pub use std::sync::Arc;
}
