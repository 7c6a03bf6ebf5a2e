//! Core abstractions for the partial-update request lifecycle.
//!
//! This crate provides the fundamental types shared by every layer:
//! - `PartialConfig` - Header/parameter names and writer settings
//! - `HttpRequest` / `HttpResponse` / `ExternalContext` - Request-scoped I/O
//! - `PhaseId` / `TimingContext` - Lifecycle phases and timing
//! - `NodeIdSet` - Ordered client-id sets with the `@all` sentinel
//! - `PartialError` - Error taxonomy

mod config;
mod context;
mod error;
mod ids;
mod lifecycle;
pub mod protocol;

pub use config::*;
pub use context::*;
pub use error::*;
pub use ids::*;
pub use lifecycle::*;
