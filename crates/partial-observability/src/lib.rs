//! Observability for the partial-update lifecycle.
//!
//! This crate provides:
//! - `StructuredLogger` - Request-scoped structured logging, emitted through `tracing`
//! - `LogBuilder` - Fluent construction of entries with fields

mod logging;

pub use logging::*;

// Re-export RequestId and TimingContext from partial-core for convenience
pub use partial_core::{RequestId, TimingContext};
