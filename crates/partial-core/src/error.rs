//! Error types for partial request processing.

use thiserror::Error;

use crate::lifecycle::PhaseId;

/// Errors raised while classifying, processing or streaming a partial
/// request.
#[derive(Error, Debug)]
pub enum PartialError {
    /// The partial view context was used after `release()`.
    #[error("Partial view context used after release")]
    Released,

    /// Phase dispatch received a phase it has no action for.
    #[error("Unexpected phase {0} passed to partial phase dispatch")]
    UnexpectedPhase(PhaseId),

    /// The section protocol of the response writer was violated.
    #[error("Partial response protocol violation: {0}")]
    Protocol(String),

    /// Writing to the response transport failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A component implementation failed.
    #[error("Component error: {0}")]
    Component(#[from] anyhow::Error),

    /// Processing a matched node failed; aborts the traversal.
    #[error("Processing '{client_id}' during {phase} failed: {source}")]
    Processing {
        phase: PhaseId,
        client_id: String,
        #[source]
        source: Box<PartialError>,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PartialError {
    /// Build a protocol violation error.
    pub fn protocol(message: impl Into<String>) -> Self {
        PartialError::Protocol(message.into())
    }

    /// Wrap a node failure. Already wrapped failures pass through unchanged.
    pub fn processing(phase: PhaseId, client_id: impl Into<String>, source: PartialError) -> Self {
        match source {
            wrapped @ PartialError::Processing { .. } => wrapped,
            other => PartialError::Processing {
                phase,
                client_id: client_id.into(),
                source: Box::new(other),
            },
        }
    }

    /// Whether this is a transport failure raised directly by a write.
    pub fn is_io(&self) -> bool {
        matches!(self, PartialError::Io(_))
    }
}
