//! Writer construction for rendering backends.

use std::io::Write;

use crate::markup::{MarkupWriter, ResponseWriter};
use crate::partial::PartialResponseWriter;

/// Writer produced by a render kit.
pub enum CreatedWriter {
    /// The backend speaks the partial-response protocol natively.
    Partial(Box<dyn PartialResponseWriter>),
    /// A plain markup writer; the caller supplies the section protocol.
    Plain(Box<dyn ResponseWriter>),
}

/// Rendering backend able to create response writers.
pub trait RenderKit: Send + Sync {
    /// Identifier of the kit.
    fn id(&self) -> &str;

    /// Create a writer over `out`.
    fn create_response_writer(
        &self,
        out: Box<dyn Write>,
        content_type: &str,
        character_encoding: &str,
    ) -> CreatedWriter;
}

/// Basic markup render kit producing plain [`MarkupWriter`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupRenderKit;

impl RenderKit for MarkupRenderKit {
    fn id(&self) -> &str {
        "markup"
    }

    fn create_response_writer(
        &self,
        out: Box<dyn Write>,
        content_type: &str,
        character_encoding: &str,
    ) -> CreatedWriter {
        CreatedWriter::Plain(Box::new(MarkupWriter::new(
            out,
            content_type,
            character_encoding,
        )))
    }
}
