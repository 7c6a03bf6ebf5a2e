//! Partial response writer that binds the transport on first write.

use std::io;
use std::sync::Arc;

use partial_core::{FlushMode, HttpResponse, PartialError, TimingContext};
use partial_observability::StructuredLogger;

use crate::flush::FlushController;
use crate::markup::{MarkupWriter, ResponseWriter};
use crate::partial::{PartialResponseWriter, SectionAdapter};
use crate::render_kit::{CreatedWriter, RenderKit};

/// How the writer configures the transport once it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterDescriptor {
    /// Response content type.
    pub content_type: String,
    /// Response character encoding.
    pub character_encoding: String,
    /// Response buffer size (bytes).
    pub buffer_size: usize,
    /// Flush behaviour.
    pub flush: FlushMode,
}

/// Section state of the document being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    /// Document not started yet.
    Initial,
    /// Document open, no section open.
    DocumentStarted,
    /// Inside an update section.
    InUpdate(String),
    /// Inside an eval section.
    InEval,
    /// A redirect or error was written; only `end_document` remains.
    Finished,
    /// Document ended.
    Completed,
}

/// Section kind reported by [`DeferredPartialWriter::open_section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Update,
    Eval,
}

/// Checked partial response writer with deferred transport binding.
///
/// Construction has no side effects. The transport is configured and the
/// backend writer created on the first write attempt. If the response is
/// already committed at that point, a warning is logged and the writer binds
/// to a null sink: later writes succeed and are discarded.
///
/// Every section call is checked: one `start_document`, no nested or
/// interleaved sections, and `end_document` only with all sections closed.
pub struct DeferredPartialWriter {
    descriptor: WriterDescriptor,
    response: HttpResponse,
    render_kit: Arc<dyn RenderKit>,
    logger: StructuredLogger,
    bound: Option<Box<dyn PartialResponseWriter>>,
    detached: bool,
    state: StreamState,
    timing: TimingContext,
    flush: FlushController,
    sections_sent: Vec<String>,
}

impl DeferredPartialWriter {
    /// Describe a writer; nothing is acquired until the first write.
    pub fn new(
        descriptor: WriterDescriptor,
        response: HttpResponse,
        render_kit: Arc<dyn RenderKit>,
        logger: StructuredLogger,
    ) -> Self {
        let flush = FlushController::new(descriptor.flush);
        Self {
            descriptor,
            response,
            render_kit,
            logger,
            bound: None,
            detached: false,
            state: StreamState::Initial,
            timing: TimingContext::new(),
            flush,
            sections_sent: Vec::new(),
        }
    }

    /// Bind the transport if not yet bound and return the backend writer.
    pub fn ensure_bound(&mut self) -> &mut dyn PartialResponseWriter {
        let writer = match self.bound.take() {
            Some(writer) => writer,
            None => self.bind(),
        };
        &mut **self.bound.insert(writer)
    }

    fn bind(&mut self) -> Box<dyn PartialResponseWriter> {
        if self.response.is_committed() {
            self.logger
                .warn("Response is already committed - cannot reconfigure it anymore");
            self.detached = true;
            return Box::new(SectionAdapter::new(MarkupWriter::new(
                io::sink(),
                self.descriptor.content_type.clone(),
                self.descriptor.character_encoding.clone(),
            )));
        }

        self.response.set_content_type(&self.descriptor.content_type);
        self.response
            .set_character_encoding(&self.descriptor.character_encoding);
        self.response.set_buffer_size(self.descriptor.buffer_size);

        let out = self.response.output_writer();
        let created = self.render_kit.create_response_writer(
            Box::new(out),
            &self.descriptor.content_type,
            &self.descriptor.character_encoding,
        );

        self.logger
            .debug_builder("Partial response writer bound")
            .field("render_kit", self.render_kit.id())
            .field("encoding", self.descriptor.character_encoding.clone())
            .emit();

        match created {
            CreatedWriter::Partial(writer) => writer,
            CreatedWriter::Plain(writer) => Box::new(SectionAdapter::new(writer)),
        }
    }

    /// Whether the transport has been bound.
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Whether the writer is bound to a null sink.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Kind of the section currently open.
    pub fn open_section(&self) -> Option<SectionKind> {
        match self.state {
            StreamState::InUpdate(_) => Some(SectionKind::Update),
            StreamState::InEval => Some(SectionKind::Eval),
            _ => None,
        }
    }

    /// Keys of the closed sections, in order (`eval` for eval sections).
    pub fn sections_sent(&self) -> &[String] {
        &self.sections_sent
    }

    /// Get timing context reference.
    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }

    /// Flush statistics.
    pub fn flush_controller(&self) -> &FlushController {
        &self.flush
    }

    fn require_open_document(&self, operation: &str) -> Result<(), PartialError> {
        match &self.state {
            StreamState::DocumentStarted => Ok(()),
            StreamState::Initial => Err(PartialError::protocol(format!(
                "{} before start_document",
                operation
            ))),
            StreamState::InUpdate(key) => Err(PartialError::protocol(format!(
                "{} while update section '{}' is open",
                operation, key
            ))),
            StreamState::InEval => Err(PartialError::protocol(format!(
                "{} while an eval section is open",
                operation
            ))),
            StreamState::Finished => Err(PartialError::protocol(format!(
                "{} after a redirect or error",
                operation
            ))),
            StreamState::Completed => Err(PartialError::protocol(format!(
                "{} after end_document",
                operation
            ))),
        }
    }

    fn section_closed(&mut self, key: String) -> Result<(), PartialError> {
        self.timing.mark_section_sent(&key);
        self.sections_sent.push(key);
        self.state = StreamState::DocumentStarted;
        if self.flush.flush_after_section() {
            self.flush_now()?;
        }
        Ok(())
    }

    fn flush_now(&mut self) -> Result<(), PartialError> {
        self.ensure_bound().flush()?;
        self.flush.reset();
        Ok(())
    }
}

impl ResponseWriter for DeferredPartialWriter {
    fn content_type(&self) -> &str {
        &self.descriptor.content_type
    }

    fn character_encoding(&self) -> &str {
        &self.descriptor.character_encoding
    }

    fn start_element(&mut self, name: &str) -> Result<(), PartialError> {
        self.ensure_bound().start_element(name)
    }

    fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), PartialError> {
        self.ensure_bound().write_attribute(name, value)
    }

    fn end_element(&mut self, name: &str) -> Result<(), PartialError> {
        self.ensure_bound().end_element(name)
    }

    fn write_text(&mut self, text: &str) -> Result<(), PartialError> {
        self.ensure_bound().write_text(text)?;
        self.flush.add_bytes(text.len());
        Ok(())
    }

    fn write(&mut self, raw: &str) -> Result<(), PartialError> {
        self.ensure_bound().write(raw)?;
        self.flush.add_bytes(raw.len());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PartialError> {
        self.flush_now()
    }
}

impl PartialResponseWriter for DeferredPartialWriter {
    fn start_document(&mut self, document_id: Option<&str>) -> Result<(), PartialError> {
        if self.state != StreamState::Initial {
            return Err(PartialError::protocol("document already started"));
        }
        self.timing.mark("document_start");
        self.ensure_bound().start_document(document_id)?;
        self.state = StreamState::DocumentStarted;
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), PartialError> {
        if self.state != StreamState::Finished {
            self.require_open_document("end_document")?;
        }
        self.ensure_bound().end_document()?;
        self.state = StreamState::Completed;
        self.timing.mark("complete");
        if self.flush.flush_at_end() {
            self.flush_now()?;
        }
        Ok(())
    }

    fn start_update(&mut self, key: &str) -> Result<(), PartialError> {
        self.require_open_document("start_update")?;
        self.timing.mark_section_start(key);
        self.ensure_bound().start_update(key)?;
        self.state = StreamState::InUpdate(key.to_string());
        Ok(())
    }

    fn end_update(&mut self) -> Result<(), PartialError> {
        let key = match &self.state {
            StreamState::InUpdate(key) => key.clone(),
            _ => return Err(PartialError::protocol("end_update without an open update section")),
        };
        self.ensure_bound().end_update()?;
        self.section_closed(key)
    }

    fn start_eval(&mut self) -> Result<(), PartialError> {
        self.require_open_document("start_eval")?;
        self.timing.mark_section_start("eval");
        self.ensure_bound().start_eval()?;
        self.state = StreamState::InEval;
        Ok(())
    }

    fn end_eval(&mut self) -> Result<(), PartialError> {
        if self.state != StreamState::InEval {
            return Err(PartialError::protocol("end_eval without an open eval section"));
        }
        self.ensure_bound().end_eval()?;
        self.section_closed("eval".to_string())
    }

    fn redirect(&mut self, url: &str) -> Result<(), PartialError> {
        self.require_open_document("redirect")?;
        self.ensure_bound().redirect(url)?;
        self.state = StreamState::Finished;
        Ok(())
    }

    fn write_error(&mut self, name: &str, message: &str) -> Result<(), PartialError> {
        self.require_open_document("write_error")?;
        self.ensure_bound().write_error(name, message)?;
        self.state = StreamState::Finished;
        Ok(())
    }

    fn write_guarded(&mut self, text: &str) -> Result<(), PartialError> {
        self.ensure_bound().write_guarded(text)?;
        self.flush.add_bytes(text.len());
        Ok(())
    }
}
