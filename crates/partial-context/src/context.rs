//! Per-request state threaded through every phase.

use std::collections::HashSet;
use std::mem;
use std::sync::Arc;

use partial_core::{ExternalContext, PartialError, PhaseId, RequestId};
use partial_observability::StructuredLogger;
use partial_streaming::{DeferredPartialWriter, ResponseWriter};

use crate::application::Application;
use crate::component::ViewRoot;
use crate::partial_view::PartialViewContext;

/// Flash scope hooks run at the end of a partial render.
pub trait Flash {
    fn do_post_phase_actions(&mut self, external: &ExternalContext) -> Result<(), PartialError>;
}

/// Writer the components currently render into.
enum ActiveWriter {
    Unset,
    Writer(Box<dyn ResponseWriter>),
    Partial,
}

/// Request context: transport, application, partial view state and the
/// active response writer.
pub struct RequestContext {
    external: ExternalContext,
    application: Arc<Application>,
    partial: PartialViewContext,
    logger: StructuredLogger,
    writer: ActiveWriter,
    saved_writer: Option<ActiveWriter>,
    flash: Option<Box<dyn Flash>>,
    rendered_resources: HashSet<(String, Option<String>)>,
    view_state_counter: u32,
    client_window_counter: u32,
}

impl RequestContext {
    pub fn new(external: ExternalContext, application: Arc<Application>) -> Self {
        let logger = StructuredLogger::new(RequestId::generate());
        Self::with_logger(external, application, logger)
    }

    /// Create a context logging through `logger`.
    pub fn with_logger(
        external: ExternalContext,
        application: Arc<Application>,
        logger: StructuredLogger,
    ) -> Self {
        let partial = PartialViewContext::new(&external, &application, logger.clone());
        Self {
            external,
            application,
            partial,
            logger,
            writer: ActiveWriter::Unset,
            saved_writer: None,
            flash: None,
            rendered_resources: HashSet::new(),
            view_state_counter: 0,
            client_window_counter: 0,
        }
    }

    pub fn with_flash(mut self, flash: impl Flash + 'static) -> Self {
        self.flash = Some(Box::new(flash));
        self
    }

    pub fn external(&self) -> &ExternalContext {
        &self.external
    }

    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Record the phase being run; log entries carry it from now on.
    pub fn set_phase(&mut self, phase: PhaseId) {
        self.logger.set_phase(Some(phase));
    }

    pub fn partial_view_context(&self) -> &PartialViewContext {
        &self.partial
    }

    pub fn partial_view_context_mut(&mut self) -> &mut PartialViewContext {
        &mut self.partial
    }

    /// The partial response writer of this request.
    pub fn partial_writer(&mut self) -> Result<&mut DeferredPartialWriter, PartialError> {
        self.partial.partial_response_writer()
    }

    /// Writer components should render into.
    pub fn response_writer(&mut self) -> Result<&mut dyn ResponseWriter, PartialError> {
        match &mut self.writer {
            ActiveWriter::Writer(writer) => Ok(&mut **writer),
            ActiveWriter::Partial => {
                let writer: &mut dyn ResponseWriter = self.partial.partial_response_writer()?;
                Ok(writer)
            }
            ActiveWriter::Unset => Err(PartialError::protocol("no response writer installed")),
        }
    }

    /// Install a plain response writer.
    pub fn set_response_writer(&mut self, writer: Box<dyn ResponseWriter>) {
        self.writer = ActiveWriter::Writer(writer);
    }

    /// Make the partial response writer the active writer.
    pub fn install_partial_writer(&mut self) -> Result<(), PartialError> {
        self.partial.partial_response_writer()?;
        self.writer = ActiveWriter::Partial;
        Ok(())
    }

    pub fn is_partial_writer_installed(&self) -> bool {
        matches!(self.writer, ActiveWriter::Partial)
    }

    pub fn has_response_writer(&self) -> bool {
        !matches!(self.writer, ActiveWriter::Unset)
    }

    /// Remember the active writer and install the partial writer in its
    /// place.
    pub(crate) fn save_and_install_partial_writer(&mut self) -> Result<(), PartialError> {
        self.partial.partial_response_writer()?;
        let previous = mem::replace(&mut self.writer, ActiveWriter::Partial);
        self.saved_writer = Some(previous);
        Ok(())
    }

    /// Put back the writer saved by `save_and_install_partial_writer`.
    pub(crate) fn restore_saved_writer(&mut self) {
        if let Some(previous) = self.saved_writer.take() {
            self.writer = previous;
        }
    }

    /// Record that a resource was written to the response.
    pub fn mark_resource_rendered(&mut self, name: &str, library: Option<&str>) {
        self.rendered_resources
            .insert((name.to_string(), library.map(str::to_string)));
    }

    pub fn is_resource_rendered(&self, name: &str, library: Option<&str>) -> bool {
        self.rendered_resources
            .contains(&(name.to_string(), library.map(str::to_string)))
    }

    /// Key of the next view-state section written by this request.
    pub fn next_view_state_id(&mut self, view: &ViewRoot) -> String {
        let counter = self.view_state_counter;
        self.view_state_counter += 1;
        view.view_state_id(self.application.config().separator, counter)
    }

    /// Key of the next client-window section written by this request.
    pub fn next_client_window_id(&mut self, view: &ViewRoot) -> String {
        let counter = self.client_window_counter;
        self.client_window_counter += 1;
        view.client_window_id(self.application.config().separator, counter)
    }

    pub(crate) fn do_flash_post_phase_actions(&mut self) -> Result<(), PartialError> {
        match self.flash.as_mut() {
            Some(flash) => flash.do_post_phase_actions(&self.external),
            None => {
                self.logger.trace("Flash unavailable, skipping post-phase actions");
                Ok(())
            }
        }
    }

    /// Drop the per-request partial state.
    pub fn release(&mut self) {
        self.partial.release();
    }
}
