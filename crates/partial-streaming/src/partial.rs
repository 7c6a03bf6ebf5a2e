//! Partial-response section protocol.

use partial_core::protocol::elements;
use partial_core::PartialError;

use crate::escape::guard_cdata;
use crate::markup::ResponseWriter;

const CDATA_START: &str = "<![CDATA[";
const CDATA_END: &str = "]]>";

/// Writer for a partial-response document.
///
/// A document holds a sequence of update and eval sections. Sections never
/// nest; content written between `start_*` and `end_*` forms the section body.
pub trait PartialResponseWriter: ResponseWriter {
    /// Open the document. `document_id` identifies the view.
    fn start_document(&mut self, document_id: Option<&str>) -> Result<(), PartialError>;

    /// Close the document.
    fn end_document(&mut self) -> Result<(), PartialError>;

    /// Open an update section replacing the fragment identified by `key`.
    fn start_update(&mut self, key: &str) -> Result<(), PartialError>;

    fn end_update(&mut self) -> Result<(), PartialError>;

    /// Open a section holding one script to evaluate.
    fn start_eval(&mut self) -> Result<(), PartialError>;

    fn end_eval(&mut self) -> Result<(), PartialError>;

    /// Tell the client to navigate to `url`.
    fn redirect(&mut self, url: &str) -> Result<(), PartialError>;

    /// Report a server-side error to the client.
    fn write_error(&mut self, name: &str, message: &str) -> Result<(), PartialError>;

    /// Write arbitrary text into the current section body.
    fn write_guarded(&mut self, text: &str) -> Result<(), PartialError> {
        self.write(&guard_cdata(text))
    }
}

impl<W: PartialResponseWriter + ?Sized> PartialResponseWriter for Box<W> {
    fn start_document(&mut self, document_id: Option<&str>) -> Result<(), PartialError> {
        (**self).start_document(document_id)
    }

    fn end_document(&mut self) -> Result<(), PartialError> {
        (**self).end_document()
    }

    fn start_update(&mut self, key: &str) -> Result<(), PartialError> {
        (**self).start_update(key)
    }

    fn end_update(&mut self) -> Result<(), PartialError> {
        (**self).end_update()
    }

    fn start_eval(&mut self) -> Result<(), PartialError> {
        (**self).start_eval()
    }

    fn end_eval(&mut self) -> Result<(), PartialError> {
        (**self).end_eval()
    }

    fn redirect(&mut self, url: &str) -> Result<(), PartialError> {
        (**self).redirect(url)
    }

    fn write_error(&mut self, name: &str, message: &str) -> Result<(), PartialError> {
        (**self).write_error(name, message)
    }

    fn write_guarded(&mut self, text: &str) -> Result<(), PartialError> {
        (**self).write_guarded(text)
    }
}

/// Section protocol over a plain markup writer.
///
/// Emits the partial-response elements around delegate writes and performs
/// no state checking of its own.
pub struct SectionAdapter<W: ResponseWriter> {
    inner: W,
    in_changes: bool,
}

impl<W: ResponseWriter> SectionAdapter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            in_changes: false,
        }
    }

    fn start_changes(&mut self) -> Result<(), PartialError> {
        if !self.in_changes {
            self.inner.start_element(elements::CHANGES)?;
            self.in_changes = true;
        }
        Ok(())
    }

    fn end_changes(&mut self) -> Result<(), PartialError> {
        if self.in_changes {
            self.inner.end_element(elements::CHANGES)?;
            self.in_changes = false;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: ResponseWriter> ResponseWriter for SectionAdapter<W> {
    fn content_type(&self) -> &str {
        self.inner.content_type()
    }

    fn character_encoding(&self) -> &str {
        self.inner.character_encoding()
    }

    fn start_element(&mut self, name: &str) -> Result<(), PartialError> {
        self.inner.start_element(name)
    }

    fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), PartialError> {
        self.inner.write_attribute(name, value)
    }

    fn end_element(&mut self, name: &str) -> Result<(), PartialError> {
        self.inner.end_element(name)
    }

    fn write_text(&mut self, text: &str) -> Result<(), PartialError> {
        self.inner.write_text(text)
    }

    fn write(&mut self, raw: &str) -> Result<(), PartialError> {
        self.inner.write(raw)
    }

    fn flush(&mut self) -> Result<(), PartialError> {
        self.inner.flush()
    }
}

impl<W: ResponseWriter> PartialResponseWriter for SectionAdapter<W> {
    fn start_document(&mut self, document_id: Option<&str>) -> Result<(), PartialError> {
        let declaration = format!(
            "<?xml version='1.0' encoding='{}'?>\n",
            self.inner.character_encoding()
        );
        self.inner.write(&declaration)?;
        self.inner.start_element(elements::PARTIAL_RESPONSE)?;
        if let Some(id) = document_id {
            self.inner.write_attribute("id", id)?;
        }
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), PartialError> {
        self.end_changes()?;
        self.inner.end_element(elements::PARTIAL_RESPONSE)
    }

    fn start_update(&mut self, key: &str) -> Result<(), PartialError> {
        self.start_changes()?;
        self.inner.start_element(elements::UPDATE)?;
        self.inner.write_attribute("id", key)?;
        self.inner.write(CDATA_START)
    }

    fn end_update(&mut self) -> Result<(), PartialError> {
        self.inner.write(CDATA_END)?;
        self.inner.end_element(elements::UPDATE)
    }

    fn start_eval(&mut self) -> Result<(), PartialError> {
        self.start_changes()?;
        self.inner.start_element(elements::EVAL)?;
        self.inner.write(CDATA_START)
    }

    fn end_eval(&mut self) -> Result<(), PartialError> {
        self.inner.write(CDATA_END)?;
        self.inner.end_element(elements::EVAL)
    }

    fn redirect(&mut self, url: &str) -> Result<(), PartialError> {
        self.end_changes()?;
        self.inner.start_element(elements::REDIRECT)?;
        self.inner.write_attribute("url", url)?;
        self.inner.end_element(elements::REDIRECT)
    }

    fn write_error(&mut self, name: &str, message: &str) -> Result<(), PartialError> {
        self.end_changes()?;
        self.inner.start_element(elements::ERROR)?;
        self.inner.start_element(elements::ERROR_NAME)?;
        self.inner.write_text(name)?;
        self.inner.end_element(elements::ERROR_NAME)?;
        self.inner.start_element(elements::ERROR_MESSAGE)?;
        self.inner.write(CDATA_START)?;
        self.inner.write(&guard_cdata(message))?;
        self.inner.write(CDATA_END)?;
        self.inner.end_element(elements::ERROR_MESSAGE)?;
        self.inner.end_element(elements::ERROR)
    }
}
