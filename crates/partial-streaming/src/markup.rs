//! Markup-level response writers.

use std::io::Write;

use partial_core::PartialError;

use crate::escape::{escape_attribute, escape_text};

/// Markup output used by components while encoding.
pub trait ResponseWriter {
    /// Content type this writer produces.
    fn content_type(&self) -> &str;

    /// Character encoding of the output.
    fn character_encoding(&self) -> &str;

    /// Open an element; attributes may follow until other content is written.
    fn start_element(&mut self, name: &str) -> Result<(), PartialError>;

    /// Add an attribute to the element opened last.
    fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), PartialError>;

    /// Close an element.
    fn end_element(&mut self, name: &str) -> Result<(), PartialError>;

    /// Write escaped character data.
    fn write_text(&mut self, text: &str) -> Result<(), PartialError>;

    /// Write markup as-is. The caller guarantees it is well formed.
    fn write(&mut self, raw: &str) -> Result<(), PartialError>;

    /// Flush buffered output to the transport.
    fn flush(&mut self) -> Result<(), PartialError>;
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for Box<W> {
    fn content_type(&self) -> &str {
        (**self).content_type()
    }

    fn character_encoding(&self) -> &str {
        (**self).character_encoding()
    }

    fn start_element(&mut self, name: &str) -> Result<(), PartialError> {
        (**self).start_element(name)
    }

    fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), PartialError> {
        (**self).write_attribute(name, value)
    }

    fn end_element(&mut self, name: &str) -> Result<(), PartialError> {
        (**self).end_element(name)
    }

    fn write_text(&mut self, text: &str) -> Result<(), PartialError> {
        (**self).write_text(text)
    }

    fn write(&mut self, raw: &str) -> Result<(), PartialError> {
        (**self).write(raw)
    }

    fn flush(&mut self) -> Result<(), PartialError> {
        (**self).flush()
    }
}

/// Plain markup writer over any byte stream.
pub struct MarkupWriter<W: Write> {
    out: W,
    content_type: String,
    character_encoding: String,
    start_tag_open: bool,
}

impl<W: Write> MarkupWriter<W> {
    /// Create a writer producing `content_type` in `character_encoding`.
    pub fn new(out: W, content_type: impl Into<String>, character_encoding: impl Into<String>) -> Self {
        Self {
            out,
            content_type: content_type.into(),
            character_encoding: character_encoding.into(),
            start_tag_open: false,
        }
    }

    fn close_start_tag(&mut self) -> Result<(), PartialError> {
        if self.start_tag_open {
            self.out.write_all(b">")?;
            self.start_tag_open = false;
        }
        Ok(())
    }

    /// Consume the writer and return the byte stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResponseWriter for MarkupWriter<W> {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn character_encoding(&self) -> &str {
        &self.character_encoding
    }

    fn start_element(&mut self, name: &str) -> Result<(), PartialError> {
        self.close_start_tag()?;
        write!(self.out, "<{}", name)?;
        self.start_tag_open = true;
        Ok(())
    }

    fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), PartialError> {
        if !self.start_tag_open {
            return Err(PartialError::protocol(format!(
                "attribute '{}' written outside of a start tag",
                name
            )));
        }
        write!(self.out, " {}=\"{}\"", name, escape_attribute(value))?;
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), PartialError> {
        self.close_start_tag()?;
        write!(self.out, "</{}>", name)?;
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), PartialError> {
        self.close_start_tag()?;
        self.out.write_all(escape_text(text).as_bytes())?;
        Ok(())
    }

    fn write(&mut self, raw: &str) -> Result<(), PartialError> {
        self.close_start_tag()?;
        self.out.write_all(raw.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PartialError> {
        self.close_start_tag()?;
        self.out.flush()?;
        Ok(())
    }
}
