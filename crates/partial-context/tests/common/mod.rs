//! Component tree and collaborators shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::anyhow;
use partial_context::*;
use partial_observability::{RequestId, StructuredLogger};
use partial_streaming::{CreatedWriter, MarkupWriter, PartialResponseWriter};

/// Ordered record of lifecycle calls made on test nodes.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}

/// Component recording every hook it runs and rendering `<div id="..">`.
pub struct TestNode {
    id: String,
    client_id: String,
    rendered: bool,
    fail_validation: bool,
    children: Vec<Box<dyn Component>>,
    attributes: HashMap<String, String>,
    markup: Option<String>,
    journal: Journal,
}

impl TestNode {
    pub fn new(client_id: &str, journal: &Journal) -> Self {
        let id = client_id.rsplit(':').next().unwrap_or(client_id);
        Self {
            id: id.to_string(),
            client_id: client_id.to_string(),
            rendered: true,
            fail_validation: false,
            children: Vec::new(),
            attributes: HashMap::new(),
            markup: None,
            journal: Rc::clone(journal),
        }
    }

    pub fn child(mut self, child: TestNode) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn unrendered(mut self) -> Self {
        self.rendered = false;
        self
    }

    pub fn failing_validation(mut self) -> Self {
        self.fail_validation = true;
        self
    }

    pub fn attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Raw markup written instead of the default `<div>`.
    pub fn markup(mut self, markup: &str) -> Self {
        self.markup = Some(markup.to_string());
        self
    }

    fn record(&self, action: &str) {
        self.journal
            .borrow_mut()
            .push(format!("{}:{}", action, self.client_id));
    }
}

impl Component for TestNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn is_rendered(&self) -> bool {
        self.rendered
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn children(&self) -> &[Box<dyn Component>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Component>] {
        &mut self.children
    }

    fn decode(&mut self, _ctx: &mut RequestContext) -> ComponentResult {
        self.record("decode");
        Ok(())
    }

    fn validate(&mut self, _ctx: &mut RequestContext) -> ComponentResult {
        self.record("validate");
        if self.fail_validation {
            return Err(PartialError::Component(anyhow!(
                "validator rejected {}",
                self.client_id
            )));
        }
        Ok(())
    }

    fn update_model(&mut self, _ctx: &mut RequestContext) -> ComponentResult {
        self.record("update");
        Ok(())
    }

    fn reset_value(&mut self) {
        self.record("reset");
    }

    fn encode_begin(&mut self, ctx: &mut RequestContext) -> ComponentResult {
        self.record("encode");
        if let Some(name) = self.attributes.get("name") {
            let library = self.attributes.get("library").map(String::as_str);
            ctx.mark_resource_rendered(name, library);
        }
        let writer = ctx.response_writer()?;
        match &self.markup {
            Some(markup) => writer.write(markup),
            None => {
                writer.start_element("div")?;
                writer.write_attribute("id", &self.client_id)
            }
        }
    }

    fn encode_end(&mut self, ctx: &mut RequestContext) -> ComponentResult {
        if self.markup.is_none() {
            ctx.response_writer()?.end_element("div")?;
        }
        Ok(())
    }
}

/// State manager returning a fixed payload.
pub struct FixedState(pub &'static str);

impl StateManager for FixedState {
    fn view_state(&self, _ctx: &RequestContext, _view: &ViewRoot) -> Result<String, PartialError> {
        Ok(self.0.to_string())
    }
}

/// Flash counting its post-phase invocations.
pub struct CountingFlash(pub Rc<RefCell<usize>>);

impl Flash for CountingFlash {
    fn do_post_phase_actions(&mut self, _external: &ExternalContext) -> Result<(), PartialError> {
        *self.0.borrow_mut() += 1;
        Ok(())
    }
}

/// Output stream whose every write fails.
pub struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
    }
}

/// Render kit whose writers fail on the first write.
pub struct BrokenPipeKit;

impl RenderKit for BrokenPipeKit {
    fn id(&self) -> &str {
        "broken-pipe"
    }

    fn create_response_writer(
        &self,
        _out: Box<dyn Write>,
        content_type: &str,
        character_encoding: &str,
    ) -> CreatedWriter {
        CreatedWriter::Plain(Box::new(MarkupWriter::new(
            BrokenPipe,
            content_type,
            character_encoding,
        )))
    }
}

/// Writer speaking the section protocol itself, with bracketed markers in
/// place of the XML envelope.
pub struct BracketWriter {
    out: Box<dyn Write>,
    content_type: String,
    character_encoding: String,
}

impl BracketWriter {
    fn emit(&mut self, text: &str) -> Result<(), PartialError> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }
}

impl ResponseWriter for BracketWriter {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn character_encoding(&self) -> &str {
        &self.character_encoding
    }

    fn start_element(&mut self, name: &str) -> Result<(), PartialError> {
        self.emit(&format!("<{}>", name))
    }

    fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), PartialError> {
        self.emit(&format!("@{}={};", name, value))
    }

    fn end_element(&mut self, name: &str) -> Result<(), PartialError> {
        self.emit(&format!("</{}>", name))
    }

    fn write_text(&mut self, text: &str) -> Result<(), PartialError> {
        self.emit(text)
    }

    fn write(&mut self, raw: &str) -> Result<(), PartialError> {
        self.emit(raw)
    }

    fn flush(&mut self) -> Result<(), PartialError> {
        self.out.flush()?;
        Ok(())
    }
}

impl PartialResponseWriter for BracketWriter {
    fn start_document(&mut self, document_id: Option<&str>) -> Result<(), PartialError> {
        self.emit(&format!("[doc {}]", document_id.unwrap_or("-")))
    }

    fn end_document(&mut self) -> Result<(), PartialError> {
        self.emit("[/doc]")
    }

    fn start_update(&mut self, key: &str) -> Result<(), PartialError> {
        self.emit(&format!("[update {}]", key))
    }

    fn end_update(&mut self) -> Result<(), PartialError> {
        self.emit("[/update]")
    }

    fn start_eval(&mut self) -> Result<(), PartialError> {
        self.emit("[eval]")
    }

    fn end_eval(&mut self) -> Result<(), PartialError> {
        self.emit("[/eval]")
    }

    fn redirect(&mut self, url: &str) -> Result<(), PartialError> {
        self.emit(&format!("[redirect {}]", url))
    }

    fn write_error(&mut self, name: &str, message: &str) -> Result<(), PartialError> {
        self.emit(&format!("[error {} {}]", name, message))
    }
}

/// Render kit handing out [`BracketWriter`]s.
pub struct BracketKit;

impl RenderKit for BracketKit {
    fn id(&self) -> &str {
        "bracket"
    }

    fn create_response_writer(
        &self,
        out: Box<dyn Write>,
        content_type: &str,
        character_encoding: &str,
    ) -> CreatedWriter {
        CreatedWriter::Partial(Box::new(BracketWriter {
            out,
            content_type: content_type.to_string(),
            character_encoding: character_encoding.to_string(),
        }))
    }
}

pub fn application() -> Arc<Application> {
    Arc::new(Application::new(FixedState("STATE")))
}

pub fn partial_request() -> HttpRequest {
    HttpRequest::new().with_header("Faces-Request", "partial/ajax")
}

/// Request context with a capturing logger.
pub fn context(request: HttpRequest, application: Arc<Application>) -> RequestContext {
    let logger = StructuredLogger::new(RequestId::from_string("test")).with_capture();
    RequestContext::with_logger(ExternalContext::new(request), application, logger)
}

/// `view` root with a form holding two inputs, plus a panel pair.
pub fn sample_view(journal: &Journal) -> ViewRoot {
    ViewRoot::new("view")
        .with_child(
            TestNode::new("form", journal)
                .child(TestNode::new("form:input1", journal))
                .child(TestNode::new("form:input2", journal)),
        )
        .with_child(TestNode::new("panelA", journal).child(TestNode::new("panelA:text", journal)))
        .with_child(TestNode::new("panelB", journal))
}

/// Contents of every `<update>` section, keyed by section id, in order.
pub fn updates(body: &str) -> Vec<(String, String)> {
    let mut sections = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("<update id=\"") {
        rest = &rest[start + "<update id=\"".len()..];
        let Some(quote) = rest.find('"') else { break };
        let key = rest[..quote].to_string();
        let Some(end) = rest.find("</update>") else { break };
        let content = read_cdata(&rest[quote + 2..end]);
        sections.push((key, content));
        rest = &rest[end..];
    }
    sections
}

/// Decode a sequence of adjacent CDATA blocks.
pub fn read_cdata(mut raw: &str) -> String {
    let mut text = String::new();
    while let Some(start) = raw.find("<![CDATA[") {
        raw = &raw[start + "<![CDATA[".len()..];
        let Some(end) = raw.find("]]>") else { break };
        text.push_str(&raw[..end]);
        raw = &raw[end + "]]>".len()..];
    }
    text
}
