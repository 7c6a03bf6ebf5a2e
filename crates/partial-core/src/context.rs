//! Request-scoped transport: inbound request, outbound response.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use http::header::{HeaderMap, HeaderName, HeaderValue};

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        use std::sync::atomic::{AtomicU32, Ordering};

        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let id = format!(
            "{:x}-{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        Self(id)
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request parameters (decoded form/query values).
pub type RequestParams = HashMap<String, String>;

/// Inbound request as seen by the partial lifecycle.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    /// Request headers.
    pub headers: HeaderMap,
    /// Request parameters.
    pub params: RequestParams,
    /// Declared character encoding, if any.
    pub character_encoding: Option<String>,
}

impl HttpRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header. Names or values that are not valid HTTP are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add a request parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the request character encoding.
    pub fn with_character_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.character_encoding = Some(encoding.into());
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get a request parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }
}

#[derive(Debug, Default)]
struct ResponseState {
    content_type: Option<String>,
    character_encoding: Option<String>,
    buffer_size: usize,
    headers: HeaderMap,
    body: Vec<u8>,
    committed: bool,
    output_acquired: bool,
}

/// Shared handle to the outbound response.
///
/// Configuration calls made after the response is committed are ignored,
/// as a servlet container would.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    inner: Rc<RefCell<ResponseState>>,
}

impl HttpResponse {
    /// Create an empty, uncommitted response.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_content_type(&self, content_type: &str) {
        let mut state = self.inner.borrow_mut();
        if !state.committed {
            state.content_type = Some(content_type.to_string());
        }
    }

    pub fn content_type(&self) -> Option<String> {
        self.inner.borrow().content_type.clone()
    }

    pub fn set_character_encoding(&self, encoding: &str) {
        let mut state = self.inner.borrow_mut();
        if !state.committed {
            state.character_encoding = Some(encoding.to_string());
        }
    }

    pub fn character_encoding(&self) -> Option<String> {
        self.inner.borrow().character_encoding.clone()
    }

    pub fn set_buffer_size(&self, bytes: usize) {
        let mut state = self.inner.borrow_mut();
        if !state.committed {
            state.buffer_size = bytes;
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.inner.borrow().buffer_size
    }

    /// Add a response header. Invalid names or values are ignored.
    pub fn add_header(&self, name: &str, value: &str) {
        let mut state = self.inner.borrow_mut();
        if state.committed {
            return;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            state.headers.append(name, value);
        }
    }

    /// First value of a response header.
    pub fn header(&self, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Whether bytes have reached the client.
    pub fn is_committed(&self) -> bool {
        self.inner.borrow().committed
    }

    /// Mark the response committed without writing.
    pub fn commit(&self) {
        self.inner.borrow_mut().committed = true;
    }

    /// Whether the output stream has been handed out.
    pub fn is_output_acquired(&self) -> bool {
        self.inner.borrow().output_acquired
    }

    /// Open the output stream, buffered up to the configured buffer size.
    pub fn output_writer(&self) -> ResponseOutput {
        let mut state = self.inner.borrow_mut();
        state.output_acquired = true;
        ResponseOutput {
            response: self.clone(),
            buffer: Vec::with_capacity(state.buffer_size),
            capacity: state.buffer_size,
        }
    }

    /// Bytes flushed to the client so far.
    pub fn body(&self) -> Vec<u8> {
        self.inner.borrow().body.clone()
    }

    /// Flushed body decoded as UTF-8 (lossy).
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.inner.borrow().body).into_owned()
    }

    fn push_body(&self, bytes: &[u8]) {
        let mut state = self.inner.borrow_mut();
        state.body.extend_from_slice(bytes);
        state.committed = true;
    }
}

/// Buffered output stream of an [`HttpResponse`].
///
/// Bytes reach the response body (and commit it) once the buffer fills or on
/// `flush`.
#[derive(Debug)]
pub struct ResponseOutput {
    response: HttpResponse,
    buffer: Vec<u8>,
    capacity: usize,
}

impl Write for ResponseOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        if self.buffer.len() >= self.capacity.max(1) {
            self.flush()?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.response.push_body(&self.buffer);
            self.buffer.clear();
        }
        Ok(())
    }
}

impl Drop for ResponseOutput {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Identity of the browser window issuing the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientWindow {
    id: String,
}

impl ClientWindow {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Request-scoped view of the transport.
#[derive(Debug, Clone)]
pub struct ExternalContext {
    request: Rc<HttpRequest>,
    response: HttpResponse,
    client_window: Option<ClientWindow>,
}

impl ExternalContext {
    /// Create a context over a request and a fresh response.
    pub fn new(request: HttpRequest) -> Self {
        Self {
            request: Rc::new(request),
            response: HttpResponse::new(),
            client_window: None,
        }
    }

    /// Use an existing response handle.
    pub fn with_response(mut self, response: HttpResponse) -> Self {
        self.response = response;
        self
    }

    /// Attach the active client window.
    pub fn with_client_window(mut self, window: ClientWindow) -> Self {
        self.client_window = Some(window);
        self
    }

    pub fn request(&self) -> &Rc<HttpRequest> {
        &self.request
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn client_window(&self) -> Option<&ClientWindow> {
        self.client_window.as_ref()
    }

    /// Encoding declared by the request.
    pub fn request_character_encoding(&self) -> Option<&str> {
        self.request.character_encoding.as_deref()
    }
}
