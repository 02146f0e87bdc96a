//! HTTP response type.
//!
//! A [`Response`] starts out as `200 OK` with an empty body. The router fills
//! in a status, headers, and either an in-memory body or an open file to
//! stream, and the server serializes it with [`Response::write_to`]. A file
//! body takes precedence over in-memory bytes when both are set.

use std::fs::File;
use std::io::{self, Write};

use http::header::{HeaderName, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, DATE, SERVER};
use http::{HeaderMap, HeaderValue, StatusCode};
use mime::Mime;

use webconfig_core::{WebConfigError, WebConfigResult};

/// Protocol version written on every status line.
pub const DEFAULT_VERSION: &str = "HTTP/1.1";

/// An open file to be streamed as the response body.
struct FileBody {
    file: File,
    len: u64,
}

/// An HTTP response.
///
/// # Examples
///
/// ```
/// use webconfig_http::Response;
///
/// let mut response = Response::new();
/// response.set_html("<p>hello</p>");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.body(), b"<p>hello</p>");
/// ```
pub struct Response {
    status: StatusCode,
    version: String,
    headers: HeaderMap,
    content: Vec<u8>,
    file: Option<FileBody>,
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("version", &self.version)
            .field("headers", &self.headers)
            .field("content_len", &self.content.len())
            .field("file_len", &self.file.as_ref().map(|f| f.len))
            .finish()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates a `200 OK` response with no body.
    pub fn new() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// Creates an empty response with the given status.
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            version: DEFAULT_VERSION.to_string(),
            headers: HeaderMap::new(),
            content: Vec::new(),
            file: None,
        }
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns the protocol version of the status line.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Sets the protocol version of the status line.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Returns a reference to the headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Looks up a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Sets a header, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::Dispatch`] if the name or value is not valid
    /// in an HTTP header.
    pub fn set_header(&mut self, name: &str, value: &str) -> WebConfigResult<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| WebConfigError::Dispatch(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| WebConfigError::Dispatch(format!("invalid header value '{value}': {e}")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Returns the `Content-Type` header, if set.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Sets the `Content-Type` header.
    pub fn set_content_type(&mut self, content_type: &Mime) {
        if let Ok(value) = HeaderValue::from_str(content_type.as_ref()) {
            self.headers.insert(CONTENT_TYPE, value);
        }
    }

    /// Returns the in-memory body.
    pub fn body(&self) -> &[u8] {
        &self.content
    }

    /// Replaces the in-memory body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.content = body.into();
    }

    /// Sets an HTML body and a `text/html; charset=utf-8` content type.
    pub fn set_html(&mut self, html: impl Into<String>) {
        self.content = html.into().into_bytes();
        self.set_content_type(&mime::TEXT_HTML_UTF_8);
    }

    /// Streams `file` as the body. The file is closed when the response is
    /// written or dropped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file's metadata cannot be read.
    pub fn set_file(&mut self, file: File) -> WebConfigResult<()> {
        let len = file.metadata()?.len();
        self.file = Some(FileBody { file, len });
        Ok(())
    }

    /// Returns `true` if the body is streamed from a file.
    pub const fn has_file(&self) -> bool {
        self.file.is_some()
    }

    /// The number of body bytes that will be written.
    pub fn content_length(&self) -> u64 {
        self.file
            .as_ref()
            .map_or(self.content.len() as u64, |f| f.len)
    }

    /// Serializes the response to `out`: status line, headers, blank line,
    /// body.
    ///
    /// `Server`, `Date`, `Content-Length`, and `Connection: close` are always
    /// written; a `Server` header set by the router wins over `server_name`.
    /// Consumes the response so that a file body is released on every path.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while writing or reading the file body.
    pub fn write_to<W: Write>(mut self, out: &mut W, server_name: &str) -> io::Result<u64> {
        let reason = self.status.canonical_reason().unwrap_or("Unknown");
        write!(out, "{} {} {}\r\n", self.version, self.status.as_u16(), reason)?;

        if !self.headers.contains_key(SERVER) {
            if let Ok(value) = HeaderValue::from_str(server_name) {
                self.headers.insert(SERVER, value);
            }
        }
        if let Ok(value) = HeaderValue::from_str(&http_date()) {
            self.headers.insert(DATE, value);
        }
        self.headers
            .insert(CONTENT_LENGTH, HeaderValue::from(self.content_length()));
        self.headers
            .insert(CONNECTION, HeaderValue::from_static("close"));

        for (name, value) in &self.headers {
            out.write_all(name.as_str().as_bytes())?;
            out.write_all(b": ")?;
            out.write_all(value.as_bytes())?;
            out.write_all(b"\r\n")?;
        }
        out.write_all(b"\r\n")?;

        let written = match self.file.take() {
            Some(mut body) => io::copy(&mut body.file, out)?,
            None => {
                out.write_all(&self.content)?;
                self.content.len() as u64
            }
        };
        out.flush()?;
        Ok(written)
    }
}

/// The current time in RFC 1123 format.
fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(response: Response) -> String {
        let mut out = Vec::new();
        response.write_to(&mut out, "HTTPServer/1.0").unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_default_is_ok_and_empty() {
        let resp = Response::default();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.version(), "HTTP/1.1");
        assert!(resp.body().is_empty());
        assert!(!resp.has_file());
    }

    #[test]
    fn test_set_status() {
        let mut resp = Response::new();
        resp.set_status(StatusCode::NOT_FOUND);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_set_html_sets_content_type() {
        let mut resp = Response::new();
        resp.set_html("<b>x</b>");
        assert_eq!(resp.content_type(), Some("text/html; charset=utf-8"));
        assert_eq!(resp.content_length(), 8);
    }

    #[test]
    fn test_set_header() {
        let mut resp = Response::new();
        resp.set_header("X-Frame-Options", "DENY").unwrap();
        assert_eq!(resp.header("x-frame-options"), Some("DENY"));
        assert!(resp.set_header("bad header", "v").is_err());
        assert!(resp.set_header("X-Ok", "line\nbreak").is_err());
    }

    #[test]
    fn test_write_to_layout() {
        let mut resp = Response::new();
        resp.set_html("hello");
        let text = serialize(resp);

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("server: HTTPServer/1.0\r\n"));
        assert!(text.contains("date: "));
        assert!(text.contains(" GMT\r\n"));
        assert!(text.contains("content-length: 5\r\n"));
        assert!(text.contains("connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_write_to_keeps_router_server_header() {
        let mut resp = Response::with_status(StatusCode::BAD_REQUEST);
        resp.set_header("Server", "custom").unwrap();
        let text = serialize(resp);
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains("server: custom\r\n"));
        assert!(!text.contains("HTTPServer/1.0"));
    }

    #[test]
    fn test_file_body_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.htm");
        std::fs::write(&path, "from file").unwrap();

        let mut resp = Response::new();
        resp.set_body("from memory");
        resp.set_file(File::open(&path).unwrap()).unwrap();
        assert!(resp.has_file());
        assert_eq!(resp.content_length(), 9);

        let text = serialize(resp);
        assert!(text.contains("content-length: 9\r\n"));
        assert!(text.ends_with("from file"));
        assert!(!text.contains("from memory"));
    }

    #[test]
    fn test_debug_omits_body() {
        let mut resp = Response::new();
        resp.set_body(vec![0u8; 3]);
        let debug = format!("{resp:?}");
        assert!(debug.contains("200"));
        assert!(debug.contains("content_len: 3"));
    }
}
