//! Incremental HTTP/1.x request parser.
//!
//! [`RequestParser`] is a resumable state machine. Feed it byte slices as
//! they come off the socket, in chunks of any size and alignment; it keeps
//! its position between calls and reports [`ParseStatus::Complete`] once the
//! request line, the headers and (if a `Content-Length` header was sent)
//! exactly that many body bytes have been consumed.
//!
//! ```text
//! Method ─▶ Url ─┬──────────────────────────────▶ Version ─▶ HeaderKey ◀─┐
//!                └▶ UrlParam ⇄ UrlValue ─────────▶                │       │
//!                                                                 ▼       │
//!                                             (blank line)   HeaderValue ─┘
//!                                                  │
//!                                   Content-Length ├──▶ Body ──▶ Complete
//!                                             none └──────────▶ Complete
//! ```
//!
//! The URL path and every query key and value are percent-decoded when the
//! field completes. Lines may end in CRLF or a bare LF.

use std::collections::HashMap;

use webconfig_core::{WebConfigError, WebConfigResult};

use crate::query::{percent_decode_bytes, push_argument};
use crate::request::Request;

/// Default cap on the declared body size.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Position of the parser within a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Reading the method token.
    Method,
    /// Reading the URL path.
    Url,
    /// Reading a query argument key.
    UrlParam,
    /// Reading a query argument value.
    UrlValue,
    /// Reading the protocol version.
    Version,
    /// Reading a header name, or the blank line that ends the headers.
    HeaderKey,
    /// Reading a header value.
    HeaderValue,
    /// Copying `Content-Length` body bytes.
    Body,
    /// The request is complete.
    Complete,
    /// The input was malformed; no further bytes are accepted.
    Failed,
}

/// Outcome of feeding one chunk to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// More bytes are needed.
    Incomplete,
    /// A full request has been read.
    Complete,
}

/// A resumable request parser for a single connection.
#[derive(Debug)]
pub struct RequestParser {
    state: ParseState,
    method: Vec<u8>,
    url: Vec<u8>,
    key: Vec<u8>,
    value: Vec<u8>,
    version: Vec<u8>,
    args: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    body_remaining: usize,
    max_body_size: usize,
    failure: Option<String>,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    /// Creates a parser waiting for the first byte of the method.
    pub fn new() -> Self {
        Self {
            state: ParseState::Method,
            method: Vec::new(),
            url: Vec::new(),
            key: Vec::new(),
            value: Vec::new(),
            version: Vec::new(),
            args: HashMap::new(),
            headers: HashMap::new(),
            body: Vec::new(),
            body_remaining: 0,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            failure: None,
        }
    }

    /// Sets the largest `Content-Length` the parser accepts.
    #[must_use]
    pub const fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Parses a request that is already entirely in memory.
    pub fn parse(bytes: &[u8]) -> WebConfigResult<Request> {
        let mut parser = Self::new();
        parser.feed(bytes)?;
        parser.finish()
    }

    /// Returns the current state.
    pub const fn state(&self) -> ParseState {
        self.state
    }

    /// Returns `true` once a full request has been read.
    pub fn is_complete(&self) -> bool {
        self.state == ParseState::Complete
    }

    /// Returns `true` if the parser has rejected its input.
    pub fn is_failed(&self) -> bool {
        self.state == ParseState::Failed
    }

    /// Returns `true` while the headers are done but declared body bytes are
    /// still outstanding.
    pub fn awaiting_body(&self) -> bool {
        self.state == ParseState::Body
    }

    /// Consumes the next chunk of input.
    ///
    /// Bytes arriving after the request is complete are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::BadRequest`] as soon as the input can no
    /// longer form a valid request. The parser then stays failed.
    pub fn feed(&mut self, chunk: &[u8]) -> WebConfigResult<ParseStatus> {
        let mut pos = 0;
        while pos < chunk.len() {
            match self.state {
                ParseState::Complete => break,
                ParseState::Failed => return Err(self.failure_error()),
                ParseState::Body => {
                    let take = self.body_remaining.min(chunk.len() - pos);
                    self.body.extend_from_slice(&chunk[pos..pos + take]);
                    self.body_remaining -= take;
                    pos += take;
                    if self.body_remaining == 0 {
                        self.state = ParseState::Complete;
                    }
                }
                _ => {
                    let byte = chunk[pos];
                    pos += 1;
                    if let Err(reason) = self.step(byte) {
                        tracing::debug!(state = ?self.state, %reason, "rejecting request");
                        self.state = ParseState::Failed;
                        self.failure = Some(reason);
                        return Err(self.failure_error());
                    }
                }
            }
        }
        Ok(if self.is_complete() {
            ParseStatus::Complete
        } else {
            ParseStatus::Incomplete
        })
    }

    /// Returns the parsed request.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::BadRequest`] if the parser failed or the
    /// input ended before the request was complete.
    pub fn finish(self) -> WebConfigResult<Request> {
        match self.state {
            ParseState::Complete => Ok(Request {
                method: String::from_utf8_lossy(&self.method).into_owned(),
                url: percent_decode_bytes(&self.url),
                version: String::from_utf8_lossy(&self.version).into_owned(),
                args: self.args,
                headers: self.headers,
                body: self.body,
            }),
            ParseState::Failed => Err(self.failure_error()),
            state => Err(WebConfigError::BadRequest(format!(
                "request ended early (parser in state {state:?})"
            ))),
        }
    }

    fn failure_error(&self) -> WebConfigError {
        WebConfigError::BadRequest(
            self.failure
                .clone()
                .unwrap_or_else(|| "malformed request".to_string()),
        )
    }

    fn step(&mut self, byte: u8) -> Result<(), String> {
        match self.state {
            ParseState::Method => match byte {
                b' ' if self.method.is_empty() => return Err("empty method".into()),
                b' ' => self.state = ParseState::Url,
                b if is_token_byte(b) => self.method.push(b),
                b => return Err(format!("invalid byte 0x{b:02x} in method")),
            },
            ParseState::Url => match byte {
                b'?' => self.state = ParseState::UrlParam,
                b' ' => self.state = ParseState::Version,
                b'\r' | b'\n' => return Err("request line has no protocol version".into()),
                b => self.url.push(b),
            },
            ParseState::UrlParam => match byte {
                b'=' => self.state = ParseState::UrlValue,
                b'&' => self.flush_argument(),
                b' ' => {
                    self.flush_argument();
                    self.state = ParseState::Version;
                }
                b'\r' | b'\n' => return Err("request line has no protocol version".into()),
                b => self.key.push(b),
            },
            ParseState::UrlValue => match byte {
                b'&' => {
                    self.flush_argument();
                    self.state = ParseState::UrlParam;
                }
                b' ' => {
                    self.flush_argument();
                    self.state = ParseState::Version;
                }
                b'\r' | b'\n' => return Err("request line has no protocol version".into()),
                b => self.value.push(b),
            },
            ParseState::Version => match byte {
                b'\r' => {}
                b'\n' if self.version.is_empty() => return Err("empty protocol version".into()),
                b'\n' => self.state = ParseState::HeaderKey,
                b => self.version.push(b),
            },
            ParseState::HeaderKey => match byte {
                b'\r' => {}
                b'\n' if self.key.is_empty() => self.end_headers()?,
                b'\n' => return Err("header line without ':'".into()),
                b':' if self.key.is_empty() => return Err("empty header name".into()),
                b':' => self.state = ParseState::HeaderValue,
                b => self.key.push(b),
            },
            ParseState::HeaderValue => match byte {
                b'\r' => {}
                b' ' | b'\t' if self.value.is_empty() => {}
                b'\n' => {
                    self.flush_header();
                    self.state = ParseState::HeaderKey;
                }
                b => self.value.push(b),
            },
            ParseState::Body | ParseState::Complete | ParseState::Failed => {}
        }
        Ok(())
    }

    fn flush_argument(&mut self) {
        if self.key.is_empty() && self.value.is_empty() {
            return;
        }
        let key = percent_decode_bytes(&self.key);
        let value = percent_decode_bytes(&self.value);
        push_argument(&mut self.args, key, value);
        self.key.clear();
        self.value.clear();
    }

    fn flush_header(&mut self) {
        let key = String::from_utf8_lossy(&self.key).into_owned();
        let value = String::from_utf8_lossy(&self.value).trim_end().to_string();
        self.headers
            .entry(key)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
        self.key.clear();
        self.value.clear();
    }

    fn end_headers(&mut self) -> Result<(), String> {
        let declared = self
            .headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("Content-Length"))
            .map(|(_, value)| value.trim().to_string());

        let length = match declared {
            None => 0,
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| format!("invalid Content-Length '{raw}'"))?,
        };
        if length > self.max_body_size {
            return Err(format!(
                "Content-Length {length} exceeds limit of {}",
                self.max_body_size
            ));
        }

        if length == 0 {
            self.state = ParseState::Complete;
        } else {
            self.body = Vec::with_capacity(length.min(64 * 1024));
            self.body_remaining = length;
            self.state = ParseState::Body;
        }
        Ok(())
    }
}

/// RFC 9110 `tchar`.
const fn is_token_byte(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.'
        | b'^' | b'_' | b'`' | b'|' | b'~')
        || b.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET: &[u8] = b"GET /form1.cgi HTTP/1.1\r\nHost: x\r\n\r\n";
    const POST: &[u8] =
        b"POST /debug.cgi?tab=2 HTTP/1.1\r\nHost: x\r\nContent-Length: 20\r\n\r\ninput3=True&input5=7";

    #[test]
    fn test_parse_simple_get() {
        let req = RequestParser::parse(GET).unwrap();
        assert_eq!(req.method(), "GET");
        assert_eq!(req.url(), "/form1.cgi");
        assert_eq!(req.version(), "HTTP/1.1");
        assert_eq!(req.headers()["Host"], "x");
        assert!(req.args().is_empty());
        assert_eq!(req.body_size(), 0);
    }

    #[test]
    fn test_parse_post_with_body() {
        let req = RequestParser::parse(POST).unwrap();
        assert!(req.is_post());
        assert_eq!(req.arg("tab"), Some("2"));
        assert_eq!(req.body(), b"input3=True&input5=7");
    }

    #[test]
    fn test_fragmentation_invariance_two_chunks() {
        for input in [GET, POST] {
            let whole = RequestParser::parse(input).unwrap();
            for split in 0..=input.len() {
                let mut parser = RequestParser::new();
                parser.feed(&input[..split]).unwrap();
                parser.feed(&input[split..]).unwrap();
                assert_eq!(parser.finish().unwrap(), whole, "split at {split}");
            }
        }
    }

    #[test]
    fn test_fragmentation_invariance_byte_by_byte() {
        let whole = RequestParser::parse(POST).unwrap();
        let mut parser = RequestParser::new();
        for byte in POST {
            parser.feed(std::slice::from_ref(byte)).unwrap();
        }
        assert!(parser.is_complete());
        assert_eq!(parser.finish().unwrap(), whole);
    }

    #[test]
    fn test_incomplete_reports_status() {
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r\n").unwrap(), ParseStatus::Incomplete);
        assert_eq!(parser.state(), ParseState::HeaderKey);
        assert_eq!(parser.feed(b"\r\n").unwrap(), ParseStatus::Complete);
    }

    #[test]
    fn test_body_across_reads() {
        let mut parser = RequestParser::new();
        parser
            .feed(b"POST /x.cgi HTTP/1.1\r\nContent-Length: 6\r\n\r\nab")
            .unwrap();
        assert!(parser.awaiting_body());
        parser.feed(b"cd").unwrap();
        assert_eq!(parser.feed(b"ef").unwrap(), ParseStatus::Complete);
        assert_eq!(parser.finish().unwrap().body(), b"abcdef");
    }

    #[test]
    fn test_truncated_body_is_bad_request() {
        let mut parser = RequestParser::new();
        parser
            .feed(b"POST /x.cgi HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc")
            .unwrap();
        assert!(matches!(parser.finish(), Err(WebConfigError::BadRequest(_))));
    }

    #[test]
    fn test_bytes_after_completion_ignored() {
        let mut parser = RequestParser::new();
        parser.feed(b"GET / HTTP/1.1\r\n\r\nGARBAGE").unwrap();
        assert_eq!(parser.finish().unwrap().url(), "/");
    }

    #[test]
    fn test_repeated_query_keys_joined() {
        let req = RequestParser::parse(b"GET /a?c=red&s=1&c=blue&c=green HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.arg("c"), Some("red, blue, green"));
        assert_eq!(req.arg("s"), Some("1"));
    }

    #[test]
    fn test_percent_decoding_of_url_and_args() {
        let req =
            RequestParser::parse(b"GET /my%20form.cgi?na%6De=show+stats%21 HTTP/1.1\r\n\r\n")
                .unwrap();
        assert_eq!(req.url(), "/my form.cgi");
        assert_eq!(req.arg("name"), Some("show stats!"));
    }

    #[test]
    fn test_query_key_without_value() {
        let req = RequestParser::parse(b"GET /a?flag&x=1&empty= HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.arg("flag"), Some(""));
        assert_eq!(req.arg("x"), Some("1"));
        assert_eq!(req.arg("empty"), Some(""));
    }

    #[test]
    fn test_bare_lf_line_endings() {
        let req = RequestParser::parse(b"GET /menu.cgi HTTP/1.0\nHost: y\n\n").unwrap();
        assert_eq!(req.version(), "HTTP/1.0");
        assert_eq!(req.header("host"), Some("y"));
    }

    #[test]
    fn test_header_value_trimmed_and_duplicates_joined() {
        let req = RequestParser::parse(
            b"GET / HTTP/1.1\r\nAccept:text/html  \r\nAccept:  */*\r\n\r\n",
        )
        .unwrap();
        assert_eq!(req.headers()["Accept"], "text/html, */*");
    }

    #[test]
    fn test_missing_space_after_method() {
        let err = RequestParser::parse(b"GET/form1.cgi HTTP/1.1\r\nHost: x\r\n\r\n").unwrap_err();
        assert!(matches!(err, WebConfigError::BadRequest(_)));
    }

    #[test]
    fn test_request_line_without_version() {
        assert!(RequestParser::parse(b"GET /form1.cgi\r\n\r\n").is_err());
    }

    #[test]
    fn test_header_without_colon() {
        assert!(RequestParser::parse(b"GET / HTTP/1.1\r\nBroken\r\n\r\n").is_err());
    }

    #[test]
    fn test_invalid_content_length() {
        assert!(RequestParser::parse(b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n").is_err());
    }

    #[test]
    fn test_body_limit() {
        let mut parser = RequestParser::new().with_max_body_size(4);
        let err = parser
            .feed(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\n")
            .unwrap_err();
        assert!(err.to_string().contains("exceeds limit"));
        assert!(parser.is_failed());
        assert!(parser.feed(b"more").is_err());
    }

    #[test]
    fn test_content_length_zero_completes() {
        let req = RequestParser::parse(b"POST /a.cgi HTTP/1.1\r\ncontent-length: 0\r\n\r\n").unwrap();
        assert_eq!(req.body_size(), 0);
    }

    #[test]
    fn test_empty_input_is_incomplete() {
        assert!(matches!(
            RequestParser::new().finish(),
            Err(WebConfigError::BadRequest(_))
        ));
    }
}
