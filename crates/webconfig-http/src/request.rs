//! HTTP request type.
//!
//! A [`Request`] is produced by the [`RequestParser`](crate::RequestParser)
//! once it reaches its terminal state, and is read-only from then on.

use std::collections::HashMap;

/// A fully parsed request.
///
/// # Examples
///
/// ```
/// use webconfig_http::RequestParser;
///
/// let request = RequestParser::parse(b"GET /menu.cgi?x=1 HTTP/1.1\r\nHost: a\r\n\r\n").unwrap();
/// assert_eq!(request.method(), "GET");
/// assert_eq!(request.url(), "/menu.cgi");
/// assert_eq!(request.arg("x"), Some("1"));
/// assert_eq!(request.header("host"), Some("a"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) url: String,
    pub(crate) version: String,
    pub(crate) args: HashMap<String, String>,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Vec<u8>,
}

impl Request {
    /// The request method as sent (e.g. `GET`).
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns `true` for a `POST` request.
    pub fn is_post(&self) -> bool {
        self.method == "POST"
    }

    /// The percent-decoded URL path, without the query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The protocol version (e.g. `HTTP/1.1`).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All decoded query arguments. Repeated keys hold their values joined
    /// with `", "` in the order they appeared.
    pub fn args(&self) -> &HashMap<String, String> {
        &self.args
    }

    /// Returns one query argument.
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// All headers, keyed exactly as received.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Looks up a header, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The request body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The number of body bytes received.
    pub fn body_size(&self) -> usize {
        self.body.len()
    }
}
