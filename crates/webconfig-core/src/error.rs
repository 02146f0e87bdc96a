//! Core error types for the webconfig crates.
//!
//! [`WebConfigError`] covers every failure the embedded server can meet:
//! malformed request bytes, missing or denied files, values that do not parse
//! into an input's type, faults while building a response, markup that closes
//! the wrong tag, configuration problems, and I/O failures on sockets or files.
//!
//! None of these are retried. The server logs them and moves on to the next
//! connection.

use thiserror::Error;

/// The primary error type for webconfig.
///
/// Each variant maps to an HTTP status code via [`WebConfigError::status_code`].
#[derive(Error, Debug)]
pub enum WebConfigError {
    // ── Protocol ─────────────────────────────────────────────────────

    /// The request bytes did not form a well-formed request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    // ── Routing ──────────────────────────────────────────────────────

    /// The requested file or folder does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A request path resolved outside the content root.
    ///
    /// Reported to clients as a plain 404 so the response does not reveal
    /// anything about the filesystem layout.
    #[error("Suspicious operation: {0}")]
    SuspiciousOperation(String),

    /// A fault occurred while the router was building a response.
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    // ── Inputs ───────────────────────────────────────────────────────

    /// A submitted value could not be converted into the input's type.
    #[error("Invalid value for {input}: {message}")]
    Binding {
        /// Identifier of the input that rejected the value.
        input: String,
        /// What went wrong.
        message: String,
    },

    /// An input path did not have the `form-name/label` shape.
    #[error("Invalid input path '{0}': expected \"form-name/label\"")]
    InvalidInputPath(String),

    // ── Markup ───────────────────────────────────────────────────────

    /// The HTML builder was asked to close a tag that is not the innermost open one.
    #[error("Unbalanced markup: closing <{expected}> but innermost open tag is {found:?}")]
    UnbalancedMarkup {
        /// The tag the caller tried to close.
        expected: String,
        /// The tag actually on top of the stack, if any.
        found: Option<String>,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A snapshot could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// A socket or file operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebConfigError {
    /// Creates a [`WebConfigError::Binding`] for the given input identifier.
    pub fn binding(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Binding {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest`, `Binding` -> 400
    /// - `NotFound`, `SuspiciousOperation` -> 404
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Binding { .. } => 400,
            Self::NotFound(_) | Self::SuspiciousOperation(_) => 404,
            Self::Dispatch(_)
            | Self::InvalidInputPath(_)
            | Self::UnbalancedMarkup { .. }
            | Self::ConfigurationError(_)
            | Self::SerializationError(_)
            | Self::Io(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, WebConfigError>`.
pub type WebConfigResult<T> = Result<T, WebConfigError>;
