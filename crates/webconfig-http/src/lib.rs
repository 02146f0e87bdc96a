//! # webconfig-http
//!
//! HTTP layer for webconfig. Provides the incremental [`RequestParser`], the
//! [`Request`] and [`Response`] types, form-body decoding, content-type
//! lookup, and the poll-driven [`Server`].
//!
//! ## Modules
//!
//! - [`parser`] - Resumable request parser state machine
//! - [`request`] - Parsed request
//! - [`response`] - Response with in-memory or file body
//! - [`query`] - Percent-decoding and form-body parsing
//! - [`content_type`] - Extension to content-type table
//! - [`server`] - Single-threaded listener and the [`Handler`] trait

pub mod content_type;
pub mod parser;
pub mod query;
pub mod request;
pub mod response;
pub mod server;

pub use content_type::content_type;
pub use parser::{ParseState, ParseStatus, RequestParser};
pub use query::{parse_form_body, percent_decode, push_argument};
pub use request::Request;
pub use response::Response;
pub use server::{Handler, Server};
