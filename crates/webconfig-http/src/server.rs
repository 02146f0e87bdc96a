//! Poll-driven, single-threaded HTTP listener.
//!
//! The host calls [`Server::update`] from its own loop. Each call accepts at
//! most one pending connection and serves it to completion (read, parse,
//! dispatch, write, close) before returning; when nothing is pending it
//! returns immediately.
//!
//! A client that never finishes a declared body, or never drains the
//! response, blocks the calling thread. There is no timeout.
//!
//! # Examples
//!
//! ```no_run
//! use webconfig_core::{Settings, WebConfigResult};
//! use webconfig_http::{Request, Response, Server};
//!
//! let mut server = Server::new(&Settings::default());
//! server.start().unwrap();
//! let mut handler = |_req: &Request, resp: &mut Response| -> WebConfigResult<()> {
//!     resp.set_html("<p>hi</p>");
//!     Ok(())
//! };
//! loop {
//!     server.update(&mut handler).unwrap();
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! }
//! ```

use std::io::{self, BufWriter, Read};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};

use http::StatusCode;
use webconfig_core::logging::connection_span;
use webconfig_core::{Settings, WebConfigError, WebConfigResult};

use crate::parser::{ParseStatus, RequestParser};
use crate::request::Request;
use crate::response::Response;

/// Produces a response for a successfully parsed request.
///
/// An error returned from `handle` is logged; whatever the handler wrote
/// into the response before failing is still sent.
pub trait Handler {
    /// Fills in `response` for `request`.
    fn handle(&mut self, request: &Request, response: &mut Response) -> WebConfigResult<()>;
}

impl<F> Handler for F
where
    F: FnMut(&Request, &mut Response) -> WebConfigResult<()>,
{
    fn handle(&mut self, request: &Request, response: &mut Response) -> WebConfigResult<()> {
        self(request, response)
    }
}

/// A non-blocking listener served one connection per poll.
#[derive(Debug)]
pub struct Server {
    listen_address: String,
    server_name: String,
    read_buffer_size: usize,
    max_body_size: usize,
    listener: Option<TcpListener>,
}

impl Server {
    /// Creates a stopped server configured from `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self {
            listen_address: settings.listen_address(),
            server_name: settings.server_name.clone(),
            read_buffer_size: settings.read_buffer_size.max(1),
            max_body_size: settings.max_body_size,
            listener: None,
        }
    }

    /// Binds the listening socket. Calling `start` on a running server is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the address cannot be bound.
    pub fn start(&mut self) -> WebConfigResult<()> {
        if self.listener.is_some() {
            return Ok(());
        }
        let listener = TcpListener::bind(&self.listen_address)?;
        listener.set_nonblocking(true)?;
        tracing::info!(address = %self.listen_address, "server listening");
        self.listener = Some(listener);
        Ok(())
    }

    /// Closes the listening socket.
    pub fn stop(&mut self) {
        if self.listener.take().is_some() {
            tracing::info!(address = %self.listen_address, "server stopped");
        }
    }

    /// Returns `true` while the listener is bound.
    pub const fn is_running(&self) -> bool {
        self.listener.is_some()
    }

    /// The bound address, useful when listening on port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Serves at most one pending connection.
    ///
    /// Returns `Ok(true)` if a connection was accepted. Failures while
    /// serving a connection are logged, never returned.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::ConfigurationError`] if the server was not
    /// started.
    pub fn update<H>(&mut self, handler: &mut H) -> WebConfigResult<bool>
    where
        H: Handler + ?Sized,
    {
        let Some(listener) = &self.listener else {
            return Err(WebConfigError::ConfigurationError(
                "update called before start".to_string(),
            ));
        };

        let (stream, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                return Ok(false);
            }
        };

        let span = connection_span(&peer.to_string());
        let _enter = span.enter();
        self.serve(stream, handler);
        Ok(true)
    }

    fn serve<H>(&self, mut stream: TcpStream, handler: &mut H)
    where
        H: Handler + ?Sized,
    {
        let response = match self.read_request(&mut stream) {
            Ok(request) => {
                tracing::debug!(method = request.method(), url = request.url(), "request parsed");
                let mut response = Response::new();
                if let Err(e) = handler.handle(&request, &mut response) {
                    tracing::error!(error = %e, url = request.url(), "handler failed");
                }
                tracing::info!(
                    method = request.method(),
                    url = request.url(),
                    status = response.status().as_u16(),
                    "request served"
                );
                response
            }
            Err(WebConfigError::Io(e)) => {
                tracing::warn!(error = %e, "read failed, closing connection");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "malformed request");
                bad_request()
            }
        };

        let mut writer = BufWriter::new(&stream);
        if let Err(e) = response.write_to(&mut writer, &self.server_name) {
            tracing::warn!(error = %e, "write failed, closing connection");
        }
        drop(writer);
        let _ = stream.shutdown(Shutdown::Write);
        discard_unread(&stream);
    }

    /// Reads until the parser completes, the peer stops sending, or no more
    /// data is immediately available outside a declared body.
    fn read_request(&self, stream: &mut TcpStream) -> WebConfigResult<Request> {
        stream.set_nonblocking(false)?;
        let mut parser = RequestParser::new().with_max_body_size(self.max_body_size);
        let mut buf = vec![0u8; self.read_buffer_size];

        loop {
            let read = stream.read(&mut buf)?;
            if read == 0 {
                break;
            }
            if parser.feed(&buf[..read])? == ParseStatus::Complete {
                break;
            }
            if !parser.awaiting_body() && !data_available(stream)? {
                break;
            }
        }
        parser.finish()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}

fn bad_request() -> Response {
    let mut response = Response::with_status(StatusCode::BAD_REQUEST);
    response.set_html("<html><body><h1>400 Bad Request</h1></body></html>");
    response
}

/// Reads and drops whatever the peer already sent, so closing the socket
/// does not reset the connection before the response is read.
fn discard_unread(mut stream: &TcpStream) {
    if stream.set_nonblocking(true).is_err() {
        return;
    }
    let mut buf = [0u8; 1024];
    while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
}

fn data_available(stream: &TcpStream) -> io::Result<bool> {
    stream.set_nonblocking(true)?;
    let mut probe = [0u8; 1];
    let peeked = stream.peek(&mut probe);
    stream.set_nonblocking(false)?;
    match peeked {
        Ok(n) => Ok(n > 0),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(false),
        Err(e) => Err(e),
    }
}
