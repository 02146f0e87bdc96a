//! Integration tests for the poll-driven server.
//!
//! Tests cover:
//! 1. A well-formed request reaches the handler and the response is written
//! 2. A malformed request gets 400 without invoking the handler
//! 3. A body split across writes is reassembled
//! 4. A failing handler still sends what it wrote
//! 5. Polling with nothing pending returns immediately

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use webconfig_core::{Settings, WebConfigError, WebConfigResult};
use webconfig_http::{Handler, Request, Response, Server};

fn start_server() -> (Server, SocketAddr) {
    let settings = Settings {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        ..Settings::default()
    };
    let mut server = Server::new(&settings);
    server.start().unwrap();
    let addr = server.local_addr().unwrap();
    (server, addr)
}

/// Sends each chunk (pausing between them) and reads the whole reply.
fn spawn_client(addr: SocketAddr, chunks: Vec<&'static [u8]>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                thread::sleep(Duration::from_millis(50));
            }
            stream.write_all(chunk).unwrap();
        }
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();
        reply
    })
}

/// Polls until one connection has been served.
fn serve_one<H: Handler>(server: &mut Server, handler: &mut H) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !server.update(handler).unwrap() {
        assert!(Instant::now() < deadline, "no connection arrived");
        thread::sleep(Duration::from_millis(5));
    }
}

// ============================================================================
// 1. Well-formed request
// ============================================================================

#[test]
fn test_get_reaches_handler() {
    let (mut server, addr) = start_server();
    let client = spawn_client(addr, vec![b"GET /menu.cgi?x=1 HTTP/1.1\r\nHost: x\r\n\r\n"]);

    let mut seen = Vec::new();
    let mut handler = |req: &Request, resp: &mut Response| -> WebConfigResult<()> {
        seen.push((req.url().to_string(), req.arg("x").map(str::to_string)));
        resp.set_html("<p>menu</p>");
        Ok(())
    };
    serve_one(&mut server, &mut handler);

    let reply = client.join().unwrap();
    assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(reply.contains("server: HTTPServer/1.0\r\n"));
    assert!(reply.contains("connection: close\r\n"));
    assert!(reply.ends_with("<p>menu</p>"));
    assert_eq!(seen, vec![("/menu.cgi".to_string(), Some("1".to_string()))]);
}

// ============================================================================
// 2. Malformed request
// ============================================================================

#[test]
fn test_malformed_request_is_400_without_handler() {
    let (mut server, addr) = start_server();
    let client = spawn_client(addr, vec![b"GET/form1.cgi HTTP/1.1\r\nHost: x\r\n\r\n"]);

    let mut calls = 0;
    let mut handler = |_req: &Request, _resp: &mut Response| -> WebConfigResult<()> {
        calls += 1;
        Ok(())
    };
    serve_one(&mut server, &mut handler);

    let reply = client.join().unwrap();
    assert!(reply.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert_eq!(calls, 0);
}

// ============================================================================
// 3. Body across writes
// ============================================================================

#[test]
fn test_body_split_across_writes() {
    let (mut server, addr) = start_server();
    let client = spawn_client(
        addr,
        vec![
            b"POST /debug.cgi HTTP/1.1\r\nContent-Length: 20\r\n\r\ninput3=",
            b"True&input5=7",
        ],
    );

    let mut body = Vec::new();
    let mut handler = |req: &Request, _resp: &mut Response| -> WebConfigResult<()> {
        body = req.body().to_vec();
        Ok(())
    };
    serve_one(&mut server, &mut handler);

    assert!(client.join().unwrap().starts_with("HTTP/1.1 200 OK"));
    assert_eq!(body, b"input3=True&input5=7");
}

// ============================================================================
// 4. Failing handler
// ============================================================================

#[test]
fn test_handler_error_keeps_partial_response() {
    let (mut server, addr) = start_server();
    let client = spawn_client(addr, vec![b"GET / HTTP/1.1\r\n\r\n"]);

    let mut handler = |_req: &Request, resp: &mut Response| -> WebConfigResult<()> {
        resp.set_html("partial");
        Err(WebConfigError::Dispatch("boom".into()))
    };
    serve_one(&mut server, &mut handler);

    let reply = client.join().unwrap();
    assert!(reply.starts_with("HTTP/1.1 200 OK"));
    assert!(reply.ends_with("partial"));
}

// ============================================================================
// 5. Idle polling and lifecycle
// ============================================================================

#[test]
fn test_idle_update_returns_false() {
    let (mut server, _addr) = start_server();
    let mut handler = |_req: &Request, _resp: &mut Response| -> WebConfigResult<()> { Ok(()) };
    assert!(!server.update(&mut handler).unwrap());
    server.stop();
    assert!(!server.is_running());
    assert!(server.update(&mut handler).is_err());
}
