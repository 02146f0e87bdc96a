//! End-to-end tests for the application context.
//!
//! Tests cover:
//! 1. GET of a generated form page over a real socket
//! 2. POST updates typed host values before the page renders
//! 3. Path traversal is answered with 404
//! 4. Malformed requests get 400
//! 5. Values survive a restart through the snapshot file
//! 6. Static files and directory listings

use std::cell::{Cell, RefCell};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use webconfig_core::persistence::MemoryStore;
use webconfig_core::Settings;
use webconfig_forms::Input;
use webconfig_http::RequestParser;
use webconfig_views::WebConfigApp;

fn settings(root: &Path) -> Settings {
    Settings {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        root_folder: root.to_path_buf(),
        ..Settings::default()
    }
}

/// Sends `raw` to a running app and returns the full reply.
fn exchange(app: &mut WebConfigApp, raw: &'static [u8]) -> String {
    let addr = app.local_addr().unwrap();
    let client = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(raw).unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();
        reply
    });

    let deadline = Instant::now() + Duration::from_secs(10);
    while !app.update().unwrap() {
        assert!(Instant::now() < deadline, "no connection arrived");
        thread::sleep(Duration::from_millis(5));
    }
    client.join().unwrap()
}

struct Values {
    name: Rc<RefCell<String>>,
    show_stats: Rc<Cell<bool>>,
    fun: Rc<Cell<i64>>,
}

/// Registers `form1/Name` (input1), `debug/Show Stats` (input2),
/// `debug/Reset` (input3), `debug/Fun` (input4).
fn register(app: &mut WebConfigApp) -> Values {
    let values = Values {
        name: Rc::new(RefCell::new("david".to_string())),
        show_stats: Rc::new(Cell::new(false)),
        fun: Rc::new(Cell::new(0)),
    };
    let (get, set) = (values.name.clone(), values.name.clone());
    app.register(
        Input::text("form1/Name", move || get.borrow().clone(), move |v| {
            *set.borrow_mut() = v.to_string();
        })
        .unwrap(),
    );
    let (get, set) = (values.show_stats.clone(), values.show_stats.clone());
    app.register(Input::boolean("debug/Show Stats", move || get.get(), move |v| set.set(v)).unwrap());
    app.register(Input::button("debug/Reset", || {}).unwrap());
    let (get, set) = (values.fun.clone(), values.fun.clone());
    app.register(Input::slider_int("debug/Fun", move || get.get(), move |v| set.set(v)).unwrap());
    values
}

// ============================================================================
// 1. GET a form page
// ============================================================================

#[test]
fn test_get_form_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = WebConfigApp::new(settings(dir.path())).store(MemoryStore::new());
    app.startup().unwrap();
    register(&mut app);

    let reply = exchange(&mut app, b"GET /form1.cgi HTTP/1.1\r\nHost: x\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(reply.contains("content-type: text/html; charset=utf-8\r\n"));
    assert!(reply.contains("<th>\nName:</th>"));
    assert!(reply.contains(r#"<input type="text" name="input1" value="david""#));
    app.shutdown().unwrap();
}

// ============================================================================
// 2. POST updates values
// ============================================================================

#[test]
fn test_post_updates_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = WebConfigApp::new(settings(dir.path())).store(MemoryStore::new());
    app.startup().unwrap();
    let values = register(&mut app);

    let reply = exchange(
        &mut app,
        b"POST /debug.cgi HTTP/1.1\r\nHost: x\r\nContent-Length: 20\r\n\r\ninput2=True&input4=7",
    );
    assert!(reply.starts_with("HTTP/1.1 200 OK"));
    assert!(values.show_stats.get());
    assert_eq!(values.fun.get(), 7);
    assert!(reply.contains(r#"value="7""#));
    app.shutdown().unwrap();
}

#[test]
fn test_post_with_bad_value_still_applies_others() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = WebConfigApp::new(settings(dir.path())).store(MemoryStore::new());
    let values = register(&mut app);

    let request = RequestParser::parse(
        b"POST /debug.cgi HTTP/1.1\r\nContent-Length: 33\r\n\r\ninput4=lots&input1=Hello+World%21",
    )
    .unwrap();
    let response = app.respond(&request);
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(values.fun.get(), 0);
    assert_eq!(*values.name.borrow(), "Hello World!");
}

// ============================================================================
// 3. Path traversal
// ============================================================================

#[test]
fn test_traversal_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("www");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(dir.path().join("passwd"), "secret").unwrap();

    let mut app = WebConfigApp::new(settings(&root)).store(MemoryStore::new());
    app.startup().unwrap();

    let reply = exchange(&mut app, b"GET /../../etc/passwd HTTP/1.1\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(reply.contains("File not found!!"));

    let reply = exchange(&mut app, b"GET /../passwd HTTP/1.1\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(!reply.contains("secret"));
    app.shutdown().unwrap();
}

// ============================================================================
// 4. Malformed request
// ============================================================================

#[test]
fn test_malformed_request_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = WebConfigApp::new(settings(dir.path())).store(MemoryStore::new());
    app.startup().unwrap();
    let values = register(&mut app);

    let reply = exchange(&mut app, b"POST/debug.cgi HTTP/1.1\r\nContent-Length: 11\r\n\r\ninput2=True");
    assert!(reply.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(!values.show_stats.get());
    app.shutdown().unwrap();
}

// ============================================================================
// 5. Restart
// ============================================================================

#[test]
fn test_values_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    let mut app = WebConfigApp::new(settings(dir.path()));
    app.startup().unwrap();
    app.form_mut("debug").auto_save = true;
    let values = register(&mut app);
    let request = RequestParser::parse(
        b"POST /debug.cgi HTTP/1.1\r\nContent-Length: 20\r\n\r\ninput2=True&input4=9",
    )
    .unwrap();
    app.respond(&request);
    assert_eq!(values.fun.get(), 9);
    app.shutdown().unwrap();
    assert!(dir.path().join("WebConfig.toml").is_file());

    let mut app = WebConfigApp::new(settings(dir.path()));
    app.startup().unwrap();
    app.form_mut("debug").auto_save = true;
    let restored = register(&mut app);
    assert!(restored.show_stats.get());
    assert_eq!(restored.fun.get(), 9);
    app.shutdown().unwrap();
}

// ============================================================================
// 6. Static content
// ============================================================================

#[test]
fn test_static_file_and_listing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("styles")).unwrap();
    std::fs::write(dir.path().join("styles/slider.css"), "body{}").unwrap();

    let mut app = WebConfigApp::new(settings(dir.path())).store(MemoryStore::new());
    app.startup().unwrap();

    let reply = exchange(&mut app, b"GET /styles/slider.css HTTP/1.1\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 200 OK"));
    assert!(reply.contains("content-type: text/css; charset=utf-8\r\n"));
    assert!(reply.contains("content-length: 6\r\n"));
    assert!(reply.ends_with("body{}"));

    let reply = exchange(&mut app, b"GET /styles HTTP/1.1\r\n\r\n");
    assert!(reply.contains("Folder listing for /styles"));
    assert!(reply.contains("[slider.css]"));
    app.shutdown().unwrap();
}

#[test]
fn test_frameset_and_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = WebConfigApp::new(settings(dir.path())).store(MemoryStore::new());
    register(&mut app);

    let top = app.respond(&RequestParser::parse(b"GET / HTTP/1.1\r\n\r\n").unwrap());
    let top = String::from_utf8(top.body().to_vec()).unwrap();
    assert!(top.contains(r#"<frame src="menu.cgi" name="menu">"#));

    let menu = app.respond(&RequestParser::parse(b"GET /menu.cgi HTTP/1.1\r\n\r\n").unwrap());
    let menu = String::from_utf8(menu.body().to_vec()).unwrap();
    assert_eq!(menu.matches("\nform1</a>").count(), 1);
    assert_eq!(menu.matches("\ndebug</a>").count(), 1);
}
