//! The application context.
//!
//! [`WebConfigApp`] owns the [`Server`], the [`Registry`], and the
//! [`Dispatcher`], and wires them together. The host drives it:
//!
//! 1. [`startup`](WebConfigApp::startup) loads the snapshot and binds the port,
//! 2. inputs are registered through [`registry_mut`](WebConfigApp::registry_mut),
//! 3. [`update`](WebConfigApp::update) is called periodically from the host loop,
//! 4. [`shutdown`](WebConfigApp::shutdown) saves auto-save values and stops serving.
//!
//! # Examples
//!
//! ```no_run
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use webconfig_core::Settings;
//! use webconfig_forms::Input;
//! use webconfig_views::WebConfigApp;
//!
//! let mut app = WebConfigApp::new(Settings::default());
//! app.startup().unwrap();
//!
//! let fun = Rc::new(Cell::new(50_i64));
//! let (get, set) = (fun.clone(), fun.clone());
//! app.register(Input::slider_int("debug/Fun", move || get.get(), move |v| set.set(v)).unwrap());
//!
//! loop {
//!     app.update().unwrap();
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! #   break;
//! }
//! app.shutdown().unwrap();
//! ```

use std::net::SocketAddr;

use webconfig_core::persistence::{SnapshotStore, TomlFileStore};
use webconfig_core::{Settings, WebConfigResult};
use webconfig_forms::{FormSettings, Input, InputId, Registry};
use webconfig_http::{Request, Response, Server};

use crate::dispatcher::Dispatcher;

/// Server, registry, and dispatcher for one embedded configuration UI.
#[derive(Debug)]
pub struct WebConfigApp {
    settings: Settings,
    server: Server,
    registry: Registry,
    dispatcher: Dispatcher,
}

impl WebConfigApp {
    /// Creates a stopped application. Values are persisted to
    /// `settings.snapshot_path()` as TOML.
    pub fn new(settings: Settings) -> Self {
        let store = TomlFileStore::new(settings.snapshot_path());
        Self {
            server: Server::new(&settings),
            registry: Registry::new(store),
            dispatcher: Dispatcher::new(&settings),
            settings,
        }
    }

    /// Replaces the snapshot store. Call before [`startup`](Self::startup);
    /// any registered inputs are dropped.
    #[must_use]
    pub fn store(mut self, store: impl SnapshotStore + 'static) -> Self {
        self.registry = Registry::new(store);
        self
    }

    /// Returns a reference to the application settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the registry.
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the registry mutably, for registering inputs and
    /// configuring forms.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Registers an input. Shorthand for `registry_mut().register(input)`.
    pub fn register(&mut self, input: Input) -> InputId {
        self.registry.register(input)
    }

    /// Returns a form's settings, creating them on first reference.
    pub fn form_mut(&mut self, name: &str) -> &mut FormSettings {
        self.registry.form_mut(name)
    }

    /// The bound listen address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.local_addr()
    }

    /// Returns `true` between `startup` and `shutdown`.
    pub const fn is_running(&self) -> bool {
        self.server.is_running()
    }

    /// Loads the snapshot and starts listening.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listen address cannot be bound.
    pub fn startup(&mut self) -> WebConfigResult<()> {
        self.registry.startup();
        self.server.start()?;
        tracing::info!(
            root = %self.settings.root_folder.display(),
            address = %self.settings.listen_address(),
            "webconfig started"
        );
        Ok(())
    }

    /// Serves at most one pending connection. Call periodically.
    ///
    /// # Errors
    ///
    /// Returns an error if the application was not started.
    pub fn update(&mut self) -> WebConfigResult<bool> {
        let Self {
            server,
            registry,
            dispatcher,
            ..
        } = self;
        let mut handler = |request: &Request, response: &mut Response| {
            dispatcher.dispatch(registry, request, response)
        };
        server.update(&mut handler)
    }

    /// Routes one already-parsed request without a socket.
    pub fn respond(&mut self, request: &Request) -> Response {
        let mut response = Response::new();
        if let Err(e) = self.dispatcher.dispatch(&mut self.registry, request, &mut response) {
            tracing::error!(error = %e, url = request.url(), "dispatch failed");
        }
        response
    }

    /// Stops listening, saves auto-save values, and clears the registry.
    ///
    /// # Errors
    ///
    /// Returns the snapshot store's error if saving fails.
    pub fn shutdown(&mut self) -> WebConfigResult<()> {
        self.server.stop();
        let result = self.registry.shutdown();
        tracing::info!("webconfig stopped");
        result
    }
}
