//! # webconfig
//!
//! Configure a running application from a web browser.
//!
//! The host binds its live values to typed inputs grouped into named forms.
//! An embedded HTTP server renders each form as a page, and submitted values
//! flow back through the bindings. Values on auto-save forms survive
//! restarts through a snapshot file.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on an
//! individual crate for finer-grained control.
//!
//! ```no_run
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use webconfig::prelude::*;
//!
//! let mut app = WebConfigApp::new(Settings::default());
//! app.startup().unwrap();
//!
//! let show_stats = Rc::new(Cell::new(false));
//! let (get, set) = (show_stats.clone(), show_stats.clone());
//! app.register(Input::boolean("debug/Show Stats", move || get.get(), move |v| set.set(v)).unwrap());
//! app.form_mut("debug").auto_save = true;
//!
//! while app.is_running() {
//!     app.update().unwrap();
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! #   break;
//! }
//! app.shutdown().unwrap();
//! ```

/// Settings, errors, the HTML builder, logging, and snapshot stores.
pub use webconfig_core as core;

/// Request parsing, responses, and the polled server.
pub use webconfig_http as http;

/// Inputs, form settings, and the registry.
pub use webconfig_forms as forms;

/// Generated pages, static files, routing, and the application context.
#[cfg(feature = "views")]
pub use webconfig_views as views;

pub use tracing;
pub use tracing_subscriber;

/// The types most hosts need.
pub mod prelude {
    pub use webconfig_core::{Settings, WebConfigError, WebConfigResult};
    pub use webconfig_forms::{FormSettings, Input, InputId, Registry};

    #[cfg(feature = "views")]
    pub use webconfig_views::WebConfigApp;
}
