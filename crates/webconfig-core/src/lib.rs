//! # webconfig-core
//!
//! Core types, settings, HTML builder, persistence, and error types for the
//! webconfig crates. Everything here is free of networking so it can be
//! shared by the HTTP layer, the forms registry, and the views.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`html`] - Stack-disciplined HTML builder and encoders
//! - [`settings`] - Listener, content folder, and logging configuration
//! - [`settings_loader`] - Loading settings from TOML/JSON files and the environment
//! - [`persistence`] - Snapshot stores for auto-saved input values
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod html;
pub mod logging;
pub mod persistence;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{WebConfigError, WebConfigResult};
pub use html::{Attrs, HtmlBuilder};
pub use persistence::{SavedValue, SnapshotStore};
pub use settings::Settings;
