//! # webconfig-views
//!
//! The page layer of webconfig: generated frameset, menu, and form pages,
//! static file serving with path-traversal protection, the request
//! [`Dispatcher`], and [`WebConfigApp`], which ties the server, registry, and
//! dispatcher together.
//!
//! ## Modules
//!
//! - [`app`] - The application context driven by the host loop
//! - [`dispatcher`] - Routes requests to pages or files
//! - [`pages`] - HTML for every generated page
//! - [`static_files`] - Root-confined file and directory serving

pub mod app;
pub mod dispatcher;
pub mod pages;
pub mod static_files;

pub use app::WebConfigApp;
pub use dispatcher::Dispatcher;
pub use static_files::{Resolved, StaticFiles};
