//! # webconfig-forms
//!
//! Forms and inputs for webconfig. A host binds live values to typed
//! [`Input`]s, registers them with the [`Registry`] under a form name, and
//! the generated pages render and update them.
//!
//! ## Modules
//!
//! - [`form`] - Per-form settings (auto-submit, auto-save)
//! - [`input`] - The seven input variants, rendering, and value conversion
//! - [`registry`] - Input registration, snapshot restore/save, submitted updates

pub mod form;
pub mod input;
pub mod registry;

pub use form::FormSettings;
pub use input::{Input, InputBinding, InputId, InputKind, SliderRange};
pub use registry::{ApplyReport, Registry};
