//! Per-form settings.
//!
//! A form is a named group of inputs. Its [`FormSettings`] are created the
//! first time the name is referenced (by registering an input under it or by
//! [`Registry::form_mut`](crate::Registry::form_mut)) and live until the
//! registry shuts down.

use serde::{Deserialize, Serialize};

/// Settings shared by every input of one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    /// The form name, unique within a registry.
    pub name: String,
    /// Submit the form on every change instead of showing SUBMIT/RESET.
    #[serde(default)]
    pub auto_submit: bool,
    /// Persist this form's input values across restarts.
    #[serde(default)]
    pub auto_save: bool,
}

impl FormSettings {
    /// Creates settings for `name` with both flags off.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auto_submit: false,
            auto_save: false,
        }
    }

    /// Sets the auto-submit flag.
    #[must_use]
    pub const fn with_auto_submit(mut self, auto_submit: bool) -> Self {
        self.auto_submit = auto_submit;
        self
    }

    /// Sets the auto-save flag.
    #[must_use]
    pub const fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    /// The URL of the generated page for this form.
    pub fn page_url(&self) -> String {
        format!("{}.cgi", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_flags_off() {
        let form = FormSettings::new("debug");
        assert_eq!(form.name, "debug");
        assert!(!form.auto_submit);
        assert!(!form.auto_save);
        assert_eq!(form.page_url(), "debug.cgi");
    }

    #[test]
    fn test_builders() {
        let form = FormSettings::new("f").with_auto_submit(true).with_auto_save(true);
        assert!(form.auto_submit && form.auto_save);
    }

    #[test]
    fn test_deserialize_defaults() {
        let form: FormSettings = serde_json::from_str(r#"{"name":"f"}"#).unwrap();
        assert_eq!(form, FormSettings::new("f"));
    }
}
