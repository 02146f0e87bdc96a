//! The registry of forms and input bindings.
//!
//! The [`Registry`] is the explicit context object that the host and the
//! dispatcher share: the host registers inputs into it, the dispatcher
//! renders and updates them. Its lifetime is bounded by [`Registry::startup`],
//! which loads the saved snapshot, and [`Registry::shutdown`], which saves the
//! values of auto-save forms and clears everything.
//!
//! A saved value is restored exactly once, when an input with the matching
//! identifier registers. Identifiers are assigned in registration order, so a
//! host that registers its inputs in the same order on every run gets its
//! values back.
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use webconfig_core::persistence::{MemoryStore, SavedValue};
//! use webconfig_forms::{Input, Registry};
//!
//! let store = MemoryStore::with_values(vec![SavedValue::new("input1", "True")]);
//! let mut registry = Registry::new(store);
//! registry.startup();
//!
//! let flag = Rc::new(Cell::new(false));
//! let (get, set) = (flag.clone(), flag.clone());
//! let id = registry.register(Input::boolean("debug/Show", move || get.get(), move |v| set.set(v)).unwrap());
//! assert_eq!(id.to_string(), "input1");
//! assert!(flag.get());
//! ```

use std::collections::{BTreeMap, HashMap};

use webconfig_core::persistence::{MemoryStore, SavedValue, SnapshotStore};
use webconfig_core::{WebConfigError, WebConfigResult};

use crate::form::FormSettings;
use crate::input::{Input, InputBinding, InputId};

/// Outcome of applying a batch of submitted values.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Inputs whose setter accepted the value.
    pub applied: Vec<InputId>,
    /// Submitted names that match no registered input.
    pub ignored: Vec<String>,
    /// Inputs whose value was rejected, with the reason.
    pub failed: Vec<(InputId, WebConfigError)>,
}

impl ApplyReport {
    /// Returns `true` if no value was rejected.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Forms, input bindings, and the saved snapshot.
pub struct Registry {
    inputs: BTreeMap<InputId, InputBinding>,
    forms: HashMap<String, FormSettings>,
    snapshot: Vec<SavedValue>,
    last_id: u64,
    store: Box<dyn SnapshotStore>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("inputs", &self.inputs.len())
            .field("forms", &self.forms.len())
            .field("snapshot", &self.snapshot.len())
            .field("last_id", &self.last_id)
            .finish_non_exhaustive()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl Registry {
    /// Creates an empty registry that persists through `store`.
    pub fn new(store: impl SnapshotStore + 'static) -> Self {
        Self {
            inputs: BTreeMap::new(),
            forms: HashMap::new(),
            snapshot: Vec::new(),
            last_id: 0,
            store: Box::new(store),
        }
    }

    /// Loads the saved snapshot. Call before registering inputs.
    ///
    /// A snapshot that cannot be read is logged and treated as empty.
    pub fn startup(&mut self) {
        self.snapshot = match self.store.load() {
            Ok(values) => {
                tracing::debug!(count = values.len(), "snapshot loaded");
                values
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not load snapshot, starting empty");
                Vec::new()
            }
        };
    }

    /// Saves the values of every persistent input on an auto-save form, then
    /// clears all inputs and forms.
    ///
    /// # Errors
    ///
    /// Returns the store's error if saving fails. The registry is cleared
    /// either way.
    pub fn shutdown(&mut self) -> WebConfigResult<()> {
        let values = self.saved_values();
        let result = self.store.save(&values);
        match &result {
            Ok(()) => tracing::debug!(count = values.len(), "snapshot saved"),
            Err(e) => tracing::error!(error = %e, "could not save snapshot"),
        }
        self.inputs.clear();
        self.forms.clear();
        self.snapshot.clear();
        result
    }

    /// The values [`shutdown`](Self::shutdown) would save, in identifier
    /// order.
    pub fn saved_values(&self) -> Vec<SavedValue> {
        self.inputs
            .values()
            .filter(|input| input.is_persistent())
            .filter(|input| self.forms.get(input.form_name()).is_some_and(|f| f.auto_save))
            .map(|input| SavedValue::new(input.id().to_string(), input.value()))
            .collect()
    }

    /// Returns a form's settings, if the form has been referenced.
    pub fn form(&self, name: &str) -> Option<&FormSettings> {
        self.forms.get(name)
    }

    /// Returns a form's settings, creating them on first reference.
    pub fn form_mut(&mut self, name: &str) -> &mut FormSettings {
        self.forms
            .entry(name.to_string())
            .or_insert_with(|| FormSettings::new(name))
    }

    /// Registers `input`, restoring its saved value if the snapshot has one.
    ///
    /// A saved value the input rejects is logged and dropped.
    pub fn register(&mut self, input: Input) -> InputId {
        self.last_id += 1;
        let id = InputId::new(self.last_id);
        self.form_mut(input.form_name());

        let mut binding = InputBinding::new(id, input);
        let key = id.to_string();
        if let Some(pos) = self.snapshot.iter().position(|saved| saved.id == key) {
            let saved = self.snapshot.remove(pos);
            match binding.apply(&saved.value) {
                Ok(()) => tracing::debug!(input = %id, "restored saved value"),
                Err(e) => tracing::warn!(input = %id, error = %e, "saved value rejected"),
            }
        }

        tracing::debug!(
            input = %id,
            form = binding.form_name(),
            kind = binding.kind().name(),
            "input registered"
        );
        self.inputs.insert(id, binding);
        id
    }

    /// Removes an input. Its identifier is never reassigned.
    pub fn unregister(&mut self, id: InputId) -> Option<InputBinding> {
        self.inputs.remove(&id)
    }

    /// Looks up an input.
    pub fn get(&self, id: InputId) -> Option<&InputBinding> {
        self.inputs.get(&id)
    }

    /// Looks up an input mutably.
    pub fn get_mut(&mut self, id: InputId) -> Option<&mut InputBinding> {
        self.inputs.get_mut(&id)
    }

    /// The number of registered inputs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Returns `true` if no input is registered.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// All inputs in registration order.
    pub fn inputs(&self) -> impl Iterator<Item = &InputBinding> {
        self.inputs.values()
    }

    /// The inputs of one form in registration order.
    pub fn inputs_for_form<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a InputBinding> {
        self.inputs.values().filter(move |input| input.form_name() == name)
    }

    /// Distinct names of forms that have inputs, in order of first
    /// registration.
    pub fn form_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for input in self.inputs.values() {
            if !names.contains(&input.form_name()) {
                names.push(input.form_name());
            }
        }
        names
    }

    /// Applies one submitted value by field name.
    ///
    /// Returns `Ok(false)` if `name` matches no registered input.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::Binding`] if the input rejects the value.
    pub fn apply(&mut self, name: &str, value: &str) -> WebConfigResult<bool> {
        let Some(input) = InputId::parse(name).and_then(|id| self.inputs.get_mut(&id)) else {
            return Ok(false);
        };
        input.apply(value)?;
        Ok(true)
    }

    /// Applies submitted values in order. Unknown names are skipped and
    /// rejected values are logged; neither stops the remaining updates.
    pub fn apply_all<K, V>(&mut self, pairs: &[(K, V)]) -> ApplyReport
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut report = ApplyReport::default();
        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            let Some(id) = InputId::parse(name).filter(|id| self.inputs.contains_key(id)) else {
                tracing::trace!(name, "ignoring unknown field");
                report.ignored.push(name.to_string());
                continue;
            };
            match self.apply(name, value) {
                Ok(_) => report.applied.push(id),
                Err(e) => {
                    tracing::warn!(input = %id, value, error = %e, "submitted value rejected");
                    report.failed.push((id, e));
                }
            }
        }
        report
    }
}
