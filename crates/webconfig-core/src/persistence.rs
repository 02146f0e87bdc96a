//! Persistence bridge for auto-saved input values.
//!
//! The registry only needs list semantics: an ordered list of
//! `(identifier, value)` records read once at startup and written once at
//! shutdown. How that list is stored is up to a [`SnapshotStore`]. Three
//! stores ship with the crate:
//!
//! - [`TomlFileStore`] - an `[[inputs]]` array in a TOML file (the default)
//! - [`JsonFileStore`] - a JSON array of records
//! - [`MemoryStore`] - keeps the list in memory, for tests and for hosts that
//!   persist values somewhere else
//!
//! A missing file is not an error: it simply yields an empty snapshot.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{WebConfigError, WebConfigResult};

/// One persisted input value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedValue {
    /// The input's identifier (e.g. `input3`).
    pub id: String,
    /// The input's value in its string form.
    pub value: String,
}

impl SavedValue {
    /// Creates a new saved value.
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Loads and saves the snapshot of auto-saved values.
pub trait SnapshotStore {
    /// Reads the snapshot. Returns an empty list when nothing was saved yet.
    fn load(&self) -> WebConfigResult<Vec<SavedValue>>;

    /// Replaces the stored snapshot with `values`.
    fn save(&self, values: &[SavedValue]) -> WebConfigResult<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TomlSnapshot {
    #[serde(default)]
    inputs: Vec<SavedValue>,
}

/// Stores the snapshot as a TOML document.
///
/// ```toml
/// [[inputs]]
/// id = "input1"
/// value = "david"
/// ```
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for TomlFileStore {
    fn load(&self) -> WebConfigResult<Vec<SavedValue>> {
        let Some(content) = read_if_exists(&self.path)? else {
            return Ok(Vec::new());
        };
        let snapshot: TomlSnapshot = toml::from_str(&content).map_err(|e| {
            WebConfigError::SerializationError(format!(
                "Failed to parse snapshot '{}': {e}",
                self.path.display()
            ))
        })?;
        Ok(snapshot.inputs)
    }

    fn save(&self, values: &[SavedValue]) -> WebConfigResult<()> {
        let snapshot = TomlSnapshot {
            inputs: values.to_vec(),
        };
        let content = toml::to_string_pretty(&snapshot)
            .map_err(|e| WebConfigError::SerializationError(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Stores the snapshot as a JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> WebConfigResult<Vec<SavedValue>> {
        let Some(content) = read_if_exists(&self.path)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&content).map_err(|e| {
            WebConfigError::SerializationError(format!(
                "Failed to parse snapshot '{}': {e}",
                self.path.display()
            ))
        })
    }

    fn save(&self, values: &[SavedValue]) -> WebConfigResult<()> {
        let content = serde_json::to_string_pretty(values)
            .map_err(|e| WebConfigError::SerializationError(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Keeps the snapshot in memory.
///
/// Clones share the same list, so a host (or a test) can keep one handle
/// and inspect what the registry saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<Vec<SavedValue>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `values`.
    pub fn with_values(values: Vec<SavedValue>) -> Self {
        Self {
            values: Rc::new(RefCell::new(values)),
        }
    }

    /// Returns a copy of the stored list.
    pub fn values(&self) -> Vec<SavedValue> {
        self.values.borrow().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> WebConfigResult<Vec<SavedValue>> {
        Ok(self.values())
    }

    fn save(&self, values: &[SavedValue]) -> WebConfigResult<()> {
        *self.values.borrow_mut() = values.to_vec();
        Ok(())
    }
}

fn read_if_exists(path: &Path) -> WebConfigResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
