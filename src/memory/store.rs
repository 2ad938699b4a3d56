//! Process-wide preference store.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Thread-safe key/value memory with list-append semantics.
///
/// Every operation takes the single store lock for its whole duration, so
/// concurrent callers observe some total order of operations. A poisoned lock
/// is recovered rather than propagated: preference access never fails.
#[derive(Debug, Default)]
pub struct PreferenceStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the stored value for `key`, or `default` when absent.
    pub fn get(&self, key: &str, default: Value) -> Value {
        self.lookup(key).unwrap_or(default)
    }

    /// Return the stored value for `key`, if any.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    /// Create or overwrite `key`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries().insert(key.into(), value.into());
    }

    /// Append `value` to the list stored under `key`.
    ///
    /// - absent key: becomes `[value]`
    /// - existing list: `value` is pushed in place
    /// - existing scalar: replaced by `[old, value]`
    ///
    /// The type stored under a key is therefore not stable across mixed
    /// `set`/`append` usage.
    pub fn append(&self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        let mut entries = self.entries();
        match entries.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(Value::Array(vec![value]));
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(items) => items.push(value),
                existing => {
                    let old = existing.take();
                    *existing = Value::Array(vec![old, value]);
                }
            },
        }
    }

    /// Point-in-time copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.entries().clone()
    }

    /// Load a store previously written by [`PreferenceStore::save`].
    ///
    /// A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences file: {}", path.display()))?;
        let entries: BTreeMap<String, Value> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse preferences file: {}", path.display()))?;
        Ok(Self {
            entries: Mutex::new(entries),
        })
    }

    /// Persist the current snapshot as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(&self.snapshot())
            .context("Failed to serialize preferences")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write preferences file: {}", path.display()))
    }
}
