//! Per-session preference overlay.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

type Sessions = HashMap<String, HashMap<String, Value>>;

/// Session-scoped values keyed by session id.
///
/// Independent from [`super::PreferenceStore`]; lookups here never merge with
/// the process-wide store, the caller decides which tier wins.
#[derive(Debug, Default)]
pub struct SessionOverlay {
    sessions: Mutex<Sessions>,
}

impl SessionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Value stored for `key` in `session_id`, or `default`.
    pub fn get(&self, session_id: &str, key: &str, default: Value) -> Value {
        self.lookup(session_id, key).unwrap_or(default)
    }

    pub fn lookup(&self, session_id: &str, key: &str) -> Option<Value> {
        self.sessions()
            .get(session_id)
            .and_then(|session| session.get(key))
            .cloned()
    }

    /// Create or overwrite `key` within `session_id`, creating the session.
    pub fn set(&self, session_id: &str, key: impl Into<String>, value: impl Into<Value>) {
        self.sessions()
            .entry(session_id.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Deep copy of every session, ordered by session id then key.
    pub fn dump(&self) -> BTreeMap<String, BTreeMap<String, Value>> {
        self.sessions()
            .iter()
            .map(|(id, values)| {
                let values = values
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                (id.clone(), values)
            })
            .collect()
    }
}
