//! Shared builder storage for multi-component access.
//!
//! Provides a thread-safe [`BuilderStore`] that HTTP handlers share for
//! consistent per-session editor state. Every consumer reads a snapshot
//! taken after the previous mutation completed; mutations run one at a
//! time under the write lock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{FormBuilder, FormResult};

/// Default session identifier.
pub const DEFAULT_SESSION: &str = "default";

/// Thread-safe builder storage keyed by session id.
///
/// # Example
///
/// ```
/// use formsmith_core::{BuilderStore, FieldType};
///
/// let store = BuilderStore::new();
/// let id = store
///     .update("default", |builder| Ok(builder.create_field(FieldType::Text)))
///     .unwrap();
/// assert!(store.get("default").unwrap().form().field(&id).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct BuilderStore {
    sessions: Arc<RwLock<HashMap<String, FormBuilder>>>,
}

impl BuilderStore {
    /// Create a store seeded with the default session.
    #[must_use]
    pub fn new() -> Self {
        let mut sessions = HashMap::new();
        sessions.insert(DEFAULT_SESSION.to_string(), FormBuilder::new());
        Self {
            sessions: Arc::new(RwLock::new(sessions)),
        }
    }

    /// Snapshot of a session's builder state, if the session exists.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<FormBuilder> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        sessions.get(session_id).cloned()
    }

    /// Snapshot of a session's builder state, creating the session with
    /// a blank form if it does not exist yet.
    #[must_use]
    pub fn get_or_create(&self, session_id: &str) -> FormBuilder {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        sessions
            .entry(session_id.to_string())
            .or_insert_with(FormBuilder::new)
            .clone()
    }

    /// Replace a session's state wholesale. Creates the session if it
    /// does not exist.
    pub fn replace(&self, session_id: &str, builder: FormBuilder) {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        sessions.insert(session_id.to_string(), builder);
    }

    /// Mutate a session's state under the write lock and pass the
    /// closure's result through.
    ///
    /// The session is created on first use. Builder operations validate
    /// before they mutate, so a returned error means nothing changed.
    ///
    /// # Errors
    ///
    /// Propagates whatever the closure returns.
    pub fn update<T, F>(&self, session_id: &str, f: F) -> FormResult<T>
    where
        F: FnOnce(&mut FormBuilder) -> FormResult<T>,
    {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let builder = sessions
            .entry(session_id.to_string())
            .or_insert_with(FormBuilder::new);
        f(builder)
    }

    /// All session ids currently in the store.
    #[must_use]
    pub fn session_ids(&self) -> Vec<String> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        sessions.keys().cloned().collect()
    }
}

impl Default for BuilderStore {
    fn default() -> Self {
        Self::new()
    }
}
