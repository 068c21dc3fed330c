//! Persisted workflow state
//!
//! A single state token (and, while paused, the config reference) is kept in
//! a key-value [`StateStore`]. The real backend is the repository's local git
//! config; tests substitute [`MemoryStore`].

mod storage;

pub use storage::{GitConfigStore, STATE_SECTION};

use crate::config::ConfigRef;
use crate::error::Result;
use crate::types::WorkflowState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Key holding the workflow state token
pub const STATE_KEY: &str = "state";

/// Key holding the config reference of a paused run
pub const CONFIG_PATH_KEY: &str = "config-path";

/// Minimal key-value persistence used for workflow state
pub trait StateStore: Send + Sync {
    /// Read a value, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing an absent key is not an error
    fn clear(&self, key: &str) -> Result<()>;
}

/// In-memory store, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // a poisoned map is still a consistent map of strings
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

/// Typed access to the workflow state held in a [`StateStore`]
pub struct StateTracker {
    store: Box<dyn StateStore>,
}

impl StateTracker {
    /// Wrap a store
    pub fn new(store: Box<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Current state; a missing token means [`WorkflowState::Unset`]
    ///
    /// An unrecognised token is an error, never coerced.
    pub fn load(&self) -> Result<WorkflowState> {
        self.store
            .get(STATE_KEY)?
            .map_or(Ok(WorkflowState::Unset), |token| token.parse())
    }

    /// Persist a new state
    pub fn set(&self, state: WorkflowState) -> Result<()> {
        debug!(%state, "workflow state");
        self.store.set(STATE_KEY, state.as_str())
    }

    /// Persist the paused state together with the config reference in effect
    pub fn pause(&self, config_ref: Option<&ConfigRef>) -> Result<()> {
        if let Some(config_ref) = config_ref {
            self.store.set(CONFIG_PATH_KEY, &config_ref.to_string())?;
        }
        self.set(WorkflowState::BackportPaused)
    }

    /// Config reference remembered by a paused run
    pub fn config_ref(&self) -> Result<Option<String>> {
        self.store.get(CONFIG_PATH_KEY)
    }

    /// Remove both the state and the config reference
    pub fn reset(&self) -> Result<()> {
        self.store.clear(CONFIG_PATH_KEY)?;
        self.store.clear(STATE_KEY)
    }
}

impl std::fmt::Debug for StateTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateTracker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn tracker() -> (MemoryStore, StateTracker) {
        let store = MemoryStore::new();
        let tracker = StateTracker::new(Box::new(store.clone()));
        (store, tracker)
    }

    #[test]
    fn test_missing_state_is_unset() {
        let (_, tracker) = tracker();
        assert_eq!(tracker.load().unwrap(), WorkflowState::Unset);
    }

    #[test]
    fn test_set_and_load() {
        let (store, tracker) = tracker();
        tracker.set(WorkflowState::FetchingUpstream).unwrap();
        assert_eq!(tracker.load().unwrap(), WorkflowState::FetchingUpstream);
        assert_eq!(
            store.get(STATE_KEY).unwrap().as_deref(),
            Some("FETCHING_UPSTREAM")
        );
    }

    #[test]
    fn test_unknown_token_is_an_error() {
        let (store, tracker) = tracker();
        store.set(STATE_KEY, "FROM_THE_FUTURE").unwrap();
        assert!(matches!(tracker.load(), Err(Error::UnknownState(_))));
    }

    #[test]
    fn test_pause_remembers_config_ref() {
        let (store, tracker) = tracker();
        let config_ref: ConfigRef = "abc123:.cherry_picker.toml".parse().unwrap();
        tracker.pause(Some(&config_ref)).unwrap();

        assert_eq!(tracker.load().unwrap(), WorkflowState::BackportPaused);
        assert_eq!(
            store.get(CONFIG_PATH_KEY).unwrap().as_deref(),
            Some("abc123:.cherry_picker.toml")
        );
    }

    #[test]
    fn test_reset_removes_both_keys() {
        let (store, tracker) = tracker();
        let config_ref: ConfigRef = "abc123:x.toml".parse().unwrap();
        tracker.pause(Some(&config_ref)).unwrap();
        tracker.reset().unwrap();

        assert_eq!(store.get(STATE_KEY).unwrap(), None);
        assert_eq!(store.get(CONFIG_PATH_KEY).unwrap(), None);
        // resetting twice is fine
        tracker.reset().unwrap();
    }
}
