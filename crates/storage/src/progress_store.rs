use std::sync::Arc;

use greeting_core::Clock;
use greeting_core::model::ProgressState;
use tracing::{debug, warn};

use crate::repository::{InMemoryStore, KeyValueStore, StorageError, validate_key};
use crate::snapshot::SnapshotDocument;

/// Fixed key the progress snapshot lives under.
pub const PROGRESS_KEY: &str = "greetingProgress";

/// Loads and saves the progress snapshot on top of any `KeyValueStore`.
///
/// `load` and `save` never fail: a missing or unreadable snapshot loads as empty
/// progress, and a failed write is logged and dropped. The in-memory state stays
/// authoritative for the session either way.
#[derive(Clone)]
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    clock: Clock,
}

impl ProgressStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self {
            store,
            key: PROGRESS_KEY.to_string(),
            clock,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), clock)
    }

    /// Keep the snapshot under `key` instead of `PROGRESS_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` if no backend could store `key`.
    pub fn with_key(mut self, key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        validate_key(&key)?;
        self.key = key;
        Ok(self)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Moves a fixed clock forward; a system clock ignores it.
    pub fn advance_clock(&mut self, delta: chrono::Duration) {
        self.clock.advance(delta);
    }

    /// Load the snapshot, falling back to empty progress.
    #[must_use]
    pub fn load(&self) -> ProgressState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                debug!(key = %self.key, "no progress snapshot, starting fresh");
                ProgressState::new()
            }
            Err(err) => {
                warn!(key = %self.key, %err, "discarding unreadable progress snapshot");
                ProgressState::new()
            }
        }
    }

    /// Persist `state`, logging and swallowing any failure.
    pub fn save(&self, state: &ProgressState) {
        if let Err(err) = self.try_save(state) {
            warn!(key = %self.key, %err, "failed to persist progress snapshot");
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the stored document is malformed.
    pub fn try_load(&self) -> Result<Option<ProgressState>, StorageError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let document: SnapshotDocument = serde_json::from_str(&raw)?;
        Ok(Some(document.into_state()))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the backend write fails.
    pub fn try_save(&self, state: &ProgressState) -> Result<(), StorageError> {
        let document = SnapshotDocument::from_state(state, self.clock.now());
        let raw = serde_json::to_string(&document)?;
        self.store.set(&self.key, &raw)?;
        debug!(key = %self.key, bytes = raw.len(), "progress snapshot saved");
        Ok(())
    }

    /// Remove the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greeting_core::model::SectionId;
    use greeting_core::time::{fixed_clock, fixed_now};

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("quota exceeded".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("unavailable".into()))
        }
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let store = ProgressStore::in_memory(fixed_clock());
        assert_eq!(store.load(), ProgressState::new());
    }

    #[test]
    fn malformed_snapshot_loads_empty() {
        let backend = InMemoryStore::new();
        backend.set(PROGRESS_KEY, "{not json").unwrap();
        let store = ProgressStore::new(Arc::new(backend), fixed_clock());

        assert!(store.try_load().is_err());
        assert_eq!(store.load(), ProgressState::new());
    }

    #[test]
    fn wrong_shape_loads_empty() {
        let backend = InMemoryStore::new();
        backend
            .set(PROGRESS_KEY, r#"{"visitedSections": 42}"#)
            .unwrap();
        let store = ProgressStore::new(Arc::new(backend), fixed_clock());
        assert_eq!(store.load(), ProgressState::new());
    }

    #[test]
    fn failing_backend_is_absorbed() {
        let store = ProgressStore::new(Arc::new(FailingStore), fixed_clock());
        let mut state = ProgressState::new();
        state.visit(SectionId::Gallery);

        store.save(&state);
        assert_eq!(store.load(), ProgressState::new());
        assert!(store.try_save(&state).is_err());
    }

    #[test]
    fn save_stamps_last_visit() {
        let store = ProgressStore::in_memory(fixed_clock());
        store.save(&ProgressState::new());
        let loaded = store.load();
        assert_eq!(loaded.last_visit(), Some(fixed_now()));
    }

    #[test]
    fn custom_key_is_isolated() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        let a = ProgressStore::new(Arc::clone(&backend), fixed_clock());
        let b = ProgressStore::new(Arc::clone(&backend), fixed_clock()).with_key("other")
            .unwrap();

        let mut state = ProgressState::new();
        state.visit(SectionId::Wishes);
        a.save(&state);

        assert!(b.load().visited_sections().is_empty());
        assert!(a.load().has_visited(SectionId::Wishes));
    }

    #[test]
    fn unstorable_key_is_refused_up_front() {
        let store = ProgressStore::in_memory(fixed_clock());
        assert!(matches!(
            store.with_key("saves/progress"),
            Err(StorageError::InvalidKey(key)) if key == "saves/progress"
        ));
    }

    #[test]
    fn advanced_clock_stamps_next_save() {
        let mut store = ProgressStore::in_memory(fixed_clock());
        store.advance_clock(chrono::Duration::minutes(5));
        store.save(&ProgressState::new());
        assert_eq!(
            store.load().last_visit(),
            Some(fixed_now() + chrono::Duration::minutes(5))
        );
    }
}
