//! In-memory session persistence.
//!
//! Keeps the serialized record in process memory. Useful for tests and for
//! embedding the client where the host owns persistence.

use crate::{
    errors::{Result, StorageError},
    storage::{PersistedSession, SessionPersistence},
};
use parking_lot::Mutex;
use std::sync::Arc;

/// In-memory persistence backend
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    // Stored as JSON so a round trip exercises the same encoding as the file backend
    record: Arc<Mutex<Option<String>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-seeded with `session`, as if written by an earlier run.
    pub fn with_session(session: &PersistedSession) -> Result<Self> {
        let storage = Self::new();
        storage.save(session)?;
        Ok(storage)
    }

    /// Raw stored JSON, if any.
    pub fn raw(&self) -> Option<String> {
        self.record.lock().clone()
    }
}

impl SessionPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        let guard = self.record.lock();
        match guard.as_deref() {
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| StorageError::serialization(e.to_string()).into()),
            None => Ok(None),
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        let raw = serde_json::to_string(session)
            .map_err(|e| StorageError::serialization(e.to_string()))?;
        *self.record.lock() = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.record.lock().take();
        Ok(())
    }
}
