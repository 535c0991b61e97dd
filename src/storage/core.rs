//! Durable storage for the session record.

use crate::errors::Result;
use crate::models::User;
use serde::{Deserialize, Serialize};

/// Fixed key the session record is stored under.
pub const SESSION_STORAGE_KEY: &str = "user-storage";

/// Trait for session record persistence.
///
/// Mirrors browser local storage: synchronous, a single record per key.
pub trait SessionPersistence: Send + Sync {
    /// Load the stored record; `None` means the client never authenticated.
    fn load(&self) -> Result<Option<PersistedSession>>;

    /// Replace the stored record.
    fn save(&self, session: &PersistedSession) -> Result<()>;

    /// Drop the stored record.
    fn clear(&self) -> Result<()>;
}

/// The persisted subset of the session: the loading flag is never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl PersistedSession {
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none() && !self.is_authenticated
    }
}

/// Persistence that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl SessionPersistence for NoPersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(None)
    }

    fn save(&self, _session: &PersistedSession) -> Result<()> {
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Ok(())
    }
}
