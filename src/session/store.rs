//! Session store: auth token, current user and the loading flag.
//!
//! Reads are synchronous snapshots. Remote-backed writes ([`SessionStore::fetch_user`])
//! are async and never fail towards the caller: every failure path resolves to a
//! cleared session. Token, user and the authenticated flag are mirrored to a
//! [`SessionPersistence`] backend after every change; the loading flag is not.

use crate::errors::Result;
use crate::models::{Group, User, UserPatch};
use crate::storage::{NoPersistence, PersistedSession, SessionPersistence};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

/// Remote source of the current user's profile.
///
/// Implemented by [`crate::http::ApiClient`]; tests plug in scripted sources.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the base profile of the authenticated user.
    async fn current_user(&self) -> Result<User>;

    /// Resolve a group reference to its display record.
    async fn group(&self, group_id: i64) -> Result<Group>;
}

/// Mutable session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            is_authenticated: false,
            is_loading: true,
        }
    }
}

/// Point-in-time copy of the session, safe to hold across awaits.
pub type SessionSnapshot = SessionState;

impl SessionState {
    fn persisted(&self) -> PersistedSession {
        PersistedSession {
            token: self.token.clone(),
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    fn clear(&mut self) {
        self.token = None;
        self.user = None;
        self.is_authenticated = false;
    }

    /// True when a user is loaded and marked blocked.
    pub fn is_blocked(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_blocked)
    }
}

/// Cloneable handle to the process-wide session.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
    persistence: Arc<dyn SessionPersistence>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SessionStore")
            .field("is_authenticated", &state.is_authenticated)
            .field("is_loading", &state.is_loading)
            .field("has_user", &state.user.is_some())
            .finish()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an empty, non-persistent store.
    pub fn new() -> Self {
        Self::with_state(SessionState::default(), Arc::new(NoPersistence))
    }

    /// Rebuild the store from a persistence backend.
    ///
    /// A missing or unreadable record yields an empty session. The loading
    /// flag always starts `true`.
    pub fn restore(persistence: Arc<dyn SessionPersistence>) -> Self {
        let mut state = SessionState::default();
        match persistence.load() {
            Ok(Some(record)) => {
                state.token = record.token.filter(|t| !t.is_empty());
                state.is_authenticated = state.token.is_some();
                state.user = record.user.filter(|_| state.is_authenticated);
                tracing::debug!(
                    authenticated = state.is_authenticated,
                    "restored persisted session"
                );
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("ignoring unreadable session record: {e}"),
        }
        Self::with_state(state, persistence)
    }

    fn with_state(state: SessionState, persistence: Arc<dyn SessionPersistence>) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            persistence,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    /// Store a freshly issued token. An empty token is treated as a logout.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            self.logout();
            return;
        }
        self.write(|state| {
            state.token = Some(token);
            state.is_authenticated = true;
        });
    }

    /// Load the current user's profile.
    ///
    /// Without a token this only marks loading complete. On success the group
    /// display name is resolved best-effort and the merged profile committed.
    /// On failure the session is cleared. `is_loading` is `false` afterwards in
    /// every case.
    pub async fn fetch_user(&self, source: &dyn ProfileSource) {
        if self.token().is_none() {
            self.finish_loading();
            return;
        }

        match source.current_user().await {
            Ok(mut user) => {
                user.group_name = match user.group_id {
                    Some(group_id) => match source.group(group_id).await {
                        Ok(group) => Some(group.name),
                        Err(e) => {
                            tracing::warn!(group_id, "failed to resolve group name: {e}");
                            None
                        }
                    },
                    None => None,
                };
                self.write(|state| {
                    state.user = Some(user);
                    state.is_loading = false;
                });
            }
            Err(e) => {
                tracing::warn!("failed to fetch user profile: {e}");
                self.write(|state| {
                    state.clear();
                    state.is_loading = false;
                });
            }
        }
    }

    /// Merge a partial profile into the loaded user; no-op without a user.
    pub fn update_local_user(&self, patch: UserPatch) {
        if self.state.read().user.is_none() {
            return;
        }
        self.write(|state| {
            if let Some(user) = state.user.as_mut() {
                patch.apply(user);
            }
        });
    }

    /// Clear token, user and the authenticated flag.
    pub fn logout(&self) {
        let mut state = self.state.write();
        state.clear();
        if let Err(e) = self.persistence.clear() {
            tracing::warn!("failed to drop persisted session: {e}");
        }
    }

    /// Mark loading complete without touching anything else.
    pub fn finish_loading(&self) {
        self.state.write().is_loading = false;
    }

    /// Apply `mutate` and mirror the result to persistence.
    ///
    /// The write guard is held until the record is persisted, so durable
    /// writes land in commit order.
    fn write(&self, mutate: impl FnOnce(&mut SessionState)) {
        let mut state = self.state.write();
        mutate(&mut state);
        let record = state.persisted();
        let outcome = if record.is_empty() {
            self.persistence.clear()
        } else {
            self.persistence.save(&record)
        };
        if let Err(e) = outcome {
            tracing::warn!("failed to persist session: {e}");
        }
    }
}
