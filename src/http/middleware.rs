//! Client-side middleware
//!
//! Cross-cutting request/response policy, so endpoint code never touches auth
//! headers or block detection itself.

use crate::errors::ClientError;
use crate::http::{ApiRequest, ForbiddenScope};
use crate::models::UserPatch;
use crate::session::SessionStore;
use reqwest::RequestBuilder;

/// A step in the request pipeline.
///
/// `on_request` may decorate the outgoing request; `on_failure` may observe a
/// failed call. Neither may replace the error: the caller always receives the
/// original failure.
pub trait Middleware: Send + Sync {
    fn on_request(&self, _request: &ApiRequest, builder: RequestBuilder) -> RequestBuilder {
        builder
    }

    fn on_failure(&self, _request: &ApiRequest, _error: &ClientError) {}
}

/// Adds `Authorization: Bearer <token>` when the session holds a token.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    session: SessionStore,
}

impl BearerAuth {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }
}

impl Middleware for BearerAuth {
    fn on_request(&self, _request: &ApiRequest, builder: RequestBuilder) -> RequestBuilder {
        // Read at send time, not at client construction
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Why a failure was read as a block signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Forbidden,
    DetailMarker,
}

/// Marks the local user blocked when a response carries the block signal.
#[derive(Debug, Clone)]
pub struct BlockDetection {
    session: SessionStore,
}

impl BlockDetection {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Classify a failure. Transport errors without a response never match.
    pub fn block_reason(request: &ApiRequest, error: &ClientError) -> Option<BlockReason> {
        if !matches!(error, ClientError::Http { .. }) {
            return None;
        }
        if error.is_forbidden() && request.forbidden_scope == ForbiddenScope::Account {
            Some(BlockReason::Forbidden)
        } else if error.is_block_marker() {
            Some(BlockReason::DetailMarker)
        } else {
            None
        }
    }
}

impl Middleware for BlockDetection {
    fn on_failure(&self, request: &ApiRequest, error: &ClientError) {
        let Some(reason) = Self::block_reason(request, error) else {
            return;
        };

        tracing::warn!(path = %request.path, ?reason, "user is blocked");

        let already_blocked = self.session.user().is_none_or(|u| u.is_blocked);
        if !already_blocked {
            self.session.update_local_user(UserPatch::blocked());
        }
    }
}
