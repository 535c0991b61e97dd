//! Top-level screen selection.
//!
//! [`decide`] is a pure ladder over the launch context, the bootstrap outcome
//! and a session snapshot. Each rung is checked only when every rung above it
//! failed, and exactly one [`Screen`] comes out.

use crate::bootstrap::LaunchContext;
use crate::models::User;
use crate::session::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Not running inside the host, or the launch data was rejected.
    InvalidEnvironment,
    Loading,
    /// Offers the "clear local data" action.
    Blocked,
    /// Group selection for users without a group.
    Onboarding,
    Content,
}

/// Everything the gate looks at.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub launch: &'a LaunchContext,
    pub environment_invalid: bool,
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub user: Option<&'a User>,
}

impl<'a> GateInput<'a> {
    pub fn new(
        launch: &'a LaunchContext,
        environment_invalid: bool,
        session: &'a SessionSnapshot,
    ) -> Self {
        Self {
            launch,
            environment_invalid,
            is_loading: session.is_loading,
            is_authenticated: session.is_authenticated,
            user: session.user.as_ref(),
        }
    }
}

pub fn decide(input: &GateInput<'_>) -> Screen {
    if matches!(input.launch, LaunchContext::Missing) || input.environment_invalid {
        return Screen::InvalidEnvironment;
    }
    if matches!(input.launch, LaunchContext::Pending)
        || input.is_loading
        || !input.is_authenticated
    {
        return Screen::Loading;
    }
    if input.user.is_some_and(|u| u.is_blocked) {
        return Screen::Blocked;
    }
    // An authenticated session without a loaded profile also lands here.
    if !input.user.is_some_and(User::has_group) {
        return Screen::Onboarding;
    }
    Screen::Content
}
