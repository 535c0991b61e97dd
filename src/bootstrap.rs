//! Launch and authorization bootstrap.
//!
//! An explicit state machine run once per mount:
//!
//! ```text
//! AwaitingLaunchParams ─┬─> Authorizing ──────────┬─> Ready
//!                       ├─> AlreadyAuthenticated ─┘
//!                       └─> InvalidEnvironment
//! ```
//!
//! [`Bootstrap::plan`] is pure: it looks at the host launch context and a
//! session snapshot and names the next [`BootstrapAction`].
//! [`Bootstrap::drive`] executes it. The login exchange runs at most once per
//! mount: it is planned whenever the session is unauthenticated and init data
//! is present, until the first attempt. A restored token the backend no longer
//! accepts falls through to that single exchange.

use crate::errors::Result;
use crate::session::{ProfileSource, SessionSnapshot, SessionStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Host color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeParams {
    #[serde(default)]
    pub color_scheme: Option<ColorScheme>,
}

/// Parameters handed over by the embedding host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    /// Host-signed init data, passed to the backend verbatim.
    #[serde(default)]
    pub init_data_raw: Option<String>,
    #[serde(default)]
    pub theme_params: ThemeParams,
}

impl LaunchParams {
    pub fn with_init_data(init_data: impl Into<String>) -> Self {
        Self {
            init_data_raw: Some(init_data.into()),
            ..Default::default()
        }
    }

    pub fn color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.theme_params.color_scheme = Some(scheme);
        self
    }

    fn init_data(&self) -> Option<&str> {
        self.init_data_raw.as_deref().filter(|raw| !raw.trim().is_empty())
    }
}

/// What the host has provided so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchContext {
    /// The host SDK is still initializing.
    Pending,
    /// Not running inside the host at all.
    Missing,
    Present(LaunchParams),
}

impl LaunchContext {
    pub fn params(&self) -> Option<&LaunchParams> {
        match self {
            Self::Present(params) => Some(params),
            Self::Pending | Self::Missing => None,
        }
    }
}

/// Presentation layer hook for the host theme.
pub trait ThemeSink: Send + Sync {
    fn apply(&self, scheme: ColorScheme);
}

/// Ignores theme changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTheme;

impl ThemeSink for NoTheme {
    fn apply(&self, _scheme: ColorScheme) {}
}

/// Backend operations the bootstrap needs.
#[async_trait]
pub trait AuthBackend: ProfileSource {
    /// Exchange raw init data for a bearer token.
    async fn login(&self, init_data: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapState {
    AwaitingLaunchParams,
    Authorizing,
    AlreadyAuthenticated,
    InvalidEnvironment,
    Ready,
}

impl BootstrapState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::InvalidEnvironment | Self::Ready)
    }
}

/// Next step chosen by [`Bootstrap::plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapAction {
    /// Launch parameters are not available yet.
    Wait,
    /// Exchange init data for a token, then load the profile.
    Login { init_data: String },
    /// A token is held but no profile is loaded.
    FetchProfile,
    /// Launch context is unusable.
    Reject,
    Nothing,
}

#[derive(Debug, Clone)]
pub struct Bootstrap {
    state: BootstrapState,
    login_attempted: bool,
    applied_scheme: Option<ColorScheme>,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new()
    }
}

impl Bootstrap {
    pub fn new() -> Self {
        Self {
            state: BootstrapState::AwaitingLaunchParams,
            login_attempted: false,
            applied_scheme: None,
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn environment_invalid(&self) -> bool {
        self.state == BootstrapState::InvalidEnvironment
    }

    /// Whether the login exchange already ran in this mount.
    pub fn login_attempted(&self) -> bool {
        self.login_attempted
    }

    pub fn plan(&self, launch: &LaunchContext, session: &SessionSnapshot) -> BootstrapAction {
        if self.state == BootstrapState::InvalidEnvironment {
            return BootstrapAction::Nothing;
        }

        let params = match launch {
            LaunchContext::Pending => return BootstrapAction::Wait,
            LaunchContext::Missing => return BootstrapAction::Reject,
            LaunchContext::Present(params) => params,
        };

        if session.is_authenticated {
            return if session.user.is_none() {
                BootstrapAction::FetchProfile
            } else {
                BootstrapAction::Nothing
            };
        }

        if self.login_attempted {
            return BootstrapAction::Nothing;
        }

        match params.init_data() {
            Some(init_data) => BootstrapAction::Login {
                init_data: init_data.to_string(),
            },
            None => BootstrapAction::Reject,
        }
    }

    /// Run one bootstrap step and return the resulting state.
    pub async fn drive<B: AuthBackend>(
        &mut self,
        launch: &LaunchContext,
        session: &SessionStore,
        backend: &B,
        theme: &dyn ThemeSink,
    ) -> BootstrapState {
        if let Some(scheme) = launch.params().and_then(|p| p.theme_params.color_scheme) {
            if self.applied_scheme != Some(scheme) {
                theme.apply(scheme);
                self.applied_scheme = Some(scheme);
            }
        }

        loop {
            let action = self.plan(launch, &session.snapshot());
            tracing::debug!(state = ?self.state, ?action, "bootstrap step");

            match action {
                BootstrapAction::Wait => {}
                BootstrapAction::Reject => self.reject(session),
                BootstrapAction::Login { init_data } => {
                    self.login(&init_data, session, backend).await;
                }
                BootstrapAction::FetchProfile => {
                    self.state = BootstrapState::AlreadyAuthenticated;
                    session.fetch_user(backend).await;
                    self.state = BootstrapState::Ready;
                    // Restored token rejected: plan again from a cleared session.
                    if !session.is_authenticated() {
                        tracing::info!("stored token rejected, re-authorizing");
                        continue;
                    }
                }
                BootstrapAction::Nothing => {
                    if !self.state.is_terminal() {
                        self.state = BootstrapState::Ready;
                    }
                    // A restored profile needs no fetch; loading ends here.
                    if self.state == BootstrapState::Ready {
                        session.finish_loading();
                    }
                }
            }
            return self.state;
        }
    }

    async fn login<B: AuthBackend>(
        &mut self,
        init_data: &str,
        session: &SessionStore,
        backend: &B,
    ) {
        self.state = BootstrapState::Authorizing;
        self.login_attempted = true;
        match backend.login(init_data).await {
            Ok(token) => {
                session.set_token(token);
                session.fetch_user(backend).await;
                self.state = BootstrapState::Ready;
                tracing::info!("authorized with launch init data");
            }
            Err(e) => {
                tracing::warn!("authorization failed: {e}");
                self.reject(session);
            }
        }
    }

    fn reject(&mut self, session: &SessionStore) {
        self.state = BootstrapState::InvalidEnvironment;
        session.finish_loading();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;
    use crate::models::{Group, User, UserSettings};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedBackend {
        token: Option<&'static str>,
        group_id: Option<i64>,
        logins: AtomicUsize,
        profiles: AtomicUsize,
    }

    impl ScriptedBackend {
        fn accepting(group_id: Option<i64>) -> Self {
            Self {
                token: Some("token-1"),
                group_id,
                logins: AtomicUsize::new(0),
                profiles: AtomicUsize::new(0),
            }
        }

        fn rejecting() -> Self {
            Self {
                token: None,
                ..Self::accepting(None)
            }
        }
    }

    #[async_trait]
    impl ProfileSource for ScriptedBackend {
        async fn current_user(&self) -> Result<User> {
            self.profiles.fetch_add(1, Ordering::SeqCst);
            Ok(User {
                telegram_id: 1,
                first_name: Some("Ann".into()),
                username: None,
                is_admin: false,
                is_blocked: false,
                group_id: self.group_id,
                subgroup_number: None,
                settings: UserSettings::default(),
                group_name: None,
            })
        }

        async fn group(&self, group_id: i64) -> Result<Group> {
            Ok(Group {
                id: group_id,
                name: "MPB-301".into(),
            })
        }
    }

    #[async_trait]
    impl AuthBackend for ScriptedBackend {
        async fn login(&self, _init_data: &str) -> Result<String> {
            self.logins.fetch_add(1, Ordering::SeqCst);
            self.token
                .map(str::to_string)
                .ok_or_else(|| ClientError::auth("HTTP 401: invalid init data"))
        }
    }

    /// Rejects every token except the one its own login issued.
    struct ExpiringBackend {
        inner: ScriptedBackend,
    }

    #[async_trait]
    impl ProfileSource for ExpiringBackend {
        async fn current_user(&self) -> Result<User> {
            if self.inner.logins.load(Ordering::SeqCst) == 0 {
                return Err(ClientError::from_response(401, r#"{"detail":"expired"}"#.into()));
            }
            self.inner.current_user().await
        }

        async fn group(&self, group_id: i64) -> Result<Group> {
            self.inner.group(group_id).await
        }
    }

    #[async_trait]
    impl AuthBackend for ExpiringBackend {
        async fn login(&self, init_data: &str) -> Result<String> {
            self.inner.login(init_data).await
        }
    }

    #[derive(Default)]
    struct RecordingTheme(Mutex<Vec<ColorScheme>>);

    impl ThemeSink for RecordingTheme {
        fn apply(&self, scheme: ColorScheme) {
            self.0.lock().push(scheme);
        }
    }

    fn present(init_data: &str) -> LaunchContext {
        LaunchContext::Present(LaunchParams::with_init_data(init_data))
    }

    #[tokio::test]
    async fn test_pending_launch_waits() {
        let mut bootstrap = Bootstrap::new();
        let session = SessionStore::new();
        let backend = ScriptedBackend::accepting(Some(7));

        let state = bootstrap
            .drive(&LaunchContext::Pending, &session, &backend, &NoTheme)
            .await;

        assert_eq!(state, BootstrapState::AwaitingLaunchParams);
        assert!(session.is_loading());
        assert_eq!(backend.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_then_profile() {
        let mut bootstrap = Bootstrap::new();
        let session = SessionStore::new();
        let backend = ScriptedBackend::accepting(Some(7));

        let state = bootstrap
            .drive(&present("query_id=1"), &session, &backend, &NoTheme)
            .await;

        assert_eq!(state, BootstrapState::Ready);
        assert_eq!(session.token().as_deref(), Some("token-1"));
        let user = session.user().unwrap();
        assert_eq!(user.group_name.as_deref(), Some("MPB-301"));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_rejected_login_is_invalid_environment() {
        let mut bootstrap = Bootstrap::new();
        let session = SessionStore::new();
        let backend = ScriptedBackend::rejecting();

        let state = bootstrap
            .drive(&present("expired"), &session, &backend, &NoTheme)
            .await;

        assert_eq!(state, BootstrapState::InvalidEnvironment);
        assert!(!session.is_loading());
        assert!(!session.is_authenticated());

        // Terminal: later triggers do nothing.
        bootstrap
            .drive(&present("expired"), &session, &backend, &NoTheme)
            .await;
        assert_eq!(backend.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_init_data_rejects_without_network() {
        let mut bootstrap = Bootstrap::new();
        let session = SessionStore::new();
        let backend = ScriptedBackend::accepting(None);

        let state = bootstrap
            .drive(&present("  "), &session, &backend, &NoTheme)
            .await;
        assert_eq!(state, BootstrapState::InvalidEnvironment);

        let mut other = Bootstrap::new();
        let state = other
            .drive(&LaunchContext::Missing, &session, &backend, &NoTheme)
            .await;
        assert_eq!(state, BootstrapState::InvalidEnvironment);
        assert_eq!(backend.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restored_token_skips_login() {
        let mut bootstrap = Bootstrap::new();
        let session = SessionStore::new();
        session.set_token("persisted");
        let backend = ScriptedBackend::accepting(Some(7));

        let state = bootstrap
            .drive(&present("query_id=1"), &session, &backend, &NoTheme)
            .await;

        assert_eq!(state, BootstrapState::Ready);
        assert_eq!(backend.logins.load(Ordering::SeqCst), 0);
        assert_eq!(backend.profiles.load(Ordering::SeqCst), 1);

        // Profile already loaded: nothing more to do.
        bootstrap
            .drive(&present("query_id=1"), &session, &backend, &NoTheme)
            .await;
        assert_eq!(backend.profiles.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_restored_token_falls_back_to_login() {
        let mut bootstrap = Bootstrap::new();
        let session = SessionStore::new();
        session.set_token("expired");
        let backend = ExpiringBackend {
            inner: ScriptedBackend::accepting(Some(7)),
        };

        let state = bootstrap
            .drive(&present("query_id=1"), &session, &backend, &NoTheme)
            .await;

        assert_eq!(state, BootstrapState::Ready);
        assert!(bootstrap.login_attempted());
        assert_eq!(backend.inner.logins.load(Ordering::SeqCst), 1);
        assert_eq!(session.token().as_deref(), Some("token-1"));
        assert!(session.user().is_some());
        assert!(!session.is_loading());

        bootstrap
            .drive(&present("query_id=1"), &session, &backend, &NoTheme)
            .await;
        assert_eq!(backend.inner.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_restored_token_without_init_data() {
        let mut bootstrap = Bootstrap::new();
        let session = SessionStore::new();
        session.set_token("expired");
        let backend = ExpiringBackend {
            inner: ScriptedBackend::accepting(Some(7)),
        };

        let launch = LaunchContext::Present(LaunchParams::default());

        let state = bootstrap.drive(&launch, &session, &backend, &NoTheme).await;

        assert_eq!(state, BootstrapState::InvalidEnvironment);
        assert_eq!(backend.inner.logins.load(Ordering::SeqCst), 0);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_no_second_login_after_logout() {
        let mut bootstrap = Bootstrap::new();
        let session = SessionStore::new();
        let backend = ScriptedBackend::accepting(Some(7));
        let launch = present("query_id=1");

        bootstrap.drive(&launch, &session, &backend, &NoTheme).await;
        session.logout();
        let state = bootstrap.drive(&launch, &session, &backend, &NoTheme).await;

        assert_eq!(state, BootstrapState::Ready);
        assert_eq!(backend.logins.load(Ordering::SeqCst), 1);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_theme_applied_once_per_change() {
        let mut bootstrap = Bootstrap::new();
        let session = SessionStore::new();
        let backend = ScriptedBackend::accepting(Some(7));
        let theme = RecordingTheme::default();
        let launch = LaunchContext::Present(
            LaunchParams::with_init_data("query_id=1").color_scheme(ColorScheme::Dark),
        );

        bootstrap.drive(&launch, &session, &backend, &theme).await;
        bootstrap.drive(&launch, &session, &backend, &theme).await;

        assert_eq!(*theme.0.lock(), vec![ColorScheme::Dark]);
    }

    #[test]
    fn test_plan_is_pure() {
        let bootstrap = Bootstrap::new();
        let snapshot = SessionSnapshot::default();
        let launch = present("query_id=1");

        let first = bootstrap.plan(&launch, &snapshot);
        let second = bootstrap.plan(&launch, &snapshot);
        assert_eq!(first, second);
        assert_eq!(
            first,
            BootstrapAction::Login {
                init_data: "query_id=1".into()
            }
        );
        assert_eq!(bootstrap.state(), BootstrapState::AwaitingLaunchParams);
    }
}
