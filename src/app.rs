//! Application context.
//!
//! [`MiniApp`] owns the one session store, the API client, the query cache and
//! the bootstrap machine, and hands clones of them to the screens. It is the
//! explicit context every component goes through; nothing here is global.

use crate::bootstrap::{Bootstrap, BootstrapState, LaunchContext, NoTheme, ThemeSink};
use crate::config::ClientConfig;
use crate::errors::Result;
use crate::gate::{decide, GateInput, Screen};
use crate::http::ApiClient;
use crate::query::QueryCache;
use crate::screens::{
    AdminScreen, DictionarySearch, HomeworkEditor, HomeworkFeed, HomeworkWizard,
    OnboardingScreen, ProfileScreen, ScheduleScreen, SearchKind, WeekScheduleView,
};
use crate::api::SearchTarget;
use crate::session::SessionStore;
use crate::storage::{FilePersistence, MemoryPersistence, SessionPersistence};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Message of the recovery screen when a panic carried no text.
const GENERIC_FAILURE: &str = "something went wrong";

/// Rendered top-level view.
#[derive(Debug, Clone, PartialEq)]
pub enum View<T> {
    InvalidEnvironment,
    Loading,
    Blocked,
    Onboarding,
    Content(T),
    /// Content production failed; the host should offer a retry.
    Recovery { message: String },
}

pub struct MiniApp {
    session: SessionStore,
    client: ApiClient,
    cache: QueryCache,
    bootstrap: Mutex<Bootstrap>,
    bootstrap_state: RwLock<BootstrapState>,
    launch: RwLock<LaunchContext>,
    theme: Arc<dyn ThemeSink>,
}

impl std::fmt::Debug for MiniApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniApp")
            .field("session", &self.session)
            .field("bootstrap", &*self.bootstrap_state.read())
            .finish()
    }
}

impl MiniApp {
    /// Build the context, restoring any session kept by `persistence`.
    pub fn new(config: ClientConfig, persistence: Arc<dyn SessionPersistence>) -> Result<Self> {
        let session = SessionStore::restore(persistence);
        let client = ApiClient::new(config, session.clone())?;
        Ok(Self {
            session,
            client,
            cache: QueryCache::new(),
            bootstrap: Mutex::new(Bootstrap::new()),
            bootstrap_state: RwLock::new(BootstrapState::AwaitingLaunchParams),
            launch: RwLock::new(LaunchContext::Pending),
            theme: Arc::new(NoTheme),
        })
    }

    /// Build the context with file persistence under `storage_dir`, or an
    /// in-memory record when none is configured.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let persistence: Arc<dyn SessionPersistence> = match &config.storage_dir {
            Some(dir) => Arc::new(FilePersistence::in_dir(dir)),
            None => Arc::new(MemoryPersistence::new()),
        };
        Self::new(config, persistence)
    }

    pub fn with_theme(mut self, theme: Arc<dyn ThemeSink>) -> Self {
        self.theme = theme;
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn bootstrap_state(&self) -> BootstrapState {
        *self.bootstrap_state.read()
    }

    /// Record what the host provided and run the bootstrap.
    pub async fn launch(&self, launch: LaunchContext) -> BootstrapState {
        *self.launch.write() = launch;
        self.start().await
    }

    /// Drive the bootstrap with the current launch context.
    ///
    /// Calls are serialized; a call arriving while a login exchange runs
    /// observes its outcome instead of starting another.
    pub async fn start(&self) -> BootstrapState {
        let mut bootstrap = self.bootstrap.lock().await;
        let launch = self.launch.read().clone();
        let state = bootstrap
            .drive(&launch, &self.session, &self.client, self.theme.as_ref())
            .await;
        *self.bootstrap_state.write() = state;
        state
    }

    /// Which top-level screen to show right now.
    pub fn screen(&self) -> Screen {
        let launch = self.launch.read();
        let snapshot = self.session.snapshot();
        let environment_invalid = self.bootstrap_state() == BootstrapState::InvalidEnvironment;
        decide(&GateInput::new(&launch, environment_invalid, &snapshot))
    }

    /// Evaluate the gate and, for content, run `content` behind an error
    /// boundary. A panic becomes [`View::Recovery`].
    pub fn render<T>(&self, content: impl FnOnce(&Self) -> T) -> View<T> {
        match self.screen() {
            Screen::InvalidEnvironment => View::InvalidEnvironment,
            Screen::Loading => View::Loading,
            Screen::Blocked => View::Blocked,
            Screen::Onboarding => View::Onboarding,
            Screen::Content => match catch_unwind(AssertUnwindSafe(|| content(self))) {
                Ok(view) => View::Content(view),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!("render failed: {message}");
                    View::Recovery { message }
                }
            },
        }
    }

    /// Blocked-screen action: drop the session and every cached response.
    pub fn clear_local_data(&self) {
        self.session.logout();
        self.cache.clear();
        tracing::info!("local data cleared");
    }

    pub fn schedule(&self, date: NaiveDate) -> ScheduleScreen {
        ScheduleScreen::new(self.client.clone(), self.cache.clone(), date)
    }

    pub fn dictionary_search(&self, kind: SearchKind) -> DictionarySearch {
        DictionarySearch::new(self.client.clone(), kind)
    }

    pub fn week_schedule(&self, target: SearchTarget, today: NaiveDate) -> WeekScheduleView {
        WeekScheduleView::new(self.client.clone(), self.cache.clone(), target, today)
    }

    pub fn homework_feed(&self) -> HomeworkFeed {
        HomeworkFeed::new(self.client.clone(), self.cache.clone())
    }

    pub fn homework_editor(&self, lesson_id: i64) -> HomeworkEditor {
        let user = self.session.user();
        HomeworkEditor::new(self.client.clone(), self.cache.clone(), lesson_id, user.as_ref())
    }

    pub fn homework_wizard(&self, today: NaiveDate) -> HomeworkWizard {
        HomeworkWizard::new(self.client.clone(), self.cache.clone(), today)
    }

    pub fn profile(&self) -> ProfileScreen {
        ProfileScreen::new(self.client.clone(), self.cache.clone(), self.session.clone())
    }

    pub fn onboarding(&self) -> OnboardingScreen {
        OnboardingScreen::new(self.client.clone(), self.session.clone())
    }

    pub fn admin(&self) -> AdminScreen {
        AdminScreen::new(self.client.clone(), self.cache.clone())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}
