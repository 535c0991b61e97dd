//! Profile settings and first-run group selection.

use super::search::{DictionarySearch, SearchKind};
use super::{keys, write_feedback, Feedback, ScreenState};
use crate::api::SearchTarget;
use crate::http::ApiClient;
use crate::models::{ElectiveList, Group, ProfileUpdate, SettingsUpdate, User};
use crate::query::{QueryCache, QueryKey};
use crate::session::SessionStore;
use std::collections::HashMap;

/// Reminder lead time offered when the user never set one, in minutes.
pub const DEFAULT_REMINDER_MINUTES: u32 = 15;

/// Shown when the onboarding save is refused with 403.
pub const ONBOARDING_FORBIDDEN_MESSAGE: &str =
    "you have no permission to perform this action; your account may be blocked";
const ONBOARDING_FAILED_MESSAGE: &str = "something went wrong, please try again";

/// Editable copy of the user's settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileForm {
    pub subgroup_number: Option<i32>,
    pub notifications_enabled: bool,
    pub reminders_enabled: bool,
    pub reminder_time: u32,
    /// Elective subject name -> tutor id
    pub preferred_tutors: HashMap<String, i64>,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        let settings = &user.settings;
        Self {
            subgroup_number: user.subgroup_number,
            notifications_enabled: settings.notifications_enabled.unwrap_or(false),
            reminders_enabled: settings.reminders_enabled.unwrap_or(false),
            reminder_time: settings.reminder_time.unwrap_or(DEFAULT_REMINDER_MINUTES),
            preferred_tutors: settings.preferred_tutors.clone(),
        }
    }

    pub fn select_tutor(&mut self, subject: impl Into<String>, tutor_id: i64) {
        self.preferred_tutors.insert(subject.into(), tutor_id);
    }

    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            group_id: None,
            subgroup_number: Some(self.subgroup_number),
            settings: Some(SettingsUpdate {
                notifications_enabled: self.notifications_enabled,
                reminders_enabled: self.reminders_enabled,
                reminder_time: self.reminder_time,
            }),
            preferred_tutors: Some(self.preferred_tutors.clone()),
        }
    }
}

pub struct ProfileScreen {
    client: ApiClient,
    cache: QueryCache,
    session: SessionStore,
    form: Option<ProfileForm>,
}

impl ProfileScreen {
    pub fn new(client: ApiClient, cache: QueryCache, session: SessionStore) -> Self {
        Self {
            client,
            cache,
            session,
            form: None,
        }
    }

    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    /// Electives of the user's group; empty without a group.
    pub async fn electives(&self) -> ScreenState<ElectiveList> {
        if !self.session.user().is_some_and(|u| u.has_group()) {
            return ScreenState::Ready(ElectiveList::default());
        }
        let result = self
            .cache
            .fetch(keys::electives(), || self.client.electives())
            .await;
        ScreenState::from_result(result)
    }

    /// Open the settings form seeded from the loaded user.
    pub fn edit(&mut self) -> Option<&mut ProfileForm> {
        let user = self.session.user()?;
        self.form = Some(ProfileForm::from_user(&user));
        self.form.as_mut()
    }

    pub fn form_mut(&mut self) -> Option<&mut ProfileForm> {
        self.form.as_mut()
    }

    pub fn is_editing(&self) -> bool {
        self.form.is_some()
    }

    pub fn cancel(&mut self) {
        self.form = None;
    }

    /// Submit the form. On success the profile is reloaded and cached
    /// schedules are invalidated; on failure the form stays open.
    pub async fn save(&mut self) -> Feedback {
        let Some(form) = self.form.as_ref() else {
            return Feedback::Error("nothing to save".into());
        };

        let result = self.client.update_profile(&form.to_update()).await;
        let feedback = write_feedback(&result, "settings saved");
        if result.is_ok() {
            self.session.fetch_user(&self.client).await;
            self.cache.invalidate(&QueryKey::new(keys::SCHEDULE));
            self.form = None;
        }
        feedback
    }
}

/// Group selection shown to users without a group.
pub struct OnboardingScreen {
    client: ApiClient,
    session: SessionStore,
    search: DictionarySearch,
    selected: Option<Group>,
}

impl OnboardingScreen {
    pub fn new(client: ApiClient, session: SessionStore) -> Self {
        Self {
            search: DictionarySearch::new(client.clone(), SearchKind::Group),
            client,
            session,
            selected: None,
        }
    }

    pub fn search(&mut self) -> &mut DictionarySearch {
        &mut self.search
    }

    pub fn selected(&self) -> Option<&Group> {
        self.selected.as_ref()
    }

    /// Pick a search result. Tutors are not selectable here.
    pub fn select(&mut self, target: &SearchTarget) -> bool {
        match target {
            SearchTarget::Group { id, name } => {
                self.selected = Some(Group {
                    id: *id,
                    name: name.clone(),
                });
                true
            }
            SearchTarget::Tutor { .. } => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Store the selected group and reload the profile.
    pub async fn save(&mut self) -> Feedback {
        let Some(group) = self.selected.as_ref() else {
            return Feedback::Error("select a group first".into());
        };

        let update = ProfileUpdate {
            group_id: Some(group.id),
            ..Default::default()
        };
        match self.client.update_profile(&update).await {
            Ok(()) => {
                self.session.fetch_user(&self.client).await;
                Feedback::Success(format!("group {} saved", group.name))
            }
            Err(e) if e.is_forbidden() => {
                tracing::warn!("group selection refused: {e}");
                Feedback::Error(ONBOARDING_FORBIDDEN_MESSAGE.into())
            }
            Err(e) => {
                tracing::warn!("failed to save group: {e}");
                Feedback::Error(ONBOARDING_FAILED_MESSAGE.into())
            }
        }
    }
}
