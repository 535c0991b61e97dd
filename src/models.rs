//! Wire types shared by the session store, the API layer and the screens.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-user notification and elective settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders_enabled: Option<bool>,
    /// Minutes before a lesson the reminder fires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<u32>,
    /// Elective subject name -> preferred tutor id
    #[serde(default)]
    pub preferred_tutors: HashMap<String, i64>,
}

/// The current user's profile as returned by `/profile/me`, plus the resolved group name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub telegram_id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub subgroup_number: Option<i32>,
    #[serde(default)]
    pub settings: UserSettings,
    /// Filled client-side from `/dicts/groups/{id}`
    #[serde(default)]
    pub group_name: Option<String>,
}

impl User {
    /// Name to show in headers: first name, then username, then the numeric id.
    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| self.telegram_id.to_string())
    }

    pub fn has_group(&self) -> bool {
        self.group_id.is_some()
    }
}

/// Partial update applied by [`crate::session::SessionStore::update_local_user`].
///
/// Nested options distinguish "leave unchanged" (`None`) from "set to absent"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub first_name: Option<Option<String>>,
    pub username: Option<Option<String>>,
    pub is_admin: Option<bool>,
    pub is_blocked: Option<bool>,
    pub group_id: Option<Option<i64>>,
    pub subgroup_number: Option<Option<i32>>,
    pub settings: Option<UserSettings>,
    pub group_name: Option<Option<String>>,
}

impl UserPatch {
    /// Patch marking the user as blocked.
    pub fn blocked() -> Self {
        Self {
            is_blocked: Some(true),
            ..Default::default()
        }
    }

    pub fn apply(self, user: &mut User) {
        if let Some(v) = self.first_name {
            user.first_name = v;
        }
        if let Some(v) = self.username {
            user.username = v;
        }
        if let Some(v) = self.is_admin {
            user.is_admin = v;
        }
        if let Some(v) = self.is_blocked {
            user.is_blocked = v;
        }
        if let Some(v) = self.group_id {
            user.group_id = v;
        }
        if let Some(v) = self.subgroup_number {
            user.subgroup_number = v;
        }
        if let Some(v) = self.settings {
            user.settings = v;
        }
        if let Some(v) = self.group_name {
            user.group_name = v;
        }
    }
}

/// Paginated envelope used by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Number of the following page, if the backend has more items.
    pub fn next_page(&self) -> Option<u32> {
        if self.size == 0 {
            return None;
        }
        (u64::from(self.page) * u64::from(self.size) < self.total).then(|| self.page + 1)
    }

    /// Number of pages the backend reports, for numbered pagers.
    pub fn total_pages(&self) -> u32 {
        if self.size == 0 {
            return 0;
        }
        u32::try_from(self.total.div_ceil(u64::from(self.size))).unwrap_or(u32::MAX)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub init_data: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tutor {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub subject_name: String,
    pub lesson_type: String,
    pub tutor: NamedRef,
    pub auditory: NamedRef,
    pub time_slot: u8,
    /// Present on search results, absent on the user's own schedule
    #[serde(default)]
    pub group: Option<Group>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: chrono::NaiveDate,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elective {
    pub subject_name: String,
    pub tutors: Vec<Tutor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectiveList {
    pub items: Vec<Elective>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Author {
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("unknown")
    }
}

/// Homework attached to one lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Homework {
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub author: Author,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkLesson {
    pub subject_name: String,
    pub date: chrono::NaiveDate,
}

/// Row of the "my homework" feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkItem {
    pub id: i64,
    pub content: String,
    pub lesson_source_id: i64,
    pub lesson: HomeworkLesson,
    pub author: Author,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub telegram_id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub chat_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub group_id: Option<i64>,
}

/// Body of `PUT /profile/me`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    /// `Some(None)` clears the subgroup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subgroup_number: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_tutors: Option<HashMap<String, i64>>,
}

/// The `settings` object of a profile update. Tutor preferences travel in
/// [`ProfileUpdate::preferred_tutors`] only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SettingsUpdate {
    pub notifications_enabled: bool,
    pub reminders_enabled: bool,
    pub reminder_time: u32,
}
