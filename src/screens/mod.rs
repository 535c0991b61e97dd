//! Headless feature screens.
//!
//! Each screen holds its filter and paging state, reads through the shared
//! [`QueryCache`](crate::query::QueryCache) and reports results as a
//! [`ScreenState`] for reads or a [`Feedback`] for writes. Writes invalidate
//! the read queries they affect.

pub mod admin;
pub mod homework;
pub mod keys;
pub mod profile;
pub mod schedule;
pub mod search;

pub use admin::{AdminScreen, PagedList};
pub use homework::{HomeworkEditor, HomeworkFeed, HomeworkWizard, WizardStep};
pub use profile::{OnboardingScreen, ProfileForm, ProfileScreen};
pub use schedule::{ScheduleScreen, SlotEntry, TimeSlot};
pub use search::{DictionarySearch, SearchKind, WeekScheduleView};

use crate::errors::{ClientError, Result};

/// Message shown for a forbidden write on a single item.
pub const NO_PERMISSION_MESSAGE: &str = "no permission to modify this item";

/// Read state of a screen section.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState<T> {
    Loading,
    /// Inline error with the raw error message.
    Failed { message: String },
    Ready(T),
}

impl<T> ScreenState<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => Self::Failed {
                message: e.to_string(),
            },
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Failed { .. } => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ScreenState<U> {
        match self {
            Self::Loading => ScreenState::Loading,
            Self::Failed { message } => ScreenState::Failed { message },
            Self::Ready(value) => ScreenState::Ready(f(value)),
        }
    }
}

/// Outcome of a write, shown as a toast or banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Error(String),
    /// The backend refused the write for this item.
    NoPermission,
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
            Self::NoPermission => NO_PERMISSION_MESSAGE,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Map a write outcome to feedback. HTTP 403 is a permission denial.
pub fn write_feedback<T>(result: &Result<T>, success: &str) -> Feedback {
    match result {
        Ok(_) => Feedback::Success(success.to_string()),
        Err(e) if e.is_forbidden() => Feedback::NoPermission,
        Err(e) => Feedback::Error(e.to_string()),
    }
}

/// Client-side form checks. Failing input never reaches the network.
pub mod validation {
    use super::*;

    pub const MIN_BROADCAST_LEN: usize = 10;

    pub fn chat_message(message: &str) -> Result<&str> {
        non_empty(message, "message must not be empty")
    }

    pub fn broadcast(message: &str) -> Result<&str> {
        let message = message.trim();
        if message.chars().count() < MIN_BROADCAST_LEN {
            return Err(ClientError::validation(format!(
                "broadcast must be at least {MIN_BROADCAST_LEN} characters"
            )));
        }
        Ok(message)
    }

    pub fn homework_content(content: &str) -> Result<&str> {
        non_empty(content, "homework text must not be empty")
    }

    fn non_empty<'a>(value: &'a str, message: &str) -> Result<&'a str> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ClientError::validation(message));
        }
        Ok(value)
    }
}
