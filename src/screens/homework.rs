//! Homework feed, the per-lesson homework editor and the create wizard.

use super::{keys, validation, write_feedback, Feedback, ScreenState};
use crate::api::HomeworkQuery;
use crate::errors::{ClientError, Result};
use crate::http::ApiClient;
use crate::models::{Homework, HomeworkItem, Lesson, User};
use crate::query::{Debounced, InfiniteQuery, QueryCache, QueryKey};
use chrono::{Days, NaiveDate};

/// How far ahead the wizard lets a lesson date be picked.
pub const WIZARD_MAX_DAYS_AHEAD: u64 = 14;

/// Filtered, incrementally loaded list of the user's homework.
pub struct HomeworkFeed {
    client: ApiClient,
    cache: QueryCache,
    query: HomeworkQuery,
    pages: InfiniteQuery<HomeworkItem>,
}

impl HomeworkFeed {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        let size = client.config().page_sizes.homework;
        Self {
            client,
            cache,
            query: HomeworkQuery::default(),
            pages: InfiniteQuery::new(size),
        }
    }

    pub fn query(&self) -> &HomeworkQuery {
        &self.query
    }

    pub fn items(&self) -> impl Iterator<Item = &HomeworkItem> {
        self.pages.items()
    }

    pub fn has_more(&self) -> bool {
        self.pages.pages_loaded() > 0 && self.pages.has_next_page()
    }

    /// Replace the filters and reload from the first page.
    pub async fn apply(&mut self, query: HomeworkQuery) -> ScreenState<()> {
        self.query = query;
        self.refresh().await
    }

    pub async fn refresh(&mut self) -> ScreenState<()> {
        self.pages.reset();
        let result = self.load_next().await;
        ScreenState::from_result(result.map(drop))
    }

    pub async fn on_sentinel_visible(&mut self) -> Result<bool> {
        if self.pages.pages_loaded() == 0 {
            return Ok(false);
        }
        self.load_next().await
    }

    /// Wait for the next settled subject search and reload with it.
    pub async fn next_debounced(
        &mut self,
        input: &mut Debounced<String>,
    ) -> Option<ScreenState<()>> {
        let search = input.next().await?;
        let query = HomeworkQuery {
            subject_search: search,
            ..self.query.clone()
        };
        Some(self.apply(query).await)
    }

    async fn load_next(&mut self) -> Result<bool> {
        let (client, cache, query) = (&self.client, &self.cache, &self.query);
        self.pages
            .fetch_next(|page, size| async move {
                cache
                    .fetch(keys::my_homework(query, page), || {
                        client.my_homework(query, page, size)
                    })
                    .await
            })
            .await
    }
}

/// Homework of one lesson, editable by users with a group.
pub struct HomeworkEditor {
    client: ApiClient,
    cache: QueryCache,
    lesson_id: i64,
    can_edit: bool,
    text: String,
}

impl HomeworkEditor {
    pub fn new(client: ApiClient, cache: QueryCache, lesson_id: i64, user: Option<&User>) -> Self {
        Self {
            client,
            cache,
            lesson_id,
            can_edit: user.is_some_and(User::has_group),
            text: String::new(),
        }
    }

    pub fn can_edit(&self) -> bool {
        self.can_edit
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    fn key(&self) -> QueryKey {
        keys::lesson_homework(self.lesson_id)
    }

    /// Load the current homework and seed the text field with it.
    pub async fn open(&mut self) -> ScreenState<Option<Homework>> {
        let (client, lesson_id) = (&self.client, self.lesson_id);
        let result = self
            .cache
            .fetch(self.key(), || client.lesson_homework(lesson_id))
            .await;
        if let Ok(homework) = &result {
            self.text = homework.as_ref().map(|h| h.content.clone()).unwrap_or_default();
        }
        ScreenState::from_result(result)
    }

    /// Save the text. On failure the text is kept for another attempt.
    pub async fn save(&mut self) -> Feedback {
        if !self.can_edit {
            return Feedback::Error("select your group in the profile to edit homework".into());
        }
        let content = match validation::homework_content(&self.text) {
            Ok(content) => content.to_string(),
            Err(e) => return Feedback::Error(e.to_string()),
        };

        let result = self.client.save_lesson_homework(self.lesson_id, &content).await;
        let feedback = write_feedback(&result, "homework saved");
        match result {
            Ok(saved) => {
                self.text = saved.content.clone();
                self.cache.set(self.key(), Some(saved));
                self.cache.invalidate(&QueryKey::new(keys::MY_HOMEWORK));
            }
            Err(e) => tracing::warn!(lesson_id = self.lesson_id, "homework save failed: {e}"),
        }
        feedback
    }
}

/// Steps of [`HomeworkWizard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    Date,
    Lesson,
    Text,
}

/// Three-step homework creation: pick a date, one of that day's lessons, then
/// write the text.
pub struct HomeworkWizard {
    client: ApiClient,
    cache: QueryCache,
    today: NaiveDate,
    step: WizardStep,
    date: Option<NaiveDate>,
    lesson: Option<Lesson>,
    text: String,
}

impl HomeworkWizard {
    pub fn new(client: ApiClient, cache: QueryCache, today: NaiveDate) -> Self {
        Self {
            client,
            cache,
            today,
            step: WizardStep::Date,
            date: None,
            lesson: None,
            text: String::new(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn lesson(&self) -> Option<&Lesson> {
        self.lesson.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Latest date the calendar offers.
    pub fn latest_date(&self) -> NaiveDate {
        self.today
            .checked_add_days(Days::new(WIZARD_MAX_DAYS_AHEAD))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        date >= earliest_date() && date <= self.latest_date()
    }

    /// Pick the lesson date and move on to the lesson list.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<()> {
        if !self.is_selectable(date) {
            return Err(ClientError::validation(format!(
                "pick a date no later than {}",
                self.latest_date()
            )));
        }
        self.date = Some(date);
        self.lesson = None;
        self.step = WizardStep::Lesson;
        Ok(())
    }

    /// Lessons of the selected date. Empty before a date is picked.
    pub async fn lessons(&self) -> ScreenState<Vec<Lesson>> {
        let Some(date) = self.date else {
            return ScreenState::Ready(Vec::new());
        };
        let client = &self.client;
        let result = self
            .cache
            .fetch(keys::lessons_for_date(date), || client.my_day(date))
            .await;
        ScreenState::from_result(result.map(|day| day.lessons))
    }

    /// Pick the lesson the homework is for. Only valid on the lesson step.
    pub fn select_lesson(&mut self, lesson: Lesson) -> bool {
        if self.step != WizardStep::Lesson {
            return false;
        }
        self.lesson = Some(lesson);
        self.step = WizardStep::Text;
        true
    }

    /// Go back one step, keeping what was picked.
    pub fn back(&mut self) {
        self.step = match self.step {
            WizardStep::Date | WizardStep::Lesson => WizardStep::Date,
            WizardStep::Text => WizardStep::Lesson,
        };
    }

    pub fn can_save(&self) -> bool {
        self.step == WizardStep::Text
            && self.lesson.is_some()
            && validation::homework_content(&self.text).is_ok()
    }

    /// Create the homework. Success resets the wizard; failure keeps every field.
    pub async fn save(&mut self) -> Feedback {
        let Some(lesson_id) = self.lesson.as_ref().map(|l| l.id) else {
            return Feedback::Error("select a lesson first".into());
        };
        if self.step != WizardStep::Text {
            return Feedback::Error("select a lesson first".into());
        }
        let content = match validation::homework_content(&self.text) {
            Ok(content) => content.to_string(),
            Err(e) => return Feedback::Error(e.to_string()),
        };

        let result = self.client.save_lesson_homework(lesson_id, &content).await;
        let feedback = write_feedback(&result, "homework created");
        match result {
            Ok(saved) => {
                self.cache.set(keys::lesson_homework(lesson_id), Some(saved));
                self.cache.invalidate(&QueryKey::new(keys::MY_HOMEWORK));
                self.reset();
            }
            Err(e) => tracing::warn!(lesson_id, "homework create failed: {e}"),
        }
        feedback
    }

    pub fn reset(&mut self) {
        self.step = WizardStep::Date;
        self.date = None;
        self.lesson = None;
        self.text.clear();
    }
}

fn earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}
