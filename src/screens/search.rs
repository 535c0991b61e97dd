//! Group and tutor search with the week schedule of the selected target.

use super::{keys, ScreenState};
use crate::api::SearchTarget;
use crate::errors::Result;
use crate::http::ApiClient;
use crate::models::{DaySchedule, Lesson, Page, User};
use crate::query::{Debounced, InfiniteQuery, QueryCache};
use chrono::{Datelike, Days, NaiveDate};

/// Shortest dictionary search sent to the backend.
pub const MIN_DICT_SEARCH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Group,
    Tutor,
}

/// Incremental dictionary lookup feeding a [`SearchTarget`] picker.
pub struct DictionarySearch {
    client: ApiClient,
    kind: SearchKind,
    term: String,
    results: InfiniteQuery<SearchTarget>,
}

impl DictionarySearch {
    pub fn new(client: ApiClient, kind: SearchKind) -> Self {
        let size = client.config().page_sizes.dictionaries;
        Self {
            client,
            kind,
            term: String::new(),
            results: InfiniteQuery::new(size),
        }
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn results(&self) -> impl Iterator<Item = &SearchTarget> {
        self.results.items()
    }

    pub fn has_more(&self) -> bool {
        !self.results.is_empty() && self.results.has_next_page()
    }

    /// Start a new search. Terms shorter than two characters clear the list
    /// without a request.
    pub async fn search(&mut self, term: &str) -> ScreenState<()> {
        self.term = term.trim().to_string();
        self.results.reset();
        if self.term.chars().count() < MIN_DICT_SEARCH {
            return ScreenState::Ready(());
        }
        let (client, kind, term) = (&self.client, self.kind, self.term.as_str());
        let result = self
            .results
            .fetch_next(|page, size| fetch_targets(client, kind, term, page, size))
            .await;
        ScreenState::from_result(result.map(drop))
    }

    /// Load the following page when the list end becomes visible.
    pub async fn on_sentinel_visible(&mut self) -> Result<bool> {
        let (client, kind, term) = (&self.client, self.kind, self.term.as_str());
        self.results
            .on_sentinel_visible(|page, size| fetch_targets(client, kind, term, page, size))
            .await
    }

    /// Wait for the next settled term from `input` and search for it.
    ///
    /// Returns `None` once the input side is gone.
    pub async fn next_debounced(
        &mut self,
        input: &mut Debounced<String>,
    ) -> Option<ScreenState<()>> {
        let term = input.next().await?;
        Some(self.search(&term).await)
    }
}

async fn fetch_targets(
    client: &ApiClient,
    kind: SearchKind,
    term: &str,
    page: u32,
    size: u32,
) -> Result<Page<SearchTarget>> {
    Ok(match kind {
        SearchKind::Group => client.groups(term, page, size).await?.map(SearchTarget::from),
        SearchKind::Tutor => client.tutors(term, page, size).await?.map(SearchTarget::from),
    })
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Lessons of other groups are read-only.
pub fn can_interact(lesson: &Lesson, user: Option<&User>) -> bool {
    match (lesson.group.as_ref(), user.and_then(|u| u.group_id)) {
        (Some(group), Some(own)) => group.id == own,
        _ => false,
    }
}

/// Week schedule of a searched group or tutor.
pub struct WeekScheduleView {
    client: ApiClient,
    cache: QueryCache,
    target: SearchTarget,
    week_start: NaiveDate,
}

impl WeekScheduleView {
    pub fn new(
        client: ApiClient,
        cache: QueryCache,
        target: SearchTarget,
        today: NaiveDate,
    ) -> Self {
        Self {
            client,
            cache,
            target,
            week_start: week_start(today),
        }
    }

    pub fn target(&self) -> &SearchTarget {
        &self.target
    }

    /// First and last day of the shown week.
    pub fn week(&self) -> (NaiveDate, NaiveDate) {
        let end = self
            .week_start
            .checked_add_days(Days::new(6))
            .unwrap_or(self.week_start);
        (self.week_start, end)
    }

    pub fn previous_week(&mut self) {
        if let Some(start) = self.week_start.checked_sub_days(Days::new(7)) {
            self.week_start = start;
        }
    }

    pub fn next_week(&mut self) {
        if let Some(start) = self.week_start.checked_add_days(Days::new(7)) {
            self.week_start = start;
        }
    }

    pub fn current_week(&mut self, today: NaiveDate) {
        self.week_start = week_start(today);
    }

    pub async fn load(&self) -> ScreenState<Vec<DaySchedule>> {
        let key = keys::week_schedule(&self.target, self.week_start);
        let result = self
            .cache
            .fetch(key, || self.client.search_schedule(&self.target, self.week_start))
            .await;
        ScreenState::from_result(result)
    }
}
