//! Homework feed and per-lesson homework

use crate::errors::Result;
use crate::http::{ApiClient, ApiRequest};
use crate::models::{Homework, HomeworkItem, Page};
use serde::{Deserialize, Serialize};

/// Shortest subject search forwarded to the backend.
pub const MIN_SUBJECT_SEARCH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Actual,
    Expired,
}

impl HomeworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actual => "actual",
            Self::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekFilter {
    Current,
    Next,
}

impl WeekFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Next => "next",
        }
    }
}

/// Filters for `GET /homework/my`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HomeworkQuery {
    pub status: Option<HomeworkStatus>,
    pub week: Option<WeekFilter>,
    pub subject_search: String,
}

impl Default for HomeworkQuery {
    fn default() -> Self {
        Self {
            status: Some(HomeworkStatus::Actual),
            week: None,
            subject_search: String::new(),
        }
    }
}

impl HomeworkQuery {
    /// Subject search as sent: dropped while shorter than three characters.
    pub fn effective_search(&self) -> Option<&str> {
        let search = self.subject_search.trim();
        (search.chars().count() >= MIN_SUBJECT_SEARCH).then_some(search)
    }

    fn to_request(&self, page: u32, size: u32) -> ApiRequest {
        ApiRequest::get("/homework/my")
            .query("page", page)
            .query("size", size)
            .query_opt("status", self.status.map(|s| s.as_str()))
            .query_opt("week", self.week.map(|w| w.as_str()))
            .query_opt("subject_search", self.effective_search())
    }
}

#[derive(Debug, Serialize)]
struct HomeworkBody<'a> {
    content: &'a str,
}

impl ApiClient {
    /// One page of the user's homework feed.
    pub async fn my_homework(
        &self,
        query: &HomeworkQuery,
        page: u32,
        size: u32,
    ) -> Result<Page<HomeworkItem>> {
        self.execute(query.to_request(page, size)).await
    }

    /// Homework attached to a lesson; `None` when nothing was posted yet.
    pub async fn lesson_homework(&self, lesson_id: i64) -> Result<Option<Homework>> {
        self.execute(ApiRequest::get(format!("/lessons/{lesson_id}/homework")))
            .await
    }

    /// Create or replace the homework of a lesson.
    ///
    /// A 403 here is a permission denial for this lesson, not a block.
    pub async fn save_lesson_homework(&self, lesson_id: i64, content: &str) -> Result<Homework> {
        let request = ApiRequest::post(format!("/lessons/{lesson_id}/homework"))
            .json(&HomeworkBody { content })?
            .item_scoped();
        self.execute(request).await
    }
}
