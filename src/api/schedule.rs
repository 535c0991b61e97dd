//! Schedule lookups

use crate::errors::Result;
use crate::http::{ApiClient, ApiRequest};
use crate::models::{DaySchedule, Group, Tutor};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire format of `target_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whose schedule a search shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchTarget {
    Group { id: i64, name: String },
    Tutor { id: i64, name: String },
}

impl SearchTarget {
    pub fn id(&self) -> i64 {
        match self {
            Self::Group { id, .. } | Self::Tutor { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Group { name, .. } | Self::Tutor { name, .. } => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Group { .. } => "group",
            Self::Tutor { .. } => "tutor",
        }
    }

    /// Query parameter naming this target.
    fn query_param(&self) -> (&'static str, i64) {
        match self {
            Self::Group { id, .. } => ("group_id", *id),
            Self::Tutor { id, .. } => ("tutor_id", *id),
        }
    }
}

impl From<Group> for SearchTarget {
    fn from(group: Group) -> Self {
        Self::Group {
            id: group.id,
            name: group.name,
        }
    }
}

impl From<Tutor> for SearchTarget {
    fn from(tutor: Tutor) -> Self {
        Self::Tutor {
            id: tutor.id,
            name: tutor.name,
        }
    }
}

impl ApiClient {
    /// The current user's lessons on `date`.
    pub async fn my_day(&self, date: NaiveDate) -> Result<DaySchedule> {
        self.execute(
            ApiRequest::get("/schedule/my/day")
                .query("target_date", date.format(DATE_FORMAT)),
        )
        .await
    }

    /// Schedule of a group or tutor for the week containing `date`.
    pub async fn search_schedule(
        &self,
        target: &SearchTarget,
        date: NaiveDate,
    ) -> Result<Vec<DaySchedule>> {
        self.execute(search_request(target, date)).await
    }
}

fn search_request(target: &SearchTarget, date: NaiveDate) -> ApiRequest {
    let (key, id) = target.query_param();
    ApiRequest::get("/schedule/search")
        .query("target_date", date.format(DATE_FORMAT))
        .query(key, id)
}
