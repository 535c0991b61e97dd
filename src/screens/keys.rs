//! Cache keys of every screen query.
//!
//! Roots double as invalidation prefixes.

use crate::api::schedule::DATE_FORMAT;
use crate::api::{HomeworkQuery, SearchTarget};
use crate::query::QueryKey;
use chrono::NaiveDate;

pub const SCHEDULE: &str = "schedule";
pub const WEEK_SCHEDULE: &str = "weekSchedule";
pub const MY_HOMEWORK: &str = "myHomework";
pub const HOMEWORK: &str = "homework";
pub const LESSONS_FOR_DATE: &str = "lessonsForDate";
pub const ELECTIVES: &str = "electives";
pub const ADMIN_USERS: &str = "adminUsers";
pub const ADMIN_CHATS: &str = "adminChats";

pub fn schedule(date: NaiveDate) -> QueryKey {
    QueryKey::new(SCHEDULE).with(date.format(DATE_FORMAT))
}

pub fn week_schedule(target: &SearchTarget, week_start: NaiveDate) -> QueryKey {
    QueryKey::new(WEEK_SCHEDULE)
        .with(target.kind())
        .with(target.id())
        .with(week_start.format(DATE_FORMAT))
}

pub fn my_homework(query: &HomeworkQuery, page: u32) -> QueryKey {
    QueryKey::new(MY_HOMEWORK)
        .with(query.status.map_or("any", |s| s.as_str()))
        .with(query.week.map_or("any", |w| w.as_str()))
        .with(query.effective_search().unwrap_or_default())
        .with(page)
}

pub fn lesson_homework(lesson_id: i64) -> QueryKey {
    QueryKey::new(HOMEWORK).with(lesson_id)
}

pub fn lessons_for_date(date: NaiveDate) -> QueryKey {
    QueryKey::new(LESSONS_FOR_DATE).with(date.format(DATE_FORMAT))
}

pub fn electives() -> QueryKey {
    QueryKey::new(ELECTIVES)
}

pub fn admin_users(page: u32, search: &str) -> QueryKey {
    QueryKey::new(ADMIN_USERS).with(page).with(search)
}

pub fn admin_chats(page: u32) -> QueryKey {
    QueryKey::new(ADMIN_CHATS).with(page)
}
