//! The user's own day schedule.

use super::{keys, ScreenState};
use crate::http::ApiClient;
use crate::models::Lesson;
use crate::query::QueryCache;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Clock times of the numbered lesson slots.
pub const TIME_SLOTS: [&str; 8] = [
    "08:45 - 10:20",
    "10:30 - 12:05",
    "12:45 - 14:20",
    "14:30 - 16:05",
    "16:15 - 17:50",
    "18:00 - 19:35",
    "19:45 - 21:20",
    "21:30 - 23:05",
];

pub fn slot_label(slot: u8) -> String {
    match usize::from(slot).checked_sub(1).and_then(|i| TIME_SLOTS.get(i)) {
        Some(label) => (*label).to_string(),
        None => format!("Lesson #{slot}"),
    }
}

/// What occupies one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotEntry {
    Single(Lesson),
    /// Several parallel lessons, e.g. elective options.
    Options(Vec<Lesson>),
}

impl SlotEntry {
    pub fn lessons(&self) -> &[Lesson] {
        match self {
            Self::Single(lesson) => std::slice::from_ref(lesson),
            Self::Options(lessons) => lessons,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlot {
    pub slot: u8,
    pub label: String,
    pub entry: SlotEntry,
}

/// Group lessons by slot number, ascending. Order within a slot is kept.
pub fn group_by_slot(lessons: Vec<Lesson>) -> Vec<TimeSlot> {
    let mut by_slot: BTreeMap<u8, Vec<Lesson>> = BTreeMap::new();
    for lesson in lessons {
        by_slot.entry(lesson.time_slot).or_default().push(lesson);
    }

    by_slot
        .into_iter()
        .filter_map(|(slot, mut lessons)| {
            let entry = match lessons.len() {
                0 => return None,
                1 => SlotEntry::Single(lessons.remove(0)),
                _ => SlotEntry::Options(lessons),
            };
            Some(TimeSlot {
                slot,
                label: slot_label(slot),
                entry,
            })
        })
        .collect()
}

pub struct ScheduleScreen {
    client: ApiClient,
    cache: QueryCache,
    date: NaiveDate,
}

impl ScheduleScreen {
    pub fn new(client: ApiClient, cache: QueryCache, date: NaiveDate) -> Self {
        Self {
            client,
            cache,
            date,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub async fn load(&self) -> ScreenState<Vec<TimeSlot>> {
        let date = self.date;
        let result = self
            .cache
            .fetch(keys::schedule(date), || self.client.my_day(date))
            .await;
        ScreenState::from_result(result).map(|day| group_by_slot(day.lessons))
    }
}
