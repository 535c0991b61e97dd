//! Screen view models against the fake backend

mod common;

use chrono::NaiveDate;
use common::{user_json, FakeBackend, GROUP_ID, HOMEWORK_TOTAL, VALID_INIT_DATA};
use schedule_miniapp::{
    bootstrap::{LaunchContext, LaunchParams},
    gate::Screen,
    models::DaySchedule,
    query::debounce,
    screens::{keys, Feedback, ScreenState, SearchKind, SlotEntry, WizardStep},
    storage::MemoryPersistence,
    ClientConfig, MiniApp,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

async fn signed_in_with(config: ClientConfig) -> MiniApp {
    let app = MiniApp::new(config, Arc::new(MemoryPersistence::new())).expect("app");
    app.launch(LaunchContext::Present(LaunchParams::with_init_data(VALID_INIT_DATA)))
        .await;
    assert_eq!(app.screen(), Screen::Content);
    app
}

async fn signed_in(backend: &FakeBackend) -> MiniApp {
    signed_in_with(backend.config()).await
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
}

#[tokio::test]
async fn test_day_schedule_grouped_by_slot() {
    let backend = FakeBackend::start(user_json(Some(GROUP_ID), false)).await;
    let app = signed_in(&backend).await;

    let ScreenState::Ready(slots) = app.schedule(day()).load().await else {
        panic!("schedule should load");
    };

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].label, "08:45 - 10:20");
    assert!(matches!(slots[1].entry, SlotEntry::Options(ref options) if options.len() == 2));
}

#[tokio::test]
async fn test_homework_feed_pages_four_four_two() {
    let backend = FakeBackend::start(user_json(Some(GROUP_ID), false)).await;
    let app = signed_in(&backend).await;
    let mut feed = app.homework_feed();

    assert!(matches!(feed.refresh().await, ScreenState::Ready(())));
    while feed.has_more() {
        assert!(feed.on_sentinel_visible().await.expect("next page"));
    }

    let ids: Vec<i64> = feed.items().map(|item| item.id).collect();
    assert_eq!(ids, (0..HOMEWORK_TOTAL as i64).collect::<Vec<_>>());

    let requests = backend.state.homework_pages.lock().clone();
    let pages: Vec<&str> = requests.iter().map(|p| p["page"].as_str()).collect();
    assert_eq!(pages, vec!["1", "2", "3"]);
    assert!(requests.iter().all(|p| p["size"] == "4" && p["status"] == "actual"));
    assert!(requests.iter().all(|p| !p.contains_key("subject_search")));
}

#[tokio::test]
async fn test_saving_homework_refreshes_feed() {
    let backend = FakeBackend::start(user_json(Some(GROUP_ID), false)).await;
    let app = signed_in(&backend).await;
    let mut feed = app.homework_feed();
    feed.refresh().await;
    feed.refresh().await;
    assert_eq!(backend.state.homework_pages.lock().len(), 1, "second refresh served from cache");

    let mut editor = app.homework_editor(5);
    assert!(matches!(editor.open().await, ScreenState::Ready(None)));
    editor.set_text("solve 1-10");
    assert!(editor.save().await.is_success());

    feed.refresh().await;
    assert_eq!(backend.state.homework_pages.lock().len(), 2);

    // The editor reopens from the cached save.
    let mut reopened = app.homework_editor(5);
    let ScreenState::Ready(Some(homework)) = reopened.open().await else {
        panic!("saved homework expected");
    };
    assert_eq!(homework.content, "solve 1-10");
    assert_eq!(reopened.text(), "solve 1-10");
}

#[tokio::test]
async fn test_homework_wizard_creates_for_picked_lesson() {
    let backend = FakeBackend::start(user_json(Some(GROUP_ID), false)).await;
    let app = signed_in(&backend).await;
    let mut feed = app.homework_feed();
    feed.refresh().await;

    let mut wizard = app.homework_wizard(day());
    assert!(wizard.select_date(day() + chrono::Days::new(15)).is_err());
    wizard.select_date(day()).expect("date within two weeks");

    let ScreenState::Ready(lessons) = wizard.lessons().await else {
        panic!("lessons of the day expected");
    };
    assert_eq!(lessons.len(), 3);
    let cached = app.cache().get::<DaySchedule>(&keys::lessons_for_date(day()));
    assert!(cached.is_some());

    let physics = lessons
        .into_iter()
        .find(|l| l.subject_name == "Physics")
        .expect("physics");
    assert!(wizard.select_lesson(physics));
    wizard.set_text("  lab report  ");
    assert!(wizard.can_save());

    assert!(wizard.save().await.is_success());
    assert_eq!(wizard.step(), WizardStep::Date);

    let stored = backend.state.lesson_homework.lock().get(&2).cloned().expect("saved");
    assert_eq!(stored["content"], "lab report");

    feed.refresh().await;
    assert_eq!(backend.state.homework_pages.lock().len(), 2, "feed refetched after create");
}

#[tokio::test]
async fn test_empty_homework_never_sent() {
    let backend = FakeBackend::start(user_json(Some(GROUP_ID), false)).await;
    let app = signed_in(&backend).await;

    let mut editor = app.homework_editor(5);
    editor.set_text("   ");
    assert!(matches!(editor.save().await, Feedback::Error(_)));
    assert!(backend.state.lesson_homework.lock().is_empty());
}

#[tokio::test]
async fn test_debounced_group_search_fires_once() {
    let backend = FakeBackend::start(user_json(Some(GROUP_ID), false)).await;
    let config = backend.config().debounce(Duration::from_millis(150));
    let app = signed_in_with(config).await;

    let (input, mut settled) = debounce::channel::<String>(app.client().config().debounce_delay());
    let typing = tokio::spawn(async move {
        for text in ["M", "MP", "MPB", "MPB-", "MPB-01"] {
            input.set(text.to_string());
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        input
    });

    let mut search = app.dictionary_search(SearchKind::Group);
    let state = search.next_debounced(&mut settled).await.expect("settled term");
    let _input = typing.await.expect("typing task");

    assert!(matches!(state, ScreenState::Ready(())));
    assert_eq!(*backend.state.group_searches.lock(), vec!["MPB-01".to_string()]);
    assert_eq!(search.results().count(), 10);
}

#[tokio::test]
async fn test_short_search_stays_local() {
    let backend = FakeBackend::start(user_json(Some(GROUP_ID), false)).await;
    let app = signed_in(&backend).await;

    let mut search = app.dictionary_search(SearchKind::Group);
    assert!(matches!(search.search("M").await, ScreenState::Ready(())));
    assert_eq!(search.results().count(), 0);
    assert!(backend.state.group_searches.lock().is_empty());
}

#[tokio::test]
async fn test_profile_save_invalidates_schedule() {
    let backend = FakeBackend::start(user_json(Some(GROUP_ID), false)).await;
    let app = signed_in(&backend).await;
    app.schedule(day()).load().await;
    assert!(!app.cache().is_stale(&keys::schedule(day())));

    let mut profile = app.profile();
    let form = profile.edit().expect("user loaded");
    assert_eq!(form.reminder_time, 30);
    form.reminders_enabled = true;
    form.reminder_time = 10;
    form.select_tutor("Philosophy", 9);

    let feedback = profile.save().await;
    assert!(feedback.is_success(), "{feedback:?}");
    assert!(!profile.is_editing());
    assert!(app.cache().is_stale(&keys::schedule(day())));

    let user = app.session().user().expect("refetched");
    assert_eq!(user.settings.reminder_time, Some(10));
    assert_eq!(user.settings.preferred_tutors.get("Philosophy"), Some(&9));
}

#[tokio::test]
async fn test_broadcast_validation_before_network() {
    let backend = FakeBackend::start(user_json(Some(GROUP_ID), false)).await;
    let app = signed_in(&backend).await;
    let admin = app.admin();

    assert!(matches!(admin.broadcast("too short").await, Feedback::Error(_)));
    assert_eq!(backend.state.broadcasts.load(Ordering::SeqCst), 0);

    assert!(admin.broadcast("Classes resume on Monday").await.is_success());
    assert_eq!(backend.state.broadcasts.load(Ordering::SeqCst), 1);
}
