//! In-process fake of the schedule backend for integration tests.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use schedule_miniapp::{
    storage::{PersistedSession, SessionPersistence},
    ClientConfig, Result,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub const VALID_INIT_DATA: &str = "query_id=AAE&user=%7B%22id%22%3A42%7D&hash=ok";
pub const TOKEN: &str = "token-abc";
pub const GROUP_ID: i64 = 7;
pub const GROUP_NAME: &str = "MPB-301";
/// Lesson whose homework belongs to another group.
pub const FOREIGN_LESSON_ID: i64 = 13;
pub const HOMEWORK_TOTAL: usize = 10;

type Params = HashMap<String, String>;

pub struct BackendState {
    pub user: Mutex<Value>,
    pub logins: AtomicUsize,
    pub profile_reads: AtomicUsize,
    pub homework_pages: Mutex<Vec<Params>>,
    pub group_searches: Mutex<Vec<String>>,
    pub lesson_homework: Mutex<HashMap<i64, Value>>,
    pub broadcasts: AtomicUsize,
    /// Day schedule answers 403.
    pub forbid_schedule: AtomicBool,
    /// Day schedule answers 400 with the blocked marker.
    pub marker_on_schedule: AtomicBool,
}

impl BackendState {
    fn new(user: Value) -> Self {
        Self {
            user: Mutex::new(user),
            logins: AtomicUsize::new(0),
            profile_reads: AtomicUsize::new(0),
            homework_pages: Mutex::new(Vec::new()),
            group_searches: Mutex::new(Vec::new()),
            lesson_homework: Mutex::new(HashMap::new()),
            broadcasts: AtomicUsize::new(0),
            forbid_schedule: AtomicBool::new(false),
            marker_on_schedule: AtomicBool::new(false),
        }
    }
}

pub struct FakeBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

impl FakeBackend {
    /// Serve a backend whose profile endpoint returns `user`.
    pub async fn start(user: Value) -> Self {
        let state = Arc::new(BackendState::new(user));
        let app = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/profile/me", get(profile).put(update_profile))
            .route("/api/v1/dicts/groups", get(groups))
            .route("/api/v1/dicts/groups/:id", get(group))
            .route("/api/v1/schedule/my/day", get(my_day))
            .route("/api/v1/homework/my", get(my_homework))
            .route(
                "/api/v1/lessons/:id/homework",
                get(lesson_homework).post(save_lesson_homework),
            )
            .route("/api/v1/admin/system/broadcast", post(broadcast))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend");
        });

        Self { addr, state }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(format!("http://{}", self.addr))
    }
}

pub fn user_json(group_id: Option<i64>, is_blocked: bool) -> Value {
    json!({
        "telegram_id": 42,
        "first_name": "Ann",
        "username": "ann",
        "is_admin": false,
        "is_blocked": is_blocked,
        "group_id": group_id,
        "subgroup_number": null,
        "settings": {"reminder_time": 30, "preferred_tutors": {}}
    })
}

/// Persistence that counts writes.
#[derive(Default)]
pub struct CountingPersistence {
    pub record: Mutex<Option<PersistedSession>>,
    pub saves: AtomicUsize,
}

impl SessionPersistence for CountingPersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.record.lock().clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.record.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.record.lock().take();
        Ok(())
    }
}

fn error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn authorized(headers: &HeaderMap) -> std::result::Result<(), Response> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Not authenticated")),
    }
}

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.logins.fetch_add(1, Ordering::SeqCst);
    if body["init_data"] == VALID_INIT_DATA {
        Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid init data")
    }
}

async fn profile(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    state.profile_reads.fetch_add(1, Ordering::SeqCst);
    Json(state.user.lock().clone()).into_response()
}

async fn update_profile(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    let mut user = state.user.lock();
    if user["is_blocked"] == true {
        return error(StatusCode::FORBIDDEN, "Forbidden");
    }
    if let Some(group_id) = body.get("group_id") {
        user["group_id"] = group_id.clone();
    }
    if let Some(Value::Object(settings)) = body.get("settings") {
        for (key, value) in settings {
            user["settings"][key] = value.clone();
        }
    }
    if let Some(tutors) = body.get("preferred_tutors") {
        user["settings"]["preferred_tutors"] = tutors.clone();
    }
    Json(user.clone()).into_response()
}

async fn group(Path(id): Path<i64>) -> Response {
    Json(json!({ "id": id, "name": GROUP_NAME })).into_response()
}

async fn groups(State(state): State<Arc<BackendState>>, Query(params): Query<Params>) -> Response {
    let search = params.get("search").cloned().unwrap_or_default();
    state.group_searches.lock().push(search.clone());
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let size: usize = params.get("size").and_then(|s| s.parse().ok()).unwrap_or(20);

    let all: Vec<Value> = (1..=25)
        .map(|id| json!({ "id": id, "name": format!("MPB-{id:03}") }))
        .filter(|g| g["name"].as_str().is_some_and(|n| n.contains(&search)))
        .collect();
    let items: Vec<Value> = all.iter().skip((page - 1) * size).take(size).cloned().collect();
    Json(json!({ "items": items, "page": page, "size": size, "total": all.len() })).into_response()
}

async fn my_day(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    if state.forbid_schedule.load(Ordering::SeqCst) {
        return error(StatusCode::FORBIDDEN, "Forbidden");
    }
    if state.marker_on_schedule.load(Ordering::SeqCst) {
        return error(StatusCode::BAD_REQUEST, "User is blocked");
    }
    let date = params.get("target_date").cloned().unwrap_or_default();
    let lesson = |id: i64, slot: u8, subject: &str| {
        json!({
            "id": id,
            "subject_name": subject,
            "lesson_type": "lecture",
            "tutor": {"name": "Petrov"},
            "auditory": {"name": "101"},
            "time_slot": slot
        })
    };
    Json(json!({
        "date": date,
        "lessons": [lesson(1, 1, "Math"), lesson(2, 3, "Physics"), lesson(3, 3, "Philosophy")]
    }))
    .into_response()
}

async fn my_homework(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    state.homework_pages.lock().push(params.clone());
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let size: usize = params.get("size").and_then(|s| s.parse().ok()).unwrap_or(4);

    let items: Vec<Value> = (0..HOMEWORK_TOTAL)
        .skip((page - 1) * size)
        .take(size)
        .map(|i| {
            json!({
                "id": i,
                "content": format!("exercise {i}"),
                "lesson_source_id": 100 + i,
                "lesson": {"subject_name": "Math", "date": "2024-09-02"},
                "author": {"first_name": "Ann"}
            })
        })
        .collect();
    Json(json!({ "items": items, "page": page, "size": size, "total": HOMEWORK_TOTAL }))
        .into_response()
}

async fn lesson_homework(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    let stored = state.lesson_homework.lock().get(&id).cloned();
    Json(stored.unwrap_or(Value::Null)).into_response()
}

async fn save_lesson_homework(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    if id == FOREIGN_LESSON_ID {
        return error(StatusCode::FORBIDDEN, "You can only edit homework of your own group");
    }
    let homework = json!({
        "content": body["content"],
        "created_at": "2024-09-02T08:00:00Z",
        "updated_at": null,
        "author": {"first_name": "Ann"}
    });
    state.lesson_homework.lock().insert(id, homework.clone());
    Json(homework).into_response()
}

async fn broadcast(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    state.broadcasts.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "status": "queued" })).into_response()
}
