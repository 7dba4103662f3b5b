//! In-memory imitation of the Phish.net `api.json` endpoint.
//!
//! Serves GET (query string) and POST (form body) on `/api.json`, dispatching
//! on the `method` parameter. State is shared behind a lock so tests can seed
//! users, inspect request counts, and queue failure statuses that are
//! returned before any normal handling.

use std::{
    collections::{BTreeSet, HashMap, HashSet, VecDeque},
    sync::Arc,
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const API_VERSION: &str = "2.0";
pub const TEST_API_KEY: &str = "test-api-key";

type Params = HashMap<String, String>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub author: String,
    pub txt: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Thread {
    pub thread: u64,
    pub title: String,
    pub posts: Vec<Post>,
}

#[derive(Clone, Debug)]
pub struct User {
    pub uid: u64,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub api_keys: HashSet<String>,
    pub users: HashMap<String, User>,
    /// Authkeys of users who authorized the application, by username.
    pub authkeys: HashMap<String, String>,
    /// When set, `pnet.api.authkey.get` reports failure even for authorized
    /// users.
    pub withhold_authkeys: bool,
    pub myshows: HashMap<String, BTreeSet<String>>,
    pub ratings: HashMap<(String, String), u8>,
    pub threads: Vec<Thread>,
    /// Statuses returned, one per request, before normal handling resumes.
    pub fail_next: VecDeque<u16>,
    pub requests: usize,
    pub last_params: Option<Params>,
}

impl MockState {
    /// One valid API key, two users: `trey` (already authorized) and
    /// `fluffhead` (not yet authorized, password `reba`).
    pub fn seeded() -> Self {
        let mut state = MockState::default();
        state.api_keys.insert(TEST_API_KEY.to_string());
        state.add_user("trey", "tweezer", "trey@example.com");
        state.add_user("fluffhead", "reba", "fluff@example.com");
        let key = new_authkey();
        state.authkeys.insert("trey".to_string(), key);
        state
    }

    pub fn add_user(&mut self, username: &str, password: &str, email: &str) -> u64 {
        let uid = self.users.len() as u64 + 1;
        self.users.insert(
            username.to_string(),
            User {
                uid,
                password: password.to_string(),
                email: email.to_string(),
            },
        );
        uid
    }
}

pub type Db = Arc<RwLock<MockState>>;

pub fn new_db() -> Db {
    Arc::new(RwLock::new(MockState::seeded()))
}

pub fn app() -> Router {
    app_with_state(new_db())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/api.json", get(api_get).post(api_post))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, new_db()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

/// 19 hex digits, like the real service issues.
pub fn new_authkey() -> String {
    Uuid::new_v4().simple().to_string().to_uppercase()[..19].to_string()
}

async fn api_get(State(db): State<Db>, Query(params): Query<Params>) -> (StatusCode, Json<Value>) {
    dispatch(db, false, params).await
}

async fn api_post(State(db): State<Db>, Form(params): Form<Params>) -> (StatusCode, Json<Value>) {
    dispatch(db, true, params).await
}

async fn dispatch(db: Db, is_post: bool, params: Params) -> (StatusCode, Json<Value>) {
    let mut state = db.write().await;
    state.requests += 1;
    state.last_params = Some(params.clone());

    if let Some(status) = state.fail_next.pop_front() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({"error": "injected failure"})));
    }
    if params.get("api").map(String::as_str) != Some(API_VERSION) {
        return (StatusCode::BAD_REQUEST, Json(fail("unsupported API version")));
    }

    let method = params.get("method").cloned().unwrap_or_default();
    debug!(method = %method, is_post, "handling request");
    (StatusCode::OK, Json(handle(&mut state, is_post, &method, &params)))
}

fn fail(reason: &str) -> Value {
    json!({"success": "0", "reason": reason})
}

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn requires_post(method: &str) -> bool {
    matches!(
        method,
        "pnet.api.authorize"
            | "pnet.forum.thread.new"
            | "pnet.forum.thread.respond"
            | "pnet.user.register"
            | "pnet.user.myshows.add"
            | "pnet.user.myshows.remove"
            | "pnet.user.shows.rate"
    )
}

fn requires_api_key(method: &str) -> bool {
    !matches!(
        method,
        "pnet.blog.get"
            | "pnet.news.get"
            | "pnet.shows.upcoming"
            | "pnet.shows.setlists.latest"
            | "pnet.jamcharts.all"
            | "pnet.artists.get"
    )
}

fn handle(state: &mut MockState, is_post: bool, method: &str, params: &Params) -> Value {
    if requires_post(method) && !is_post {
        return fail("method requires POST");
    }
    if requires_api_key(method) {
        let valid = param(params, "apikey").is_some_and(|k| state.api_keys.contains(k));
        if !valid {
            return fail("invalid apikey");
        }
    }

    match method {
        "pnet.api.authorized.check" => authorized_check(state, params),
        "pnet.api.authkey.get" => authkey_get(state, params),
        "pnet.api.authorize" => authorize(state, params),
        "pnet.blog.get" => json!([{"id": 1, "title": "Summer Tour Announced"}]),
        "pnet.news.get" => json!([{"id": 7, "title": "Baker's Dozen recap"}]),
        "pnet.artists.get" => json!({"1": {"name": "Phish"}, "2": {"name": "Trey Anastasio"}}),
        "pnet.shows.upcoming" => json!([]),
        "pnet.jamcharts.all" => json!([{"song": "Tweezer", "entries": 3}]),
        "pnet.shows.setlists.latest" => {
            let linked = param(params, "linked") != Some("-1");
            json!([{"showdate": "1997-12-31", "linked": linked}])
        }
        "pnet.shows.setlists.get" => setlists_get(params),
        "pnet.forum.thread.get" => thread_get(state, params),
        "pnet.forum.thread.new" => thread_new(state, params),
        "pnet.forum.thread.respond" => thread_respond(state, params),
        "pnet.user.username.check" => match param(params, "username") {
            Some(u) if !state.users.contains_key(u) => json!({"success": "1", "reason": ""}),
            Some(_) => fail("username taken"),
            None => fail("username required"),
        },
        "pnet.user.register" => register(state, params),
        "pnet.user.uid.get" => match param(params, "username").and_then(|u| state.users.get(u)) {
            Some(user) => json!({"success": "1", "uid": user.uid}),
            None => fail("no such user"),
        },
        "pnet.user.myshows.get" => myshows_get(state, params),
        "pnet.user.myshows.add" | "pnet.user.myshows.remove" => myshows_edit(state, method, params),
        "pnet.user.shows.rate" => rate(state, params),
        _ => fail("unknown method"),
    }
}

fn authorized_check(state: &MockState, params: &Params) -> Value {
    let authorized = param(params, "username").is_some_and(|u| state.authkeys.contains_key(u));
    let flag = if authorized { "1" } else { "0" };
    json!({"success": flag})
}

fn authkey_get(state: &MockState, params: &Params) -> Value {
    match param(params, "username").and_then(|u| state.authkeys.get(u)) {
        Some(key) if !state.withhold_authkeys => json!({"success": 1, "authkey": key}),
        _ => json!({"success": 0}),
    }
}

fn authorize(state: &mut MockState, params: &Params) -> Value {
    let (Some(username), Some(passwd)) = (param(params, "username"), param(params, "passwd")) else {
        return fail("username and passwd required");
    };
    match state.users.get(username) {
        Some(user) if user.password == passwd => {
            let key = state
                .authkeys
                .entry(username.to_string())
                .or_insert_with(new_authkey)
                .clone();
            json!({"success": true, "authkey": key})
        }
        _ => fail("invalid username or password"),
    }
}

/// Resolves `username`/`authkey` to the acting user.
fn acting_user(state: &MockState, params: &Params) -> Result<String, Value> {
    let username = param(params, "username").ok_or_else(|| fail("username required"))?;
    match (state.authkeys.get(username), param(params, "authkey")) {
        (Some(expected), Some(given)) if expected == given => Ok(username.to_string()),
        _ => Err(fail("invalid authkey")),
    }
}

fn setlists_get(params: &Params) -> Value {
    let by_id = param(params, "showid") == Some("1252683584");
    let by_date = param(params, "showdate") == Some("1997-11-22");
    if by_id || by_date {
        json!([{
            "showid": 1252683584,
            "showdate": "1997-11-22",
            "venue": "Hampton Coliseum",
            "setlistdata": "Tweezer > Black-Eyed Katy"
        }])
    } else {
        json!([])
    }
}

fn thread_get(state: &MockState, params: &Params) -> Value {
    let id = param(params, "thread").and_then(|t| t.parse::<u64>().ok());
    match id.and_then(|id| state.threads.iter().find(|t| t.thread == id)) {
        Some(thread) => json!(thread),
        None => fail("no such thread"),
    }
}

fn thread_new(state: &mut MockState, params: &Params) -> Value {
    let author = match acting_user(state, params) {
        Ok(author) => author,
        Err(err) => return err,
    };
    let (Some(title), Some(txt)) = (param(params, "title"), param(params, "txt")) else {
        return fail("title and txt required");
    };
    let thread = state.threads.len() as u64 + 1;
    state.threads.push(Thread {
        thread,
        title: title.to_string(),
        posts: vec![Post {
            author,
            txt: txt.to_string(),
        }],
    });
    json!({"success": "1", "reason": "", "thread": thread})
}

fn thread_respond(state: &mut MockState, params: &Params) -> Value {
    let author = match acting_user(state, params) {
        Ok(author) => author,
        Err(err) => return err,
    };
    let id = param(params, "thread").and_then(|t| t.parse::<u64>().ok());
    let Some(txt) = param(params, "txt") else {
        return fail("txt required");
    };
    match id.and_then(|id| state.threads.iter_mut().find(|t| t.thread == id)) {
        Some(thread) => {
            thread.posts.push(Post {
                author,
                txt: txt.to_string(),
            });
            json!({"success": "1", "reason": ""})
        }
        None => fail("no such thread"),
    }
}

fn register(state: &mut MockState, params: &Params) -> Value {
    let fields = (
        param(params, "username"),
        param(params, "password"),
        param(params, "email"),
    );
    let (Some(username), Some(password), Some(email)) = fields else {
        return fail("username, password and email required");
    };
    if state.users.contains_key(username) {
        return fail("username taken");
    }
    let uid = state.add_user(username, password, email);
    let key = new_authkey();
    state.authkeys.insert(username.to_string(), key.clone());
    json!({"success": "1", "uid": uid, "reason": "", "authkey": key})
}

fn myshows_get(state: &MockState, params: &Params) -> Value {
    let names: Vec<&str> = match (param(params, "usernames"), param(params, "username")) {
        (Some(many), _) => many.split(',').collect(),
        (None, Some(one)) => vec![one],
        (None, None) => return fail("username required"),
    };
    let shows: serde_json::Map<String, Value> = names
        .into_iter()
        .map(|name| {
            let dates: Vec<&String> = state
                .myshows
                .get(name)
                .map(|set| set.iter().collect())
                .unwrap_or_default();
            (name.to_string(), json!(dates))
        })
        .collect();
    Value::Object(shows)
}

fn myshows_edit(state: &mut MockState, method: &str, params: &Params) -> Value {
    let user = match acting_user(state, params) {
        Ok(user) => user,
        Err(err) => return err,
    };
    let Some(showdate) = param(params, "showdate") else {
        return fail("showdate required");
    };
    let shows = state.myshows.entry(user).or_default();
    let changed = if method == "pnet.user.myshows.add" {
        shows.insert(showdate.to_string())
    } else {
        shows.remove(showdate)
    };
    if changed {
        json!({"success": "1", "reason": ""})
    } else {
        fail("no change")
    }
}

fn rate(state: &mut MockState, params: &Params) -> Value {
    let user = match acting_user(state, params) {
        Ok(user) => user,
        Err(err) => return err,
    };
    let rating = param(params, "rating").and_then(|r| r.parse::<u8>().ok());
    match (param(params, "showdate"), rating) {
        (Some(showdate), Some(rating @ 1..=5)) => {
            state.ratings.insert((user, showdate.to_string()), rating);
            json!({"success": "1"})
        }
        _ => fail("showdate and a rating from 1 to 5 required"),
    }
}
