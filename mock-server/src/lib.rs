//! Test server for the REST client.
//!
//! Serves a small in-memory `/users` resource, the `/destroy` route used by
//! safe deletes, and a few diagnostic routes that report what the server
//! actually received.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
}

/// What `/echo` saw of a request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    users: BTreeMap<u64, User>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/users/{id}/destroy", get(destroy_user))
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/text", get(text))
        .route("/empty", any(empty))
        .route("/big", get(big))
        .route("/latin1", get(latin1))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let store = db.read().await;
    Json(store.users.values().cloned().collect())
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> (StatusCode, Json<User>) {
    let mut store = db.write().await;
    store.next_id += 1;
    let user = User {
        id: store.next_id,
        name: input.name,
    };
    store.users.insert(user.id, user.clone());
    tracing::debug!(id = user.id, "created user");
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, StatusCode> {
    let store = db.read().await;
    store.users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>, StatusCode> {
    let mut store = db.write().await;
    let user = store.users.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    let mut store = db.write().await;
    match store.users.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

/// Safe-delete endpoint: a GET whose body must be `{"_method":"put"}`.
async fn destroy_user(State(db): State<Db>, Path(id): Path<u64>, body: String) -> StatusCode {
    let method_override = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("_method").and_then(|m| m.as_str()).map(str::to_owned));
    if method_override.as_deref() != Some("put") {
        return StatusCode::BAD_REQUEST;
    }
    delete_user(State(db), Path(id)).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        content_type: header_value(header::CONTENT_TYPE),
        authorization: header_value(header::AUTHORIZATION),
        body,
    })
}

async fn text() -> &'static str {
    "plain text, not json"
}

/// Body size served by `/big`, above ureq's default 10 MiB read limit.
pub const BIG_BODY_LEN: usize = 11 * 1024 * 1024;

async fn big() -> String {
    "a".repeat(BIG_BODY_LEN)
}

/// "café" in Latin-1, with a header value outside visible ASCII.
async fn latin1() -> ([(header::HeaderName, HeaderValue); 1], Vec<u8>) {
    let label = HeaderValue::from_bytes(b"caf\xe9").unwrap_or(HeaderValue::from_static("cafe"));
    let body = vec![0x63, 0x61, 0x66, 0xe9];
    ([(header::HeaderName::from_static("x-label"), label)], body)
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}
