//! Fake lab-register REST API for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `POST /auth/login`: accepts the accounts added with [`FakeApi::add_account`]
//! - `GET /pginalog`: the configured log rows, verbatim
//! - `GET /users`: the user rows, including any created during the test
//! - `POST /users/create`: appends a user; names in the conflict list get a 409
//! - `PATCH /users/{id}/status`: flips `isActive`
//!
//! Every route except login answers 401 without a bearer token issued by
//! the login route.
//!
//! # Example
//!
//! ```rust,ignore
//! mod common;
//! use common::fake_api::FakeApi;
//! use common::*;
//!
//! #[tokio::test]
//! async fn lists_logs() {
//!     let api = FakeApi::start().await.unwrap();
//!     api.allow_token("t").await;
//!     api.set_logs(pgina_rows()).await;
//!
//!     let client = ApiClient::new(api.base_url()).with_token("t");
//!     assert_eq!(client.fetch_logs().await.unwrap().len(), 5);
//! }
//! ```

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

struct Account {
    password: String,
    is_admin: bool,
}

/// State shared between the router and test code.
#[derive(Default)]
struct ApiState {
    accounts: HashMap<String, Account>,
    tokens: Vec<String>,
    logs: Value,
    users: Vec<Value>,
    next_id: i64,
    /// User names whose creation is refused with 409.
    conflicts: Vec<String>,
    /// Bodies received by `POST /users/create`, in arrival order.
    created: Vec<Value>,
}

type Shared = Arc<Mutex<ApiState>>;
type Reply = (StatusCode, Json<Value>);

/// Handle to the running fake API server.
pub struct FakeApi {
    addr: SocketAddr,
    state: Shared,
}

impl FakeApi {
    /// Start the fake API on a random port. Returns once the server is
    /// listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState {
            logs: json!([]),
            next_id: 100,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/pginalog", get(pgina_log))
            .route("/users", get(list_users))
            .route("/users/create", post(create_user))
            .route("/users/{id}/status", patch(set_status))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the task a moment to register.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn add_account(&self, username: &str, password: &str, is_admin: bool) {
        self.state.lock().await.accounts.insert(
            username.to_string(),
            Account { password: password.to_string(), is_admin },
        );
    }

    /// Token the login route hands out for `username`.
    pub fn token_for(username: &str) -> String {
        format!("tok-{username}")
    }

    /// Accept `token` without a login round-trip.
    pub async fn allow_token(&self, token: &str) {
        self.state.lock().await.tokens.push(token.to_string());
    }

    pub async fn set_logs(&self, rows: Value) {
        self.state.lock().await.logs = rows;
    }

    pub async fn set_users(&self, rows: Value) {
        let mut state = self.state.lock().await;
        state.users = rows.as_array().cloned().unwrap_or_default();
    }

    pub async fn refuse_user(&self, user_name: &str) {
        self.state.lock().await.conflicts.push(user_name.to_string());
    }

    /// Bodies received by `POST /users/create`.
    pub async fn created(&self) -> Vec<Value> {
        self.state.lock().await.created.clone()
    }

    pub async fn user_rows(&self) -> Vec<Value> {
        self.state.lock().await.users.clone()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn error(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "message": message })))
}

fn authorized(state: &ApiState, headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| state.tokens.iter().any(|t| t == token))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().await;
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();
    let is_admin = match state.accounts.get(&username) {
        Some(account) if account.password == password => account.is_admin,
        _ => return error(StatusCode::UNAUTHORIZED, "Credenciales inválidas"),
    };
    let token = FakeApi::token_for(&username);
    state.tokens.push(token.clone());
    (
        StatusCode::OK,
        Json(json!({
            "token": token,
            "user": {
                "id": format!("u-{username}"),
                "username": username,
                "email": format!("{username}@lab.mx"),
                "isAdmin": if is_admin { 1 } else { 0 },
            }
        })),
    )
}

async fn pgina_log(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = state.lock().await;
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "No autorizado");
    }
    (StatusCode::OK, Json(state.logs.clone()))
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = state.lock().await;
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "No autorizado");
    }
    (StatusCode::OK, Json(Value::Array(state.users.clone())))
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().await;
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "No autorizado");
    }
    state.created.push(body.clone());
    let user_name = body["userName"].as_str().unwrap_or_default().to_string();
    if state.conflicts.contains(&user_name) {
        return error(StatusCode::CONFLICT, "El usuario ya existe");
    }
    state.next_id += 1;
    let mut user = body;
    user["userId"] = json!(state.next_id);
    user["isActive"] = json!(true);
    if let Some(obj) = user.as_object_mut() {
        obj.remove("password");
    }
    state.users.push(user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn set_status(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().await;
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "No autorizado");
    }
    let is_active = body["isActive"].as_bool().unwrap_or(true);
    let found = state.users.iter_mut().find(|u| {
        u.get("userId").or_else(|| u.get("user_id")).and_then(Value::as_i64) == Some(id)
    });
    match found {
        Some(user) => {
            if user.get("is_active").is_some() {
                user["is_active"] = json!(is_active);
            } else {
                user["isActive"] = json!(is_active);
            }
            (StatusCode::OK, Json(user.clone()))
        }
        None => error(StatusCode::NOT_FOUND, "Usuario no encontrado"),
    }
}
