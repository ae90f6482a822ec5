//! Hyper-based client for the lab-register REST API.
//!
//! One [`ApiClient`] implements every collaborator trait. It is cheap to
//! clone; the connection pool is shared between clones.

use crate::error::ApiError;
use crate::{AuthGateway, LogSource, UserDirectory};
use bytes::Bytes;
use chrono::FixedOffset;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use labdash_core::config::ApiConfig;
use labdash_core::{CreateUserInput, LogRecord, LoginInput, Session, User};
use serde_json::{json, Value};
use std::time::Duration;

const LOGIN_FAILED: &str = "No se pudo iniciar sesión";
const LIST_USERS_FAILED: &str = "No se pudo obtener la lista de usuarios";
const CREATE_USER_FAILED: &str = "No se pudo crear el usuario";
const FETCH_LOGS_FAILED: &str = "No se pudo obtener el log de pGina";
const UPDATE_USER_FAILED: &str = "No se pudo actualizar el usuario";

#[derive(Clone)]
pub struct ApiClient {
    http: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    naive_offset: Option<FixedOffset>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::builder(TokioExecutor::new()).build_http(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            naive_offset: None,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        let client =
            Self::new(config.base_url.clone()).with_timeout(Duration::from_secs(config.timeout_secs));
        match config.timestamp_offset {
            Some(offset) => client.with_naive_offset(offset),
            None => client,
        }
    }

    /// Attach `Authorization: Bearer <token>` to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read offset-less timestamps at `offset` instead of local time.
    pub fn with_naive_offset(mut self, offset: FixedOffset) -> Self {
        self.naive_offset = Some(offset);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn log_record(&self, row: &Value) -> Option<LogRecord> {
        match &self.naive_offset {
            Some(offset) => LogRecord::from_row_in(row, offset),
            None => LogRecord::from_row(row),
        }
    }

    fn user(&self, row: &Value) -> Option<User> {
        match &self.naive_offset {
            Some(offset) => User::from_row_in(row, offset),
            None => User::from_row(row),
        }
    }

    /// Perform one request and decode the JSON answer. An empty 2xx body
    /// decodes to `Value::Null`. On a non-2xx status the body's `message` is
    /// surfaced, or `fallback` when there is none.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        fallback: &'static str,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let uri: Uri = url.parse().map_err(|_| ApiError::InvalidUrl(url.clone()))?;

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let payload = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(serde_json::to_vec(&value)?))
            }
            None => Full::new(Bytes::new()),
        };
        let request = builder.body(payload)?;

        tracing::info!(%method, path, "API request");
        let exchange = async {
            let response = self.http.request(request).await?;
            let status = response.status();
            let bytes = response.into_body().collect().await?.to_bytes();
            Ok::<_, ApiError>((status, bytes))
        };
        let (status, bytes) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ApiError::Timeout(self.timeout.as_secs()))??;

        if !status.is_success() {
            let message = server_message(&bytes).unwrap_or_else(|| fallback.to_string());
            tracing::warn!(%status, path, %message, "API request rejected");
            return Err(ApiError::Rejected { status, message });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// The `message` field of an error body. Validation errors come back as an
/// array of strings; those are joined.
fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("message")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

fn rows(value: Value, what: &'static str) -> Result<Vec<Value>, ApiError> {
    match value {
        Value::Array(rows) => Ok(rows),
        _ => Err(ApiError::UnexpectedShape(what)),
    }
}

// ---------------------------------------------------------------------------
// Collaborator impls
// ---------------------------------------------------------------------------

impl AuthGateway for ApiClient {
    async fn login(&self, input: &LoginInput) -> Result<Session, ApiError> {
        let body = serde_json::to_value(input)?;
        let value = self.send(Method::POST, "/auth/login", Some(body), LOGIN_FAILED).await?;
        Session::from_login_response(&value)
            .ok_or(ApiError::UnexpectedShape("login response without token or user"))
    }
}

impl LogSource for ApiClient {
    async fn fetch_logs(&self) -> Result<Vec<LogRecord>, ApiError> {
        let value = self.send(Method::GET, "/pginalog", None, FETCH_LOGS_FAILED).await?;
        let rows = rows(value, "expected an array of log rows")?;
        let records: Vec<LogRecord> = rows.iter().filter_map(|row| self.log_record(row)).collect();
        tracing::debug!(rows = rows.len(), kept = records.len(), "normalized pGina log");
        Ok(records)
    }
}

impl UserDirectory for ApiClient {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let value = self.send(Method::GET, "/users", None, LIST_USERS_FAILED).await?;
        let rows = rows(value, "expected an array of users")?;
        Ok(rows.iter().filter_map(|row| self.user(row)).collect())
    }

    async fn create_user(&self, input: &CreateUserInput) -> Result<User, ApiError> {
        let body = serde_json::to_value(input)?;
        let value = self.send(Method::POST, "/users/create", Some(body), CREATE_USER_FAILED).await?;
        let mut user = self.user(&value).unwrap_or_else(|| User::new(input.user_name.clone()));
        if user.user_name.is_empty() {
            user.user_name = input.user_name.clone();
        }
        Ok(user)
    }

    async fn set_activation(&self, user_id: i64, is_active: bool) -> Result<User, ApiError> {
        let path = format!("/users/{user_id}/status");
        let body = json!({ "isActive": is_active });
        let value = self.send(Method::PATCH, &path, Some(body), UPDATE_USER_FAILED).await?;
        let mut user = self.user(&value).ok_or(ApiError::UnexpectedShape("expected a user object"))?;
        user.user_id.get_or_insert(user_id);
        Ok(user)
    }
}
