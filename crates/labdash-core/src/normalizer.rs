//! Normalizer: turns loosely-shaped API rows into typed records.
//!
//! The admin API is not consistent about key casing: the same field may come
//! back as `timeStamp` or `TimeStamp`, `userName` or `user_name`, depending
//! on the endpoint and the database driver behind it. Every field is therefore resolved from
//! an ordered list of candidate keys; the first key holding a non-null value
//! wins. Nothing here fails: a malformed field degrades to `None`.
//!
//! Date-times without an offset are wall-clock times in the zone of whoever
//! reads them, so the `_in` constructors take that zone explicitly. The plain
//! constructors use [`Local`].

use crate::period::to_utc;
use crate::session::{AuthUser, Session};
use crate::types::{LogRecord, User};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// ---------------------------------------------------------------------------
// Key resolution
// ---------------------------------------------------------------------------

/// First non-null value among `keys`, in order.
fn first_value<'a>(row: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| row.get(*key).filter(|value| !value.is_null()))
}

/// Like [`first_value`], coerced to text. Scalars are stringified; arrays and
/// objects are treated as malformed.
fn first_text(row: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first_value(row, keys)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First key whose value parses as a timestamp. Unlike [`first_value`] an
/// unparseable value falls through to the next key.
fn first_timestamp<Tz: TimeZone>(
    row: &Map<String, Value>,
    keys: &[&str],
    tz: &Tz,
) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .find_map(|value| parse_timestamp_in(value, tz))
}

fn first_i64(row: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    match first_value(row, keys)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// JavaScript-style truthiness, which is how the API's boolean flags have
/// always been read (`1`, `"true"`, `true` are all admin).
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse an API timestamp in the local zone. See [`parse_timestamp_in`].
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    parse_timestamp_in(value, &Local)
}

/// Parse an API timestamp: RFC 3339, a naive date-time read as wall-clock
/// time in `tz`, a bare date (midnight UTC), or epoch milliseconds.
pub fn parse_timestamp_in<Tz: TimeZone>(value: &Value, tz: &Tz) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Some(ts.with_timezone(&Utc));
            }
            if let Some(naive) = NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            {
                return Some(to_utc(tz, naive));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(Default::default()).and_utc())
        }
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

impl LogRecord {
    /// Normalise one row of `GET /pginalog`, reading naive timestamps as
    /// local time.
    pub fn from_row(row: &Value) -> Option<LogRecord> {
        Self::from_row_in(row, &Local)
    }

    /// Returns `None` only when the row itself is absent (null or not an
    /// object).
    ///
    /// A missing or unparseable timestamp becomes the current instant; callers
    /// must not rely on that value.
    pub fn from_row_in<Tz: TimeZone>(row: &Value, tz: &Tz) -> Option<LogRecord> {
        let row = row.as_object()?;
        Some(LogRecord {
            timestamp: first_timestamp(row, &["timeStamp", "TimeStamp"], tz).unwrap_or_else(Utc::now),
            host: first_text(row, &["host", "Host"]),
            ip: first_text(row, &["ip", "Ip"]),
            machine: first_text(row, &["machine", "Machine"]),
            message: first_text(row, &["message", "Message"]),
        })
    }
}

impl User {
    /// Normalise one row of `GET /users` (camelCase or snake_case keys).
    pub fn from_row(row: &Value) -> Option<User> {
        Self::from_row_in(row, &Local)
    }

    pub fn from_row_in<Tz: TimeZone>(row: &Value, tz: &Tz) -> Option<User> {
        let row = row.as_object()?;
        Some(User {
            user_id: first_i64(row, &["userId", "user_id"]),
            user_name: first_text(row, &["userName", "user_name"]).unwrap_or_default(),
            email: first_text(row, &["email"]),
            name: first_text(row, &["name"]).unwrap_or_default(),
            apellido_paterno: first_text(row, &["apellidoPaterno", "apellido_paterno"])
                .unwrap_or_default(),
            apellido_materno: first_text(row, &["apellidoMaterno", "apellido_materno"])
                .unwrap_or_default(),
            is_active: first_value(row, &["isActive", "is_active"]).map_or(true, truthy),
            desactived_at: first_timestamp(row, &["desactivedAt", "desactived_at"], tz),
            created_at: first_timestamp(row, &["createdAt", "created_at"], tz),
            updated_at: first_timestamp(row, &["updatedAt", "updated_at"], tz),
        })
    }
}

impl Session {
    /// Build a session from the `POST /auth/login` response body. A response
    /// without a token or a user object is not a session.
    pub fn from_login_response(body: &Value) -> Option<Session> {
        let body = body.as_object()?;
        let token = first_text(body, &["token"]).filter(|t| !t.is_empty())?;
        let user = body.get("user")?.as_object()?;
        Some(Session {
            token,
            user: AuthUser {
                id: first_text(user, &["id"]).unwrap_or_default(),
                username: first_text(user, &["username", "userName"]).unwrap_or_default(),
                email: first_text(user, &["email"]),
                is_admin: user.get("isAdmin").is_some_and(truthy),
            },
        })
    }
}
