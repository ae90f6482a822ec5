//! Test builders: ergonomic constructors for `LogRecord` and `User`.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use labdash_core::{LogRecord, User};

/// `Utc` instant from calendar parts.
pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single().expect("valid test timestamp")
}

// ---------------------------------------------------------------------------
// LogRecordBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`LogRecord`] test fixtures.
///
/// # Example
///
/// ```rust
/// let record = LogRecordBuilder::new("LAB-01")
///     .at(utc(2026, 3, 4, 9, 0, 0))
///     .user("jdoe")
///     .ip("10.0.0.7")
///     .build();
/// ```
pub struct LogRecordBuilder {
    timestamp: DateTime<Utc>,
    host: Option<String>,
    ip: Option<String>,
    machine: Option<String>,
    message: Option<String>,
}

impl LogRecordBuilder {
    pub fn new(machine: impl Into<String>) -> Self {
        Self {
            timestamp: utc(2026, 1, 1, 0, 0, 0),
            host: None,
            ip: None,
            machine: Some(machine.into()),
            message: None,
        }
    }

    /// A record with no machine at all.
    pub fn unassigned() -> Self {
        Self { machine: None, ..Self::new("") }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Shorthand for a pGina-style `login user=<name> success` message.
    pub fn user(self, name: &str) -> Self {
        self.message(format!("login user={name} success"))
    }

    pub fn build(self) -> LogRecord {
        LogRecord {
            timestamp: self.timestamp,
            host: self.host,
            ip: self.ip,
            machine: self.machine,
            message: self.message,
        }
    }
}

// ---------------------------------------------------------------------------
// UserBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`User`]. Unset names and email are filled with fake data.
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    pub fn new(user_name: impl Into<String>) -> Self {
        let mut user = User::new(user_name);
        user.name = FirstName().fake();
        user.apellido_paterno = LastName().fake();
        user.apellido_materno = LastName().fake();
        user.email = Some(SafeEmail().fake());
        Self { user }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.user.user_id = Some(id);
        self
    }

    pub fn name(mut self, name: &str, paterno: &str, materno: &str) -> Self {
        self.user.name = name.to_string();
        self.user.apellido_paterno = paterno.to_string();
        self.user.apellido_materno = materno.to_string();
        self
    }

    pub fn email(mut self, email: Option<&str>) -> Self {
        self.user.email = email.map(str::to_string);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.user.is_active = false;
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.user.created_at = Some(at);
        self
    }

    pub fn build(self) -> User {
        self.user
    }
}

/// Users as `GET /users` would return them, ready for `FakeApi::set_users`.
pub fn user_payload(users: &[User]) -> serde_json::Value {
    serde_json::to_value(users).expect("users serialize")
}

/// `count` generated accounts `alumno01`, `alumno02`, … with ids from 1.
pub fn generated_users(count: usize) -> Vec<User> {
    (1..=count)
        .map(|i| UserBuilder::new(format!("alumno{i:02}")).id(i as i64).build())
        .collect()
}
