//! Core types shared by every labdash layer.
//!
//! [`LogRecord`] is the canonical pGina access-log row; the statistic types
//! are view-models recomputed from a log collection on every request and are
//! never persisted. [`User`] mirrors the user rows served by the admin API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Group key used for records whose `machine` is absent or empty.
pub const MISSING_MACHINE: &str = "Sin máquina especificada";

/// A normalised access-log record. Built by [`LogRecord::from_row`](crate::normalizer)
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub host: Option<String>,
    pub ip: Option<String>,
    pub machine: Option<String>,
    pub message: Option<String>,
}

impl LogRecord {
    /// The machine group this record belongs to.
    pub fn machine_key(&self) -> &str {
        match self.machine.as_deref() {
            Some(machine) if !machine.is_empty() => machine,
            _ => MISSING_MACHINE,
        }
    }
}

/// Per-machine aggregate within a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatistic {
    pub machine: String,
    pub total_access: usize,
    pub unique_users: BTreeSet<String>,
    /// Latest timestamp seen for this machine.
    pub last_access: DateTime<Utc>,
    /// Captured from the first record of the group; never overwritten.
    pub ip: Option<String>,
    /// Captured from the first record of the group; never overwritten.
    pub host: Option<String>,
}

impl MachineStatistic {
    pub(crate) fn first_seen(machine: &str, record: &LogRecord) -> Self {
        Self {
            machine: machine.to_string(),
            total_access: 0,
            unique_users: BTreeSet::new(),
            last_access: record.timestamp,
            ip: record.ip.clone(),
            host: record.host.clone(),
        }
    }
}

/// One calendar month of a yearly breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatistic {
    pub month: String,
    pub accesses: usize,
    pub active_machines: usize,
}

/// Dashboard totals for a window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    pub total_access: usize,
    pub total_machines: usize,
    /// Size of the union of every machine's user set.
    pub unique_users: usize,
    pub machine_stats: Vec<MachineStatistic>,
}

/// A user account as listed by the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: Option<i64>,
    pub user_name: String,
    pub email: Option<String>,
    pub name: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
    pub is_active: bool,
    pub desactived_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// A fresh, active account carrying only a user name.
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_id: None,
            user_name: user_name.into(),
            email: None,
            name: String::new(),
            apellido_paterno: String::new(),
            apellido_materno: String::new(),
            is_active: true,
            desactived_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Name and both surnames, skipping blanks.
    pub fn full_name(&self) -> String {
        [&self.name, &self.apellido_paterno, &self.apellido_materno]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Body of `POST /users/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub user_name: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(machine: Option<&str>) -> LogRecord {
        LogRecord {
            timestamp: Utc::now(),
            host: None,
            ip: None,
            machine: machine.map(str::to_string),
            message: None,
        }
    }

    #[test]
    fn empty_and_absent_machines_share_placeholder() {
        assert_eq!(record(None).machine_key(), MISSING_MACHINE);
        assert_eq!(record(Some("")).machine_key(), MISSING_MACHINE);
        assert_eq!(record(Some("LAB-01")).machine_key(), "LAB-01");
    }

    #[test]
    fn full_name_skips_blank_parts() {
        let mut user = User::new("ana");
        user.name = "Ana".into();
        user.apellido_materno = "Diaz".into();
        assert_eq!(user.full_name(), "Ana Diaz");
    }

    #[test]
    fn create_input_omits_missing_email() {
        let input = CreateUserInput {
            user_name: "ana".into(),
            password: "x".into(),
            email: None,
            name: "Ana".into(),
            apellido_paterno: "Lopez".into(),
            apellido_materno: "Diaz".into(),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["userName"], "ana");
        assert_eq!(json["apellidoPaterno"], "Lopez");
        assert!(json.get("email").is_none());
    }
}
