//! Statistics aggregator: dashboard totals, per-machine groups and the
//! yearly month-by-month breakdown.
//!
//! All functions are pure and total: empty input, empty windows and records
//! without machine or message produce zeroed results, never errors.

use crate::period::Window;
use crate::types::{DashboardStatistics, LogRecord, MachineStatistic, MonthlyStatistic};
use chrono::{Datelike, TimeZone};
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

/// Short month labels, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

// `\w` is spelled out so the match stays ASCII-only.
static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)user\s*[=:][=:\s]*([A-Za-z0-9_]+)").expect("username pattern must compile")
});

/// Username mentioned in a log message: `user`, then a run of `=`, `:` and
/// spaces that holds at least one `=` or `:`, then a word. Only the first
/// occurrence counts.
pub fn extract_username(message: &str) -> Option<&str> {
    USERNAME_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Aggregate the records inside `window`.
///
/// Machines are ordered by access count, descending; machines with equal
/// counts keep the order in which they were first seen.
pub fn window_statistics(logs: &[LogRecord], window: &Window) -> DashboardStatistics {
    let mut groups: Vec<MachineStatistic> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut total_access = 0;

    for record in logs.iter().filter(|r| window.contains(r.timestamp)) {
        total_access += 1;
        let key = record.machine_key();
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(MachineStatistic::first_seen(key, record));
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.total_access += 1;
        if let Some(user) = record.message.as_deref().and_then(extract_username) {
            group.unique_users.insert(user.to_string());
        }
        if record.timestamp > group.last_access {
            group.last_access = record.timestamp;
        }
    }

    if total_access == 0 {
        return DashboardStatistics::default();
    }

    // Stable: ties stay in first-seen order.
    groups.sort_by(|a, b| b.total_access.cmp(&a.total_access));

    let unique_users = groups
        .iter()
        .flat_map(|g| g.unique_users.iter())
        .collect::<HashSet<_>>()
        .len();

    tracing::debug!(
        total_access,
        machines = groups.len(),
        unique_users,
        "aggregated window statistics"
    );

    DashboardStatistics {
        total_access,
        total_machines: groups.len(),
        unique_users,
        machine_stats: groups,
    }
}

/// Month-by-month counts for `year`, independent of any period filter.
/// Always twelve entries, January to December; the year and month of each
/// record are read in `tz`.
pub fn monthly_statistics<Tz: TimeZone>(
    logs: &[LogRecord],
    year: i32,
    tz: &Tz,
) -> Vec<MonthlyStatistic> {
    let mut accesses = [0usize; 12];
    let mut machines: [HashSet<&str>; 12] = Default::default();

    for record in logs {
        let local = record.timestamp.with_timezone(tz);
        if local.year() != year {
            continue;
        }
        let month = local.month0() as usize;
        accesses[month] += 1;
        machines[month].insert(record.machine_key());
    }

    MONTH_LABELS
        .iter()
        .zip(accesses.iter().zip(machines.iter()))
        .map(|(label, (accesses, machines))| MonthlyStatistic {
            month: (*label).to_string(),
            accesses: *accesses,
            active_machines: machines.len(),
        })
        .collect()
}

/// Distinct calendar years present in `logs`, newest first.
pub fn available_years<Tz: TimeZone>(logs: &[LogRecord], tz: &Tz) -> Vec<i32> {
    logs.iter()
        .map(|r| r.timestamp.with_timezone(tz).year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}
