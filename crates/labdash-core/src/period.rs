//! Named dashboard periods and the inclusive windows they resolve to.
//!
//! Windows always span whole local days: the start is local midnight and the
//! end is 23:59:59.999 of the current day, both in the time zone of the
//! instant the period is resolved against.

use chrono::{
    DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An inclusive `[start, end]` range used to filter log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Inclusive at both ends.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Relative time-window shorthand offered by the dashboard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown period {0:?} (expected one of: 7days, 30days, week, month)")]
pub struct UnknownPeriod(pub String);

impl Period {
    pub const ALL: [Period; 4] = [
        Period::SevenDays,
        Period::ThirtyDays,
        Period::Week,
        Period::Month,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::SevenDays => "7days",
            Period::ThirtyDays => "30days",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Human label shown next to the statistics.
    pub fn label(self) -> &'static str {
        match self {
            Period::SevenDays => "Últimos 7 días",
            Period::ThirtyDays => "Últimos 30 días",
            Period::Week => "Esta semana",
            Period::Month => "Este mes",
        }
    }

    /// Resolve against the current local instant.
    pub fn resolve(self) -> Window {
        self.window_at(&Local::now())
    }

    /// Resolve against `now`. `week` starts on the most recent Sunday, which
    /// is today when today is a Sunday.
    pub fn window_at<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Window {
        let tz = now.timezone();
        let today = now.date_naive();
        let start_day = match self {
            Period::SevenDays => days_before(today, 7),
            Period::ThirtyDays => days_before(today, 30),
            Period::Week => days_before(today, today.weekday().num_days_from_sunday()),
            Period::Month => NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today),
        };

        let end_of_today = today.and_time(NaiveTime::default()) + TimeDelta::milliseconds(86_399_999);
        Window {
            start: to_utc(&tz, start_day.and_time(NaiveTime::default())),
            end: to_utc(&tz, end_of_today),
        }
    }
}

fn days_before(day: NaiveDate, n: u32) -> NaiveDate {
    day.checked_sub_days(Days::new(u64::from(n))).unwrap_or(day)
}

/// Wall-clock time in `tz` to an instant. A repeated hour (DST fall-back)
/// takes the earlier instant. A skipped one (spring-forward gap) is read with
/// the offset in force before the gap, which lands a skipped midnight on the
/// first instant after it.
pub(crate) fn to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    if let Some(ts) = tz.from_local_datetime(&naive).earliest() {
        return ts.with_timezone(&Utc);
    }
    let before = tz.offset_from_utc_datetime(&(naive - TimeDelta::days(1))).fix();
    (naive - TimeDelta::seconds(i64::from(before.local_minus_utc()))).and_utc()
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPeriod(s.to_string()))
    }
}
