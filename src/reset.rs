use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::settings::WidgetConfig;
use crate::state_store::UsageState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResetDay {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl ResetDay {
    pub const ALL: [ResetDay; 7] = [
        ResetDay::Monday,
        ResetDay::Tuesday,
        ResetDay::Wednesday,
        ResetDay::Thursday,
        ResetDay::Friday,
        ResetDay::Saturday,
        ResetDay::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResetDay::Monday => "Monday",
            ResetDay::Tuesday => "Tuesday",
            ResetDay::Wednesday => "Wednesday",
            ResetDay::Thursday => "Thursday",
            ResetDay::Friday => "Friday",
            ResetDay::Saturday => "Saturday",
            ResetDay::Sunday => "Sunday",
        }
    }

    /// Monday is 0.
    pub fn index(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for ResetDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResetDay {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResetDay::ALL
            .into_iter()
            .find(|day| day.name() == s)
            .ok_or_else(|| anyhow!("Unknown reset day `{s}`"))
    }
}

/// Midnight of the latest `reset_day` on or before `now`.
pub fn current_week_start(reset_day: ResetDay, now: NaiveDateTime) -> NaiveDateTime {
    let weekday = i64::from(now.weekday().num_days_from_monday());
    let days_since = (weekday - reset_day.index()).rem_euclid(7);
    (now.date() - Duration::days(days_since)).and_time(NaiveTime::MIN)
}

pub fn days_until_reset(reset_day: ResetDay, now: NaiveDateTime) -> i64 {
    let next = current_week_start(reset_day, now) + Duration::days(7);
    (next - now).num_days()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Unchanged,
    /// No week start was stored yet.
    Initialized,
    /// The stored week start did not parse and was overwritten.
    Repaired,
    /// A reset boundary was crossed; usage went back to zero.
    Reset,
}

impl ResetOutcome {
    pub fn changed(self) -> bool {
        self != ResetOutcome::Unchanged
    }
}

/// Applies the weekly reset to `state` in memory. The caller persists the
/// record whenever the outcome reports a change.
pub fn check_weekly_reset(
    state: &mut UsageState,
    config: &WidgetConfig,
    now: NaiveDateTime,
) -> ResetOutcome {
    let current = current_week_start(config.reset_day, now);
    let outcome = match state.week_start.as_deref().filter(|s| !s.is_empty()) {
        None => ResetOutcome::Initialized,
        Some(stored) => match parse_timestamp(stored) {
            Some(last) if current > last => {
                state.usage_percent = 0;
                ResetOutcome::Reset
            }
            Some(_) => ResetOutcome::Unchanged,
            None => {
                log::warn!("Stored week start `{stored}` is corrupt; repairing");
                ResetOutcome::Repaired
            }
        },
    };
    if outcome.changed() {
        state.week_start = Some(format_timestamp(current));
        state.last_updated = Some(format_timestamp(now));
    }
    outcome
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Accepts naive ISO-8601 date-times (with or without fractional seconds),
/// offset-carrying RFC 3339 values (read as their local wall time) and bare
/// dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    raw.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            raw.parse::<chrono::NaiveDate>()
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
