use chrono::NaiveDateTime;

use crate::reset::format_timestamp;
use crate::state_store::{UsageState, clamp_percent};

/// Stores `pct` clamped to 0..=100 and stamps the update time. Returns the
/// stored value.
pub fn set_usage(state: &mut UsageState, pct: i64, now: NaiveDateTime) -> i32 {
    state.usage_percent = clamp_percent(pct);
    state.last_updated = Some(format_timestamp(now));
    state.usage_percent
}

pub fn adjust(state: &mut UsageState, delta: i64, now: NaiveDateTime) -> i32 {
    let target = i64::from(state.usage_percent).saturating_add(delta);
    set_usage(state, target, now)
}
