use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};

use crate::json_store;
use crate::paths::AppPaths;

pub const MIN_PERCENT: i32 = 0;
pub const MAX_PERCENT: i32 = 100;

/// Week start and last update are kept as the raw strings found on disk so a
/// corrupt week start survives loading and can be repaired by the reset check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageState {
    #[serde(deserialize_with = "lenient_percent")]
    pub usage_percent: i32,
    pub week_start: Option<String>,
    pub last_updated: Option<String>,
}

impl UsageState {
    pub fn load(paths: &AppPaths) -> Self {
        let mut state: Self = json_store::load_merged(&paths.state_file);
        state.usage_percent = clamp_percent(i64::from(state.usage_percent));
        state
    }

    pub fn save(&self, paths: &AppPaths) -> Result<()> {
        json_store::save_pretty(self, &paths.state_file)
    }
}

/// Any JSON number is accepted and clamped; fractions truncate toward zero.
fn lenient_percent<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.clamp(f64::from(MIN_PERCENT), f64::from(MAX_PERCENT)).trunc() as i32)
}

pub fn clamp_percent(value: i64) -> i32 {
    value.clamp(i64::from(MIN_PERCENT), i64::from(MAX_PERCENT)) as i32
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn restart_reproduces_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        let state = UsageState {
            usage_percent: 72,
            week_start: Some("2026-10-12T00:00:00".into()),
            last_updated: Some("2026-10-15T09:12:44.5".into()),
        };
        state.save(&paths).unwrap();
        let reloaded = UsageState::load(&paths);
        assert_eq!(reloaded.usage_percent, 72);
        assert_eq!(reloaded.week_start, state.week_start);
        assert_eq!(reloaded, state);
    }

    #[test]
    fn out_of_range_percent_on_disk_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        fs::write(&paths.state_file, r#"{"usage_percent": 180}"#).unwrap();
        assert_eq!(UsageState::load(&paths).usage_percent, 100);
        fs::write(&paths.state_file, r#"{"usage_percent": -3}"#).unwrap();
        assert_eq!(UsageState::load(&paths).usage_percent, 0);
    }

    #[test]
    fn percent_beyond_i32_is_clamped_not_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        fs::write(&paths.state_file, r#"{"usage_percent": 5000000000}"#).unwrap();
        assert_eq!(UsageState::load(&paths).usage_percent, 100);
        fs::write(&paths.state_file, r#"{"usage_percent": -90000000000}"#).unwrap();
        assert_eq!(UsageState::load(&paths).usage_percent, 0);
    }

    #[test]
    fn fractional_percent_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        fs::write(
            &paths.state_file,
            r#"{"usage_percent": 55.0, "week_start": "2026-10-12T00:00:00"}"#,
        )
        .unwrap();
        let state = UsageState::load(&paths);
        assert_eq!(state.usage_percent, 55);
        assert_eq!(state.week_start.as_deref(), Some("2026-10-12T00:00:00"));
        fs::write(&paths.state_file, r#"{"usage_percent": 42.9}"#).unwrap();
        assert_eq!(UsageState::load(&paths).usage_percent, 42);
        fs::write(&paths.state_file, r#"{"usage_percent": 130.5}"#).unwrap();
        assert_eq!(UsageState::load(&paths).usage_percent, 100);
    }

    #[test]
    fn non_numeric_percent_falls_back_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        fs::write(&paths.state_file, r#"{"usage_percent": "lots", "last_updated": "x"}"#).unwrap();
        let state = UsageState::load(&paths);
        assert_eq!(state.usage_percent, 0);
        assert_eq!(state.last_updated.as_deref(), Some("x"));
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        fs::write(&paths.state_file, "usage_percent = 40").unwrap();
        assert_eq!(UsageState::load(&paths), UsageState::default());
    }

    #[test]
    fn written_file_uses_the_documented_keys() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        UsageState::default().save(&paths).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.state_file).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"usage_percent": 0, "week_start": null, "last_updated": null})
        );
    }
}
