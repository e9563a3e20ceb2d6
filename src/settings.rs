use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::json_store;
use crate::paths::AppPaths;
use crate::reset::ResetDay;

const DEFAULT_WIDTH: i32 = 230;
const DEFAULT_HEIGHT: i32 = 52;
const DEFAULT_OPACITY: f64 = 0.85;
const DEFAULT_SCROLL_STEP: i32 = 1;
const DEFAULT_QUICK_BUMPS: [i32; 3] = [5, 10, 25];
const SCREEN_MARGIN: i32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub reset_day: ResetDay,
    pub opacity: f64,
    pub width: i32,
    pub height: i32,
    pub position_x: Option<i32>,
    pub position_y: Option<i32>,
    pub scroll_step: i32,
    pub quick_bumps: Vec<i32>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            reset_day: ResetDay::default(),
            opacity: DEFAULT_OPACITY,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            position_x: None,
            position_y: None,
            scroll_step: DEFAULT_SCROLL_STEP,
            quick_bumps: DEFAULT_QUICK_BUMPS.to_vec(),
        }
    }
}

impl WidgetConfig {
    pub fn load(paths: &AppPaths) -> Self {
        let mut config: Self = json_store::load_merged(&paths.config_file);
        config.normalize();
        config
    }

    pub fn save(&self, paths: &AppPaths) -> Result<()> {
        json_store::save_pretty(self, &paths.config_file)
    }

    fn normalize(&mut self) {
        if !self.opacity.is_finite() {
            self.opacity = DEFAULT_OPACITY;
        }
        self.opacity = self.opacity.clamp(0.0, 1.0);
        self.width = self.width.max(1);
        self.height = self.height.max(1);
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.position_x.zip(self.position_y)
    }

    /// Stored position, or the top-right corner of a screen `screen_width`
    /// pixels wide.
    pub fn initial_position(&self, screen_width: i32) -> (i32, i32) {
        self.position()
            .unwrap_or((screen_width - self.width - SCREEN_MARGIN, SCREEN_MARGIN))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        assert_eq!(WidgetConfig::load(&paths), WidgetConfig::default());
    }

    #[test]
    fn older_file_gains_new_keys_and_keeps_present_ones() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        fs::write(
            &paths.config_file,
            r#"{"reset_day": "Thursday", "opacity": 0.5, "position_x": 100, "position_y": 40}"#,
        )
        .unwrap();
        let config = WidgetConfig::load(&paths);
        assert_eq!(config.reset_day, ResetDay::Thursday);
        assert_eq!(config.opacity, 0.5);
        assert_eq!(config.position(), Some((100, 40)));
        assert_eq!(config.width, 230);
        assert_eq!(config.scroll_step, 1);
        assert_eq!(config.quick_bumps, vec![5, 10, 25]);
    }

    #[test]
    fn unknown_reset_day_falls_back_without_losing_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        fs::write(&paths.config_file, r#"{"reset_day": "Caturday", "width": 300}"#).unwrap();
        let config = WidgetConfig::load(&paths);
        assert_eq!(config.reset_day, ResetDay::Monday);
        assert_eq!(config.width, 300);
    }

    #[test]
    fn out_of_range_values_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        fs::write(&paths.config_file, r#"{"opacity": 3.5, "height": -4}"#).unwrap();
        let config = WidgetConfig::load(&paths);
        assert_eq!(config.opacity, 1.0);
        assert_eq!(config.height, 1);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        let config = WidgetConfig {
            reset_day: ResetDay::Saturday,
            position_x: Some(12),
            position_y: Some(640),
            quick_bumps: vec![1, 50],
            ..WidgetConfig::default()
        };
        config.save(&paths).unwrap();
        assert_eq!(WidgetConfig::load(&paths), config);
    }

    #[test]
    fn initial_position_defaults_to_top_right() {
        let config = WidgetConfig::default();
        assert_eq!(config.initial_position(1920), (1920 - 230 - 20, 20));
        let placed = WidgetConfig {
            position_x: Some(5),
            position_y: Some(6),
            ..WidgetConfig::default()
        };
        assert_eq!(placed.initial_position(1920), (5, 6));
    }
}
