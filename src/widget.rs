//! Toolkit-independent widget logic. The GTK front end forwards pointer,
//! scroll, menu and timer events here and draws whatever [`Frame`] comes back.

use anyhow::Result;

use crate::clock::Clock;
use crate::gradient::{Rgb, gradient_color};
use crate::paths::AppPaths;
use crate::reset::{self, ResetOutcome};
use crate::settings::WidgetConfig;
use crate::state_store::UsageState;
use crate::usage;

/// Everything a view needs to draw one refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub percent: i32,
    pub color: Rgb,
    pub reset_label: String,
}

pub trait UsageView {
    fn render(&self, frame: &Frame);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    SetUsage(i32),
    Bump(i32),
    Reset,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

pub struct UsageWidget<C: Clock> {
    paths: AppPaths,
    config: WidgetConfig,
    state: UsageState,
    clock: C,
}

impl<C: Clock> UsageWidget<C> {
    /// Loads both records and applies the weekly reset once.
    pub fn open(paths: AppPaths, clock: C) -> Result<Self> {
        let config = WidgetConfig::load(&paths);
        let state = UsageState::load(&paths);
        let mut widget = Self {
            paths,
            config,
            state,
            clock,
        };
        widget.check_reset()?;
        Ok(widget)
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn state(&self) -> &UsageState {
        &self.state
    }

    pub fn frame(&self) -> Frame {
        let percent = self.state.usage_percent;
        let days = reset::days_until_reset(self.config.reset_day, self.clock.now());
        Frame {
            percent,
            color: gradient_color(percent),
            reset_label: format!("resets in {days}d"),
        }
    }

    pub fn set_usage(&mut self, pct: i64) -> Result<i32> {
        let stored = usage::set_usage(&mut self.state, pct, self.clock.now());
        self.state.save(&self.paths)?;
        log::debug!("Usage set to {stored}%");
        Ok(stored)
    }

    pub fn adjust(&mut self, delta: i64) -> Result<i32> {
        let stored = usage::adjust(&mut self.state, delta, self.clock.now());
        self.state.save(&self.paths)?;
        log::debug!("Usage adjusted by {delta} to {stored}%");
        Ok(stored)
    }

    pub fn check_reset(&mut self) -> Result<ResetOutcome> {
        let outcome = reset::check_weekly_reset(&mut self.state, &self.config, self.clock.now());
        if outcome.changed() {
            self.state.save(&self.paths)?;
        }
        match outcome {
            ResetOutcome::Reset => log::info!(
                "New week starting {} ({}); usage reset",
                self.state.week_start.as_deref().unwrap_or_default(),
                self.config.reset_day
            ),
            ResetOutcome::Repaired => log::info!("Week start repaired"),
            ResetOutcome::Initialized | ResetOutcome::Unchanged => {}
        }
        Ok(outcome)
    }

    pub fn on_drag(&mut self, x: i32, y: i32) -> Result<()> {
        if self.config.position() == Some((x, y)) {
            return Ok(());
        }
        self.config.position_x = Some(x);
        self.config.position_y = Some(y);
        self.config.save(&self.paths)
    }

    pub fn on_scroll(&mut self, direction: ScrollDirection) -> Result<i32> {
        let step = i64::from(self.config.scroll_step);
        match direction {
            ScrollDirection::Up => self.adjust(step),
            ScrollDirection::Down => self.adjust(-step),
        }
    }

    pub fn on_menu_action(&mut self, action: MenuAction) -> Result<Flow> {
        match action {
            MenuAction::SetUsage(pct) => {
                self.set_usage(i64::from(pct))?;
            }
            MenuAction::Bump(delta) => {
                self.adjust(i64::from(delta))?;
            }
            MenuAction::Reset => {
                self.set_usage(0)?;
            }
            MenuAction::Exit => {
                self.save_all()?;
                return Ok(Flow::Close);
            }
        }
        Ok(Flow::Continue)
    }

    pub fn save_all(&self) -> Result<()> {
        self.state.save(&self.paths)?;
        self.config.save(&self.paths)
    }

    pub fn on_tick(&mut self, view: &impl UsageView) -> Result<ResetOutcome> {
        let outcome = self.check_reset()?;
        view.render(&self.frame());
        Ok(outcome)
    }

    /// Full opacity while the pointer is over the widget.
    pub fn opacity(&self, hovered: bool) -> f64 {
        if hovered { 1.0 } else { self.config.opacity }
    }
}
