use std::rc::Rc;

use glib::ControlFlow;

use super::window::AppState;

const TICK_INTERVAL_SECS: u32 = 5;

impl AppState {
    pub(super) fn restart_ticker(self: &Rc<Self>) {
        self.stop_ticker();
        let weak = Rc::downgrade(self);
        let id = glib::timeout_add_seconds_local(TICK_INTERVAL_SECS, move || {
            if let Some(state) = weak.upgrade() {
                state.tick();
                ControlFlow::Continue
            } else {
                ControlFlow::Break
            }
        });
        self.tick_source.replace(Some(id));
    }

    pub(super) fn stop_ticker(&self) {
        if let Some(source) = self.tick_source.borrow_mut().take() {
            source.remove();
        }
    }

    fn tick(&self) {
        let result = self.widget.borrow_mut().on_tick(self);
        if let Err(err) = result {
            log::warn!("Weekly reset check failed: {err:?}");
            self.refresh();
        }
    }
}
