use std::rc::Rc;

use gio::prelude::*;
use gtk4::prelude::*;
use gtk4::{self as gtk};

use crate::widget::MenuAction;

use super::window::AppState;

const ACTION_GROUP: &str = "widget";

pub(super) fn build_context_menu(parent: &gtk::Box, quick_bumps: &[i32]) -> gtk::PopoverMenu {
    let set_section = gio::Menu::new();
    set_section.append(Some("Set Usage %…"), Some("widget.set-usage"));

    let bump_section = gio::Menu::new();
    for bump in quick_bumps {
        let item = gio::MenuItem::new(Some(&format!("{bump:+} %")), None);
        item.set_action_and_target_value(Some("widget.bump"), Some(&bump.to_variant()));
        bump_section.append_item(&item);
    }

    let reset_section = gio::Menu::new();
    reset_section.append(Some("Reset to 0 %"), Some("widget.reset"));

    let exit_section = gio::Menu::new();
    exit_section.append(Some("Exit"), Some("widget.exit"));

    let menu = gio::Menu::new();
    menu.append_section(None, &set_section);
    if !quick_bumps.is_empty() {
        menu.append_section(None, &bump_section);
    }
    menu.append_section(None, &reset_section);
    menu.append_section(None, &exit_section);

    let popover = gtk::PopoverMenu::from_model(Some(&menu));
    popover.set_has_arrow(false);
    popover.set_halign(gtk::Align::Start);
    popover.set_parent(parent);
    popover
}

impl AppState {
    pub(super) fn install_actions(self: &Rc<Self>) {
        let group = gio::SimpleActionGroup::new();

        let set_usage = gio::SimpleAction::new("set-usage", None);
        {
            let weak = Rc::downgrade(self);
            set_usage.connect_activate(move |_, _| {
                if let Some(state) = weak.upgrade() {
                    state.prompt_set_usage();
                }
            });
        }
        group.add_action(&set_usage);

        let bump = gio::SimpleAction::new("bump", Some(glib::VariantTy::INT32));
        {
            let weak = Rc::downgrade(self);
            bump.connect_activate(move |_, param| {
                let Some(delta) = param.and_then(|v| v.get::<i32>()) else {
                    return;
                };
                if let Some(state) = weak.upgrade() {
                    state.dispatch(MenuAction::Bump(delta));
                }
            });
        }
        group.add_action(&bump);

        for (name, action) in [("reset", MenuAction::Reset), ("exit", MenuAction::Exit)] {
            let simple = gio::SimpleAction::new(name, None);
            let weak = Rc::downgrade(self);
            simple.connect_activate(move |_, _| {
                if let Some(state) = weak.upgrade() {
                    state.dispatch(action);
                }
            });
            group.add_action(&simple);
        }

        self.window.insert_action_group(ACTION_GROUP, Some(&group));
    }

    /// Spin button limited to 0..=100, pre-filled with the current value.
    /// Cancelling leaves the usage untouched.
    pub(super) fn prompt_set_usage(self: &Rc<Self>) {
        let dialog = gtk::Dialog::builder()
            .title("Set Usage")
            .transient_for(&self.window)
            .modal(true)
            .build();
        dialog.add_button("Cancel", gtk::ResponseType::Cancel);
        dialog.add_button("Set", gtk::ResponseType::Accept);
        dialog.set_default_response(gtk::ResponseType::Accept);

        let prompt = gtk::Label::new(Some("Enter usage percentage (0–100):"));
        prompt.set_xalign(0.0);
        prompt.set_margin_top(12);
        prompt.set_margin_start(12);
        prompt.set_margin_end(12);

        let spin = gtk::SpinButton::with_range(0.0, 100.0, 1.0);
        spin.set_numeric(true);
        spin.set_activates_default(true);
        spin.set_value(f64::from(self.widget.borrow().state().usage_percent));
        spin.set_margin_top(6);
        spin.set_margin_bottom(12);
        spin.set_margin_start(12);
        spin.set_margin_end(12);

        dialog.content_area().append(&prompt);
        dialog.content_area().append(&spin);
        spin.grab_focus();

        let weak = Rc::downgrade(self);
        let spin_clone = spin.clone();
        dialog.connect_response(move |dialog, response| {
            if response == gtk::ResponseType::Accept {
                if let Some(state) = weak.upgrade() {
                    spin_clone.update();
                    state.dispatch(MenuAction::SetUsage(spin_clone.value_as_int()));
                }
            }
            dialog.close();
        });
        dialog.show();
    }
}
