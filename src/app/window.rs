use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use gtk4::gdk;
use gtk4::prelude::*;
use gtk4::{self as gtk, cairo};
use libadwaita as adw;

use crate::clock::SystemClock;
use crate::paths::AppPaths;
use crate::widget::{Flow, Frame, MenuAction, ScrollDirection, UsageView, UsageWidget};

use super::menu;

const BAR_HEIGHT: i32 = 16;
const TRACK_RGB: (f64, f64, f64) = (13.0 / 255.0, 13.0 / 255.0, 26.0 / 255.0);

const CSS: &str = "
window.usagebar { background-color: #1a1a2e; }
.usagebar-frame { border: 1px solid #333355; }
.usagebar-title { color: #8888aa; font-size: 8pt; }
.usagebar-reset { color: #666680; font-size: 7pt; }
.usagebar-pct { font-size: 11pt; font-weight: 600; }
";

pub fn build_ui(application: &adw::Application) -> Result<()> {
    if let Some(window) = application.active_window() {
        window.present();
        return Ok(());
    }

    let paths = AppPaths::initialize()?;
    let widget = UsageWidget::open(paths, SystemClock)?;
    install_css();

    let title_label = gtk::Label::new(Some("Usage"));
    title_label.set_xalign(0.0);
    title_label.set_hexpand(true);
    title_label.add_css_class("usagebar-title");
    let reset_label = gtk::Label::new(None);
    reset_label.set_xalign(1.0);
    reset_label.add_css_class("usagebar-reset");

    let header = gtk::Box::builder()
        .orientation(gtk::Orientation::Horizontal)
        .margin_start(8)
        .margin_end(8)
        .margin_top(5)
        .build();
    header.append(&title_label);
    header.append(&reset_label);

    let bar = gtk::DrawingArea::builder()
        .content_height(BAR_HEIGHT)
        .hexpand(true)
        .valign(gtk::Align::Center)
        .build();
    let pct_label = gtk::Label::new(Some("0%"));
    pct_label.set_width_chars(5);
    pct_label.set_xalign(1.0);
    pct_label.add_css_class("usagebar-pct");

    let bar_row = gtk::Box::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(6)
        .margin_start(8)
        .margin_end(8)
        .margin_top(2)
        .margin_bottom(6)
        .build();
    bar_row.append(&bar);
    bar_row.append(&pct_label);

    let root = gtk::Box::builder()
        .orientation(gtk::Orientation::Vertical)
        .build();
    root.add_css_class("usagebar-frame");
    root.append(&header);
    root.append(&bar_row);

    let config = widget.config().clone();
    let window = adw::ApplicationWindow::builder()
        .application(application)
        .title("Usage")
        .default_width(config.width)
        .default_height(config.height)
        .resizable(false)
        .decorated(false)
        .content(&root)
        .build();
    window.add_css_class("usagebar");
    window.set_opacity(widget.opacity(false));

    let context_menu = menu::build_context_menu(&root, &config.quick_bumps);
    let drag_anchor = config.initial_position(primary_screen_width());

    let state = Rc::new(AppState {
        window: window.clone(),
        bar: bar.clone(),
        pct_label,
        reset_label,
        context_menu,
        frame: RefCell::new(widget.frame()),
        widget: RefCell::new(widget),
        drag_anchor: Cell::new(drag_anchor),
        moving: Cell::new(false),
        tick_source: RefCell::new(None),
    });

    state.install_actions();
    state.hook_bar(&bar);
    state.install_drag(&root);
    state.hook_pointer(&root);
    state.refresh();
    state.restart_ticker();

    {
        let state = Rc::clone(&state);
        window.connect_close_request(move |_| {
            state.stop_ticker();
            if let Err(err) = state.widget.borrow().save_all() {
                log::warn!("Failed to save on close: {err:?}");
            }
            glib::Propagation::Proceed
        });
    }

    window.present();
    log::debug!(
        "Widget shown; last known position {:?} (placement is left to the compositor)",
        drag_anchor
    );
    Ok(())
}

pub(super) struct AppState {
    pub(super) window: adw::ApplicationWindow,
    pub(super) bar: gtk::DrawingArea,
    pub(super) pct_label: gtk::Label,
    pub(super) reset_label: gtk::Label,
    pub(super) context_menu: gtk::PopoverMenu,
    pub(super) frame: RefCell<Frame>,
    pub(super) widget: RefCell<UsageWidget<SystemClock>>,
    pub(super) drag_anchor: Cell<(i32, i32)>,
    pub(super) moving: Cell<bool>,
    pub(super) tick_source: RefCell<Option<glib::SourceId>>,
}

impl UsageView for AppState {
    fn render(&self, frame: &Frame) {
        self.pct_label.set_markup(&format!(
            "<span foreground=\"{}\">{}%</span>",
            frame.color.hex(),
            frame.percent
        ));
        self.reset_label.set_text(&frame.reset_label);
        self.frame.replace(frame.clone());
        self.bar.queue_draw();
    }
}

impl AppState {
    pub(super) fn refresh(&self) {
        let frame = self.widget.borrow().frame();
        self.render(&frame);
    }

    pub(super) fn dispatch(&self, action: MenuAction) {
        let flow = self.widget.borrow_mut().on_menu_action(action);
        match flow {
            Ok(Flow::Close) => {
                self.window.close();
                return;
            }
            Ok(Flow::Continue) => {}
            Err(err) => log::warn!("Failed to apply {action:?}: {err:?}"),
        }
        self.refresh();
    }

    fn scroll(&self, direction: ScrollDirection) {
        if let Err(err) = self.widget.borrow_mut().on_scroll(direction) {
            log::warn!("Failed to save usage: {err:?}");
        }
        self.refresh();
    }

    fn draw_bar(&self, cr: &cairo::Context, width: i32, height: i32) {
        let frame = self.frame.borrow();
        let (width, height) = (f64::from(width), f64::from(height));
        let fill = (f64::from(frame.percent) / 100.0 * width).max(0.0).floor();

        let (r, g, b) = TRACK_RGB;
        cr.set_source_rgb(r, g, b);
        cr.rectangle(0.0, 0.0, width, height);
        if let Err(err) = cr.fill() {
            log::warn!("Failed to draw bar track: {err}");
            return;
        }
        if fill > 0.0 {
            let (r, g, b) = frame.color.fractions();
            cr.set_source_rgb(r, g, b);
            cr.rectangle(0.0, 0.0, fill, height);
            if let Err(err) = cr.fill() {
                log::warn!("Failed to draw bar fill: {err}");
            }
        }
    }

    fn hook_bar(self: &Rc<Self>, bar: &gtk::DrawingArea) {
        let weak = Rc::downgrade(self);
        bar.set_draw_func(move |_, cr, width, height| {
            if let Some(state) = weak.upgrade() {
                state.draw_bar(cr, width, height);
            }
        });

        let double_click = gtk::GestureClick::new();
        let weak = Rc::downgrade(self);
        double_click.connect_pressed(move |_, n_press, _, _| {
            if n_press == 2 {
                if let Some(state) = weak.upgrade() {
                    state.prompt_set_usage();
                }
            }
        });
        bar.add_controller(double_click);
    }

    /// Primary-button drags anywhere on `target` move the window through the
    /// compositor, except on the bar, which keeps its double-click.
    fn install_drag(self: &Rc<Self>, target: &impl IsA<gtk::Widget>) {
        let drag = gtk::GestureDrag::new();
        {
            let weak = Rc::downgrade(self);
            let target = target.clone().upcast::<gtk::Widget>();
            drag.connect_drag_begin(move |gesture, x, y| {
                if let Some(state) = weak.upgrade() {
                    state.begin_move(gesture, &target, x, y);
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            drag.connect_drag_end(move |_, dx, dy| {
                if let Some(state) = weak.upgrade() {
                    state.finish_move(dx, dy);
                }
            });
        }
        target.add_controller(drag);
    }

    fn begin_move(&self, gesture: &gtk::GestureDrag, target: &gtk::Widget, x: f64, y: f64) {
        if self.starts_on_bar(target, x, y) {
            return;
        }
        let Some(device) = gesture.device() else {
            return;
        };
        let Some(toplevel) = self
            .window
            .surface()
            .and_then(|surface| surface.dynamic_cast::<gdk::Toplevel>().ok())
        else {
            return;
        };
        let (x, y) = target
            .translate_coordinates(&self.window, x, y)
            .unwrap_or((x, y));
        self.moving.set(true);
        toplevel.begin_move(
            &device,
            gesture.current_button() as i32,
            x,
            y,
            gesture.current_event_time(),
        );
    }

    fn starts_on_bar(&self, target: &gtk::Widget, x: f64, y: f64) -> bool {
        target
            .pick(x, y, gtk::PickFlags::DEFAULT)
            .is_some_and(|picked| {
                picked == *self.bar.upcast_ref::<gtk::Widget>() || picked.is_ancestor(&self.bar)
            })
    }

    /// Records where the drag left the window, as far as the pointer offset
    /// tells us. The compositor may own the move entirely, in which case the
    /// offset is zero and nothing is recorded.
    ///
    /// The saved position is approximate: GTK4 never reports the real window
    /// origin, so the offset is added to the last stored position (or the
    /// default top-right anchor) rather than to where the window actually sat.
    fn finish_move(&self, dx: f64, dy: f64) {
        if !self.moving.replace(false) || (dx == 0.0 && dy == 0.0) {
            return;
        }
        let (x, y) = self.drag_anchor.get();
        let moved = (x + dx.round() as i32, y + dy.round() as i32);
        self.drag_anchor.set(moved);
        if let Err(err) = self.widget.borrow_mut().on_drag(moved.0, moved.1) {
            log::warn!("Failed to save position: {err:?}");
        }
    }

    fn hook_pointer(self: &Rc<Self>, root: &gtk::Box) {
        let scroll = gtk::EventControllerScroll::new(
            gtk::EventControllerScrollFlags::VERTICAL | gtk::EventControllerScrollFlags::DISCRETE,
        );
        {
            let weak = Rc::downgrade(self);
            scroll.connect_scroll(move |_, _, dy| {
                let direction = if dy < 0.0 {
                    ScrollDirection::Up
                } else if dy > 0.0 {
                    ScrollDirection::Down
                } else {
                    return glib::Propagation::Proceed;
                };
                if let Some(state) = weak.upgrade() {
                    state.scroll(direction);
                }
                glib::Propagation::Stop
            });
        }
        self.window.add_controller(scroll);

        let hover = gtk::EventControllerMotion::new();
        {
            let weak = Rc::downgrade(self);
            hover.connect_enter(move |_, _, _| {
                if let Some(state) = weak.upgrade() {
                    state.window.set_opacity(state.widget.borrow().opacity(true));
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            hover.connect_leave(move |_| {
                if let Some(state) = weak.upgrade() {
                    state.window.set_opacity(state.widget.borrow().opacity(false));
                }
            });
        }
        self.window.add_controller(hover);

        let right_click = gtk::GestureClick::new();
        right_click.set_button(gdk::BUTTON_SECONDARY);
        {
            let weak = Rc::downgrade(self);
            right_click.connect_pressed(move |_, _, x, y| {
                if let Some(state) = weak.upgrade() {
                    let point = gdk::Rectangle::new(x as i32, y as i32, 1, 1);
                    state.context_menu.set_pointing_to(Some(&point));
                    state.context_menu.popup();
                }
            });
        }
        root.add_controller(right_click);
    }
}

fn install_css() {
    let Some(display) = gdk::Display::default() else {
        log::warn!("No display available for styling");
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_data(CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}

fn primary_screen_width() -> i32 {
    gdk::Display::default()
        .and_then(|display| display.monitors().item(0))
        .and_downcast::<gdk::Monitor>()
        .map(|monitor| monitor.geometry().width())
        .unwrap_or(1920)
}
