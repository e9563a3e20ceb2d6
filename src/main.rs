mod app;
mod clock;
mod gradient;
mod json_store;
mod paths;
mod reset;
mod settings;
mod state_store;
mod usage;
mod widget;

use gtk4::prelude::*;
use libadwaita as adw;

fn main() -> glib::ExitCode {
    env_logger::init();

    let app = adw::Application::builder()
        .application_id("com.usagebar.Usagebar")
        .flags(gio::ApplicationFlags::empty())
        .build();

    app.connect_activate(|application| {
        if let Err(err) = app::build_ui(application) {
            log::error!("Failed to start widget: {err:?}");
            application.quit();
        }
    });

    app.run()
}
