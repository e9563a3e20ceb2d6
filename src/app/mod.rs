mod menu;
mod ticker;
mod window;

pub use window::build_ui;
