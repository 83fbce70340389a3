mod api;
mod app;
mod application;
mod domain;
mod ui;

use iced::window;
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    iced::application(app::DocumentApp::default, app::update, app::view)
        .title("PDF Viewer")
        .subscription(app::subscription)
        .window(window::Settings {
            size: iced::Size::new(420.0, 640.0),
            ..Default::default()
        })
        .run()
}
