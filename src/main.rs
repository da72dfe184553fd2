mod app;
mod application;
mod domain;
mod extractor;
mod ui;
mod utils;

use iced::{window, Size};

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let icon_data = include_bytes!("../assets/icon.png");

    let icon = match image::load_from_memory(icon_data) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            window::icon::from_rgba(rgba.into_raw(), width, height).ok()
        }
        Err(e) => {
            tracing::warn!("Failed to load window icon: {}", e);
            None
        }
    };

    iced::application(app::CheezeApp::default, app::update, app::view)
        .title("YouTube Video Downloader")
        .window(window::Settings {
            size: Size::new(800.0, 550.0),
            resizable: false,
            icon,
            ..Default::default()
        })
        .run()
}
