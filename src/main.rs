//! Scribble - sticky-note markdown application
//!
//! Notes live as plain markdown files in a configurable folder, one file per
//! note, with pin/color metadata embedded as a trailing comment.

mod app;
mod core;
mod ui;

use app::ScribbleApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Scribble...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("Scribble"),
        ..Default::default()
    };

    eframe::run_native(
        "Scribble",
        native_options,
        Box::new(|cc| Ok(Box::new(ScribbleApp::new(cc)))),
    )
}
