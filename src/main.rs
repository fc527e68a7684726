#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod cache;
mod carousel;
mod catalog;
mod config;
mod error;
mod feedback;
mod gallery;
mod gesture;
mod media;
mod modal;
mod playback;
mod ui;
mod view_filter;

use std::path::PathBuf;

use app::GalleryApp;
use config::GalleryConfig;
use eframe::egui;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_config(explicit.as_deref());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([360.0, 600.0])
            .with_title("Esmeraldas"),
        ..Default::default()
    };

    eframe::run_native(
        "Emerald Gallery",
        options,
        Box::new(|cc| {
            ui::setup_custom_style(&cc.egui_ctx);

            // Load image loaders for egui
            egui_extras::install_image_loaders(&cc.egui_ctx);

            Ok(Box::new(GalleryApp::new(cc, config)))
        }),
    )
}

/// A broken config file never blocks startup: fall back to the built-in one
fn load_config(explicit: Option<&std::path::Path>) -> GalleryConfig {
    match GalleryConfig::load(explicit) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}; using built-in defaults", e);
            GalleryConfig::builtin().unwrap_or_default()
        }
    }
}
