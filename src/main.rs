mod app;
mod color;
mod config;
mod data;
mod state;
mod theme;
mod ui;

use app::LibrosApp;
use clap::Parser;
use config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();
    let config = Config::parse();
    log::debug!("starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Libros LATAM – Publishing Market Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(LibrosApp::new(cc, config)))),
    )
}
