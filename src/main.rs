mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::AirlensApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Data file: first CLI argument, falling back to ./all_data.csv when
    // present. Without either, start empty and use File → Open.
    let data_path = std::env::args().nth(1).map(PathBuf::from).or_else(|| {
        let default = PathBuf::from("all_data.csv");
        default.exists().then_some(default)
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Airlens – Air Quality Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(AirlensApp::new(data_path)))),
    )
}
