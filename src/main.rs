mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::CountyCasesApp;
use clap::Parser;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();
    let args = config::Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let app = CountyCasesApp::new(&args);

    eframe::run_native(
        "County Cases – COVID-19 Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
