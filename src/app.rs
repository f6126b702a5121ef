use std::path::Path;
use std::sync::Arc;

use eframe::egui;

use crate::config::Args;
use crate::data::loader;
use crate::state::{AppState, View};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CountyCasesApp {
    pub state: AppState,
}

impl CountyCasesApp {
    pub fn new(args: &Args) -> Self {
        let mut state = AppState::new(args.variant);
        if let Some(path) = &args.data {
            load_into(&mut state, path);
        }
        Self { state }
    }
}

/// Load `path` and hand the dataset to the session, or report the failure
/// in the status line.
pub fn load_into(state: &mut AppState, path: &Path) {
    match loader::load_file(path) {
        Ok(dataset) => state.set_dataset(Arc::new(dataset)),
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

impl eframe::App for CountyCasesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot or tables ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Plot => plot::cases_plot(ui, &self.state),
            View::Table => table::records_table(ui, &self.state),
            View::Summary => table::summary_table(ui, &self.state),
        });
    }
}
