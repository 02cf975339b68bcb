use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AirlensApp {
    pub state: AppState,
}

impl AirlensApp {
    pub fn new(initial_path: Option<PathBuf>) -> Self {
        let mut state = AppState::default();
        if let Some(path) = initial_path {
            state.open_path(&path);
        }
        Self { state }
    }
}

impl eframe::App for AirlensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Pick up a TTL reload of the source file, if any.
        self.state.refresh_from_cache();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: raw filtered data (toggle) ----
        if self.state.show_raw {
            if let Some(dataset) = self.state.dataset.clone() {
                egui::TopBottomPanel::bottom("raw_data")
                    .resizable(true)
                    .default_height(220.0)
                    .show(ctx, |ui| {
                        ui.strong("Raw data");
                        table::raw_table(ui, &dataset, &self.state.visible_rows);
                    });
            }
        }

        // ---- Central panel: analysis views ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_view(ui, &mut self.state);
        });
    }
}
