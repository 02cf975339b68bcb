use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{Metric, Pollutant};
use crate::data::view::ViewMode;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the domains so we can mutate state inside the loops.
    let years: Vec<i32> = dataset.years().iter().copied().collect();
    let stations: Vec<String> = dataset.stations().iter().cloned().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year multi-select ----
            let header = format!("Years  ({}/{})", state.selection.years.len(), years.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("years")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_years();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_years();
                        }
                    });
                    for &year in &years {
                        let mut checked = state.selection.years.contains(&year);
                        if ui.checkbox(&mut checked, year.to_string()).changed() {
                            state.toggle_year(year);
                        }
                    }
                });

            // ---- Station multi-select ----
            let header = format!(
                "Stations  ({}/{})",
                state.selection.stations.len(),
                stations.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("stations")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_stations();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_stations();
                        }
                    });
                    for station in &stations {
                        let mut checked = state.selection.stations.contains(station);
                        if ui.checkbox(&mut checked, station).changed() {
                            state.toggle_station(station);
                        }
                    }
                });

            ui.separator();

            // ---- View mode ----
            ui.strong("View");
            for mode in ViewMode::ALL {
                ui.radio_value(&mut state.view_mode, mode, mode.label());
            }

            // The metric selector only exists for views that take one.
            if state.view_mode.requires_metric() {
                ui.add_space(4.0);
                ui.strong("Metric");
                egui::ComboBox::from_id_salt("metric")
                    .selected_text(state.metric.label())
                    .show_ui(ui, |ui: &mut Ui| {
                        for metric in Metric::ALL {
                            ui.selectable_value(&mut state.metric, metric, metric.label());
                        }
                    });
            }

            if state.view_mode == ViewMode::Yearly {
                ui.add_space(4.0);
                ui.strong("Trend pollutants");
                for p in Pollutant::ALL {
                    let mut checked = state.trend_pollutants.contains(&p);
                    if ui.checkbox(&mut checked, p.label()).changed() {
                        state.toggle_trend_pollutant(p);
                    }
                }
            }

            ui.separator();
            ui.checkbox(&mut state.show_raw, "Show raw data");
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.cache.invalidate();
                if let Some(path) = state.source_path.clone() {
                    state.open_path(&path);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} observations loaded, {} match filters",
                ds.len(),
                state.visible_rows.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open air-quality data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
