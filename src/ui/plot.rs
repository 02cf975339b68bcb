use eframe::egui::{self, Align2, Color32, FontId, Sense, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::color;
use crate::data::aggregate::{self, MonthHourGrid, StationMeans, YearSeries, HOURS};
use crate::data::correlate::{self, CORR_COLUMN_COUNT};
use crate::data::model::{Dataset, Pollutant};
use crate::data::view::ViewMode;
use crate::state::{AppState, Tab};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the tab bar and the active analysis view.
pub fn central_view(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data file to start  (File → Open…)");
        });
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
    ui.separator();

    match state.tab {
        Tab::Temporal => temporal_view(ui, state, &dataset),
        Tab::Stations => stations_view(ui, state, &dataset),
        Tab::Correlation => correlation_view(ui, &dataset, &state.visible_rows),
    }
}

// ---------------------------------------------------------------------------
// Temporal tab
// ---------------------------------------------------------------------------

fn temporal_view(ui: &mut Ui, state: &mut AppState, dataset: &Dataset) {
    match state.view_mode {
        ViewMode::Yearly => yearly_view(ui, state, dataset),
        ViewMode::Monthly => {
            let series =
                aggregate::monthly_trend(dataset, &state.visible_rows, state.metric);
            trend_lines(ui, "monthly_trend", &series, "Month", month_formatter);
        }
        ViewMode::Hourly => {
            let series = aggregate::hourly_trend(dataset, &state.visible_rows, state.metric);
            trend_lines(ui, "hourly_trend", &series, "Hour", hour_formatter);
        }
        ViewMode::MonthHour => {
            let grid = aggregate::month_hour_grid(dataset, &state.visible_rows, state.metric);
            month_hour_heatmap(ui, &grid);
        }
        ViewMode::Category => category_view(ui, dataset, &state.visible_rows),
    }
}

fn yearly_view(ui: &mut Ui, state: &mut AppState, dataset: &Dataset) {
    let pollutants: Vec<Pollutant> = state.trend_pollutants.iter().copied().collect();
    let trend = aggregate::yearly_trend(dataset, &state.visible_rows, &pollutants);

    ui.horizontal_top(|ui: &mut Ui| {
        let plot_width = ui.available_width() * 0.72;

        ui.vertical(|ui: &mut Ui| {
            ui.set_width(plot_width);
            if trend.points.is_empty() {
                ui.label("No data for the current filters.");
            } else {
                let palette = color::generate_palette(pollutants.len());
                Plot::new("yearly_trend")
                    .legend(Legend::default())
                    .x_axis_label("Year")
                    .y_axis_label("Concentration")
                    .height(360.0)
                    .show(ui, |plot_ui| {
                        for (i, &p) in pollutants.iter().enumerate() {
                            let points: PlotPoints = trend
                                .points
                                .iter()
                                .filter(|tp| tp.pollutant == p)
                                .map(|tp| [tp.year as f64, tp.value])
                                .collect();
                            plot_ui.line(
                                Line::new(points)
                                    .name(p.label())
                                    .color(palette[i])
                                    .width(1.5),
                            );
                        }
                    });
            }
        });

        // ---- Summary metrics ----
        ui.vertical(|ui: &mut Ui| {
            ui.strong("Mean AQI");
            match trend.mean_aqi {
                Some(aqi) => ui.heading(format!("{aqi:.1}")),
                None => ui.heading("no data"),
            };
            ui.add_space(8.0);

            ui.strong("Dominant pollutant");
            match trend.dominant {
                Some(dom) => {
                    ui.heading(dom.pollutant.label());
                    ui.label(format!("peak yearly mean {:.1} μg/m³", dom.peak_yearly_mean));
                }
                None => {
                    ui.heading("no data");
                }
            }
            ui.add_space(8.0);

            ui.strong("Peak AQI year");
            match trend.peak_year {
                Some(peak) => {
                    ui.heading(peak.year.to_string());
                    ui.label(format!("mean AQI {:.1}", peak.mean_aqi));
                }
                None => {
                    ui.heading("no data");
                }
            }
        });
    });
}

fn trend_lines(
    ui: &mut Ui,
    id: &str,
    series: &[YearSeries],
    x_label: &str,
    formatter: fn(f64) -> String,
) {
    if series.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }
    let palette = color::generate_palette(series.len());
    Plot::new(id.to_string())
        .legend(Legend::default())
        .x_axis_label(x_label.to_string())
        .y_axis_label("Concentration")
        .x_axis_formatter(move |mark, _range| formatter(mark.value))
        .show(ui, |plot_ui| {
            for (i, line) in series.iter().enumerate() {
                let points: PlotPoints = line
                    .points
                    .iter()
                    .map(|&(bucket, mean)| [bucket as f64, mean])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .name(line.year.to_string())
                        .color(palette[i])
                        .width(1.5),
                );
            }
        });
}

fn month_formatter(value: f64) -> String {
    let month = value.round() as i64;
    if value.fract().abs() < 1e-6 && (1..=12).contains(&month) {
        MONTH_NAMES[(month - 1) as usize].to_string()
    } else {
        String::new()
    }
}

fn hour_formatter(value: f64) -> String {
    let hour = value.round() as i64;
    if value.fract().abs() < 1e-6 && (0..24).contains(&hour) {
        format!("{hour:02}")
    } else {
        String::new()
    }
}

fn category_view(ui: &mut Ui, dataset: &Dataset, rows: &[usize]) {
    let dist = aggregate::category_distribution(dataset, rows);
    if dist.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }

    let bars: Vec<Bar> = dist
        .iter()
        .enumerate()
        .map(|(i, &(cat, count))| {
            Bar::new(i as f64, count as f64)
                .width(0.6)
                .name(cat.label())
                .fill(color::category_color(cat))
        })
        .collect();
    let labels: Vec<String> = dist.iter().map(|&(cat, _)| cat.label().to_string()).collect();

    Plot::new("category_distribution")
        .x_axis_label("Category")
        .y_axis_label("Observations")
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as i64;
            if mark.value.fract().abs() < 1e-6 && (0..labels.len() as i64).contains(&i) {
                labels[i as usize].clone()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Month × hour heatmap
// ---------------------------------------------------------------------------

fn month_hour_heatmap(ui: &mut Ui, grid: &MonthHourGrid) {
    let max = grid.max_value();
    let col_labels: Vec<String> = MONTH_NAMES.iter().map(|m| m.to_string()).collect();
    let row_labels: Vec<String> = (0..HOURS).map(|h| format!("{h:02}")).collect();

    heatmap(
        ui,
        &col_labels,
        &row_labels,
        |row, col| Some(grid.rows()[row][col]),
        |v| {
            let t = if max > 0.0 { (v / max) as f32 } else { 0.0 };
            color::sequential(t)
        },
        |v| format!("{v:.0}"),
    );
}

// ---------------------------------------------------------------------------
// Stations tab
// ---------------------------------------------------------------------------

fn stations_view(ui: &mut Ui, state: &mut AppState, dataset: &Dataset) {
    let stats = aggregate::station_comparison(dataset, &state.visible_rows);
    if stats.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }

    station_heatmap(ui, &stats);
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Pollutant for comparison:");
        egui::ComboBox::from_id_salt("station_pollutant")
            .selected_text(state.station_pollutant.label())
            .show_ui(ui, |ui: &mut Ui| {
                for p in Pollutant::ALL {
                    ui.selectable_value(&mut state.station_pollutant, p, p.label());
                }
            });
    });

    let pollutant = state.station_pollutant;
    let bars: Vec<Bar> = stats
        .iter()
        .enumerate()
        .filter_map(|(i, s)| {
            s.means[pollutant.index()]
                .map(|mean| Bar::new(i as f64, mean).width(0.6).name(s.station.clone()))
        })
        .collect();
    let names: Vec<String> = stats.iter().map(|s| s.station.clone()).collect();

    Plot::new("station_bars")
        .y_axis_label("Mean concentration")
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as i64;
            if mark.value.fract().abs() < 1e-6 && (0..names.len() as i64).contains(&i) {
                names[i as usize].clone()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn station_heatmap(ui: &mut Ui, stats: &[StationMeans]) {
    // Pollutant rows × station columns, one shared scale across the matrix.
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in stats {
        for v in s.means.into_iter().flatten() {
            min = min.min(v);
            max = max.max(v);
        }
    }

    let col_labels: Vec<String> = stats.iter().map(|s| s.station.clone()).collect();
    let row_labels: Vec<String> = Pollutant::ALL.iter().map(|p| p.label().to_string()).collect();

    heatmap(
        ui,
        &col_labels,
        &row_labels,
        |row, col| stats[col].means[row],
        move |v| {
            let t = if max > min {
                ((v - min) / (max - min)) as f32
            } else {
                0.5
            };
            color::sequential(t)
        },
        |v| format!("{v:.0}"),
    );
}

// ---------------------------------------------------------------------------
// Correlation tab
// ---------------------------------------------------------------------------

fn correlation_view(ui: &mut Ui, dataset: &Dataset, rows: &[usize]) {
    let matrix = correlate::correlation_matrix(dataset, rows);
    let labels: Vec<String> = correlate::CorrelationMatrix::labels()
        .iter()
        .map(|l| l.to_string())
        .collect();

    ui.label("Pearson correlation between pollutants and weather. Grey cells have no defined value.");
    ui.add_space(4.0);

    heatmap(
        ui,
        &labels,
        &labels,
        |row, col| {
            let v = matrix.get(row, col);
            // NaN means undefined; it gets a neutral cell, never zero.
            (!v.is_nan()).then_some(v)
        },
        |v| color::diverging(v as f32),
        |v| format!("{v:.2}"),
    );
    debug_assert_eq!(labels.len(), CORR_COLUMN_COUNT);
}

// ---------------------------------------------------------------------------
// Shared heatmap widget
// ---------------------------------------------------------------------------

/// Paint a labelled grid of coloured cells. `value` returning None marks an
/// undefined cell, drawn in a neutral grey with an em-dash.
fn heatmap(
    ui: &mut Ui,
    col_labels: &[String],
    row_labels: &[String],
    value: impl Fn(usize, usize) -> Option<f64>,
    cell_color: impl Fn(f64) -> Color32,
    cell_text: impl Fn(f64) -> String,
) {
    let n_cols = col_labels.len();
    let n_rows = row_labels.len();
    if n_cols == 0 || n_rows == 0 {
        return;
    }

    let gutter_left = 56.0;
    let gutter_bottom = 18.0;
    let avail = ui.available_size();
    let cell_w = ((avail.x - gutter_left) / n_cols as f32).clamp(24.0, 120.0);
    let cell_h = ((avail.y - gutter_bottom) / n_rows as f32).clamp(14.0, 48.0);

    let size = egui::vec2(
        gutter_left + cell_w * n_cols as f32,
        cell_h * n_rows as f32 + gutter_bottom,
    );
    let (rect, _response) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let origin = rect.min;
    let font = FontId::proportional(10.0);
    let label_color = ui.visuals().text_color();

    for (r, row_label) in row_labels.iter().enumerate() {
        let y = origin.y + r as f32 * cell_h;
        painter.text(
            egui::pos2(origin.x + gutter_left - 6.0, y + cell_h / 2.0),
            Align2::RIGHT_CENTER,
            row_label,
            font.clone(),
            label_color,
        );

        for c in 0..n_cols {
            let cell = egui::Rect::from_min_size(
                egui::pos2(origin.x + gutter_left + c as f32 * cell_w, y),
                egui::vec2(cell_w - 1.0, cell_h - 1.0),
            );
            match value(r, c) {
                Some(v) => {
                    let fill = cell_color(v);
                    painter.rect_filled(cell, egui::CornerRadius::ZERO, fill);
                    if cell_w >= 30.0 && cell_h >= 13.0 {
                        painter.text(
                            cell.center(),
                            Align2::CENTER_CENTER,
                            cell_text(v),
                            font.clone(),
                            color::text_on(fill),
                        );
                    }
                }
                None => {
                    let fill = color::undefined_cell();
                    painter.rect_filled(cell, egui::CornerRadius::ZERO, fill);
                    painter.text(
                        cell.center(),
                        Align2::CENTER_CENTER,
                        "—",
                        font.clone(),
                        color::text_on(fill),
                    );
                }
            }
        }
    }

    for (c, col_label) in col_labels.iter().enumerate() {
        painter.text(
            egui::pos2(
                origin.x + gutter_left + (c as f32 + 0.5) * cell_w,
                origin.y + n_rows as f32 * cell_h + 2.0,
            ),
            Align2::CENTER_TOP,
            col_label,
            font.clone(),
            label_color,
        );
    }
}
