use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::loader::REQUIRED_COLUMNS;
use crate::data::model::{Dataset, Pollutant, Record};

/// Render the filtered records verbatim in a virtualized table.
pub fn raw_table(ui: &mut Ui, dataset: &Dataset, rows: &[usize]) {
    if rows.is_empty() {
        ui.label("No rows match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(52.0), REQUIRED_COLUMNS.len())
        .header(20.0, |mut header| {
            for name in REQUIRED_COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let rec = &dataset.records()[rows[row.index()]];
                for cell in row_cells(rec) {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}

fn row_cells(rec: &Record) -> Vec<String> {
    let mut cells = vec![
        rec.year.to_string(),
        rec.month.to_string(),
        rec.hour.to_string(),
        rec.station.clone(),
    ];
    cells.extend(Pollutant::ALL.iter().map(|&p| fmt_opt(rec.pollutant(p))));
    cells.push(fmt_opt(rec.aqi));
    cells.push(
        rec.category
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| "NA".to_string()),
    );
    cells.push(fmt_opt(rec.temp));
    cells.push(fmt_opt(rec.pres));
    cells.push(fmt_opt(rec.wspm));
    cells.push(fmt_opt(rec.rain));
    cells
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.1}")).unwrap_or_else(|| "NA".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::blank_record;

    #[test]
    fn one_cell_per_required_column() {
        let rec = blank_record(2013, 5, 10, "Dingling");
        assert_eq!(row_cells(&rec).len(), REQUIRED_COLUMNS.len());
    }

    #[test]
    fn missing_values_render_as_na() {
        let mut rec = blank_record(2013, 5, 10, "Dingling");
        rec.pm25 = Some(42.0);
        let cells = row_cells(&rec);
        assert_eq!(cells[4], "42.0"); // PM2.5
        assert_eq!(cells[5], "NA"); // PM10
        assert_eq!(cells[11], "NA"); // Category_AQI
    }
}
