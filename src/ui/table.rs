use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::summary::county_totals;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Visible records in filter order.
pub fn records_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    if state.visible_indices.is_empty() {
        ui.label("No records match the current selection.");
    }

    ui.push_id("records_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(140.0))
            .column(Column::auto().at_least(100.0))
            .column(Column::remainder())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                header.col(|ui| {
                    ui.strong("County");
                });
                header.col(|ui| {
                    ui.strong("Date");
                });
                header.col(|ui| {
                    ui.strong("Cases");
                });
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, state.visible_indices.len(), |mut row| {
                    let rec = &dataset.records[state.visible_indices[row.index()]];
                    row.col(|ui| {
                        ui.label(rec.county.as_str());
                    });
                    row.col(|ui| {
                        ui.label(rec.date.to_string());
                    });
                    row.col(|ui| {
                        ui.label(rec.cases.to_string());
                    });
                });
            });
    });
}

/// Per-county totals over the visible records.
pub fn summary_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    let totals = county_totals(dataset, &state.visible_indices);
    if totals.is_empty() {
        ui.label("No records match the current selection.");
    }

    ui.push_id("summary_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(140.0))
            .columns(Column::auto().at_least(80.0), 3)
            .column(Column::remainder())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for title in ["County", "Rows", "Total cases", "Peak cases", "Peak date"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, totals.len(), |mut row| {
                    let s = &totals[row.index()];
                    let color = state.color_map.as_ref().map(|cm| cm.color_for(&s.county));
                    row.col(|ui| {
                        let mut text = RichText::new(s.county.as_str());
                        if let Some(c) = color {
                            text = text.color(c);
                        }
                        ui.label(text);
                    });
                    row.col(|ui| {
                        ui.label(s.rows.to_string());
                    });
                    row.col(|ui| {
                        ui.label(s.total_cases.to_string());
                    });
                    row.col(|ui| {
                        ui.label(s.peak_cases.to_string());
                    });
                    row.col(|ui| {
                        ui.label(s.peak_date.to_string());
                    });
                });
            });
    });
}
