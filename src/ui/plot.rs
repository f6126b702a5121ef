use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use eframe::egui::Ui;
use egui_plot::{Legend, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Case-count scatter plot (central panel)
// ---------------------------------------------------------------------------

/// Render one scatter series per visible county.
pub fn cases_plot(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view case counts  (File → Open…)");
            });
            return;
        }
    };

    if state.visible_indices.is_empty() {
        ui.label("No records match the current selection.");
    }

    // Group visible records per county, keeping filter order within each.
    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for &idx in &state.visible_indices {
        let rec = &dataset.records[idx];
        series
            .entry(rec.county.as_str())
            .or_default()
            .push([day_x(rec.date), case_y(rec.cases, state.log_scale)]);
    }

    let y_label = if state.log_scale {
        "log10(cases + 1)"
    } else {
        "Cases"
    };

    Plot::new("cases_plot")
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label(y_label)
        .x_axis_formatter(|mark, _range| day_label(mark.value))
        .label_formatter(|name, value| {
            format!("{name}\n{}\n{:.2}", day_label(value.x), value.y)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (county, points) in series {
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(county))
                    .unwrap_or(eframe::egui::Color32::LIGHT_BLUE);

                let points = Points::new(PlotPoints::from(points))
                    .name(county)
                    .color(color)
                    .radius(2.5);

                plot_ui.points(points);
            }
        });
}

/// Plot x coordinate of a date: days since 0001-01-01.
fn day_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn case_y(cases: u64, log_scale: bool) -> f64 {
    if log_scale {
        (cases as f64 + 1.0).log10()
    } else {
        cases as f64
    }
}

/// Axis/tooltip text for an x coordinate produced by [`day_x`].
fn day_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_axis_roundtrip() {
        let d = NaiveDate::from_ymd_opt(2021, 3, 5).unwrap();
        assert_eq!(day_label(day_x(d)), "2021-03-05");
        assert_eq!(day_label(day_x(d) + 0.4), "2021-03-05");
        assert_eq!(day_label(f64::MAX), "");
    }

    #[test]
    fn log_scale_values() {
        assert_eq!(case_y(0, true), 0.0);
        assert_eq!(case_y(99, true), 2.0);
        assert_eq!(case_y(99, false), 99.0);
    }
}
