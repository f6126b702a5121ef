use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::model::Dataset;
use crate::state::{AppState, FilterEvent, Variant, View};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
///
/// Widgets only record [`FilterEvent`]s; they are applied to the session
/// once the panel is drawn.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut events = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Window shape ----
            ui.strong("Time window");
            ui.horizontal(|ui: &mut Ui| {
                for (variant, label) in [
                    (Variant::Months, "Months of year"),
                    (Variant::Dates, "Date range"),
                ] {
                    let active = state.variant == variant;
                    if ui.selectable_label(active, label).clicked() && !active {
                        events.push(FilterEvent::SetVariant(variant));
                    }
                }
            });

            match state.variant {
                Variant::Months => month_controls(ui, state, &dataset, &mut events),
                Variant::Dates => date_controls(ui, state, &dataset, &mut events),
            }
            ui.separator();

            county_list(ui, state, &dataset, &mut events);
        });

    for event in events {
        state.handle(event);
    }
}

fn month_controls(ui: &mut Ui, state: &AppState, dataset: &Dataset, events: &mut Vec<FilterEvent>) {
    let (mut lo, mut hi) = state.months;
    let lo_changed = ui
        .add(egui::Slider::new(&mut lo, 1..=12).text("from month"))
        .changed();
    let hi_changed = ui
        .add(egui::Slider::new(&mut hi, 1..=12).text("to month"))
        .changed();
    if lo_changed || hi_changed {
        events.push(FilterEvent::SetMonths(lo, hi));
    }

    let mut year = state.year;
    egui::ComboBox::from_label("Year")
        .selected_text(year.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for &y in &dataset.years {
                ui.selectable_value(&mut year, y, y.to_string());
            }
        });
    if year != state.year {
        events.push(FilterEvent::SetYear(year));
    }
}

fn date_controls(ui: &mut Ui, state: &AppState, dataset: &Dataset, events: &mut Vec<FilterEvent>) {
    let (mut start, mut end) = state.dates;
    egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("From");
        ui.add(DatePickerButton::new(&mut start).id_salt("start_date"));
        ui.end_row();
        ui.label("To");
        ui.add(DatePickerButton::new(&mut end).id_salt("end_date"));
        ui.end_row();
    });
    if let Some(span) = dataset.date_span {
        if ui.small_button("Full span").clicked() {
            (start, end) = span;
        }
    }
    if (start, end) != state.dates {
        events.push(FilterEvent::SetDates(start, end));
    }
}

fn county_list(ui: &mut Ui, state: &AppState, dataset: &Dataset, events: &mut Vec<FilterEvent>) {
    let header_text = format!(
        "Counties  ({}/{})",
        state.counties.len(),
        dataset.counties.len()
    );

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("counties")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    events.push(FilterEvent::SelectAllCounties);
                }
                if ui.small_button("None").clicked() {
                    events.push(FilterEvent::ClearCounties);
                }
            });

            for county in &dataset.counties {
                let mut text = RichText::new(county);
                if let Some(cm) = &state.color_map {
                    text = text.color(cm.color_for(county));
                }
                let mut checked = state.counties.contains(county);
                if ui.checkbox(&mut checked, text).changed() {
                    events.push(FilterEvent::ToggleCounty(county.clone()));
                }
            }
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
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        ui.separator();

        for (view, label) in [
            (View::Plot, "Plot"),
            (View::Table, "Table"),
            (View::Summary, "Summary"),
        ] {
            ui.selectable_value(&mut state.view, view, label);
        }

        ui.separator();

        if ui.selectable_label(state.log_scale, "Log scale").clicked() {
            state.log_scale = !state.log_scale;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open case counts")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        crate::app::load_into(state, &path);
    }
}
