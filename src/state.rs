use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::filter::{filtered_indices, FilterCriteria, Window};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Selection shapes and view modes
// ---------------------------------------------------------------------------

/// Which time window the side panel exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    /// Month range within a single year.
    Months,
    /// Start and end date.
    Dates,
}

/// What the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Plot,
    Table,
    Summary,
}

/// A single user input change.  Every widget in the side panel maps to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    ToggleCounty(String),
    SelectAllCounties,
    ClearCounties,
    SetMonths(u32, u32),
    SetYear(i32),
    SetDates(NaiveDate, NaiveDate),
    SetVariant(Variant),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One viewer's session, independent of rendering.
///
/// Sessions share the loaded dataset through the `Arc`; everything else is
/// owned per session.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<Dataset>>,

    pub variant: Variant,
    pub counties: BTreeSet<String>,
    pub months: (u32, u32),
    pub year: i32,
    pub dates: (NaiveDate, NaiveDate),

    /// Indices of records passing the current criteria, in dataset order.
    pub visible_indices: Vec<usize>,

    pub view: View,
    /// Plot `log10(cases + 1)` instead of raw counts.
    pub log_scale: bool,

    /// County colours for the plot and the side panel swatches.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Variant::Months)
    }
}

impl AppState {
    pub fn new(variant: Variant) -> Self {
        Self {
            dataset: None,
            variant,
            counties: BTreeSet::new(),
            months: (1, 12),
            year: 2020,
            dates: (NaiveDate::MIN, NaiveDate::MAX),
            visible_indices: Vec::new(),
            view: View::default(),
            log_scale: false,
            color_map: None,
            status_message: None,
        }
    }

    /// Attach a dataset and reset the selection to show all of it
    /// (every county, months 1..=12 of the latest year, the full date span).
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.counties = dataset.counties.clone();
        self.months = (1, 12);
        if let Some(year) = dataset.latest_year() {
            self.year = year;
        }
        if let Some(span) = dataset.date_span {
            self.dates = span;
        }
        self.color_map = Some(ColorMap::new(&dataset.counties));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Snapshot of the current selection for the active variant.
    pub fn criteria(&self) -> FilterCriteria {
        let window = match self.variant {
            Variant::Months => Window::Months {
                months: self.months,
                year: self.year,
            },
            Variant::Dates => Window::Dates { dates: self.dates },
        };
        FilterCriteria {
            counties: self.counties.clone(),
            window,
        }
    }

    /// Apply one input change and recompute the visible records.
    pub fn handle(&mut self, event: FilterEvent) {
        log::debug!("filter event: {event:?}");
        match event {
            FilterEvent::ToggleCounty(county) => {
                if !self.counties.remove(&county) {
                    self.counties.insert(county);
                }
            }
            FilterEvent::SelectAllCounties => {
                if let Some(ds) = &self.dataset {
                    self.counties = ds.counties.clone();
                }
            }
            FilterEvent::ClearCounties => self.counties.clear(),
            FilterEvent::SetMonths(lo, hi) => self.months = (lo, hi),
            FilterEvent::SetYear(year) => self.year = year,
            FilterEvent::SetDates(start, end) => self.dates = (start, end),
            FilterEvent::SetVariant(variant) => self.variant = variant,
        }
        self.refilter();
    }

    /// Recompute `visible_indices` from the current criteria.
    ///
    /// An inverted range clears the result and leaves the reason in
    /// `status_message` until the next valid selection.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        match filtered_indices(ds, &self.criteria()) {
            Ok(indices) => {
                log::debug!("{} of {} records visible", indices.len(), ds.len());
                self.visible_indices = indices;
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("rejected selection: {e}");
                self.visible_indices.clear();
                self.status_message = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::data::model::Record;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> Arc<Dataset> {
        Arc::new(Dataset::from_records(vec![
            Record::new("Dakota", date(2020, 3, 5), 10),
            Record::new("Aitkin", date(2021, 3, 5), 2),
            Record::new("Dakota", date(2021, 7, 1), 4),
        ]))
    }

    fn session(variant: Variant) -> AppState {
        let mut state = AppState::new(variant);
        state.set_dataset(dataset());
        state
    }

    #[test]
    fn defaults_after_load() {
        let state = session(Variant::Months);
        assert_eq!(state.year, 2021);
        assert_eq!(state.months, (1, 12));
        assert_eq!(state.dates, (date(2020, 3, 5), date(2021, 7, 1)));
        assert_eq!(state.counties.len(), 2);
        assert_eq!(state.visible_indices, vec![1, 2]);

        let state = session(Variant::Dates);
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn events_refilter() {
        let mut state = session(Variant::Months);
        state.handle(FilterEvent::ToggleCounty("Aitkin".into()));
        assert_eq!(state.visible_indices, vec![2]);

        state.handle(FilterEvent::SetMonths(1, 6));
        assert!(state.visible_indices.is_empty());

        state.handle(FilterEvent::SetYear(2020));
        assert_eq!(state.visible_indices, vec![0]);

        state.handle(FilterEvent::ClearCounties);
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.status_message, None);

        state.handle(FilterEvent::SelectAllCounties);
        assert_eq!(state.visible_indices, vec![0]);

        state.handle(FilterEvent::SetVariant(Variant::Dates));
        state.handle(FilterEvent::SetDates(date(2021, 3, 5), date(2021, 3, 5)));
        assert_eq!(state.visible_indices, vec![1]);
    }

    #[test]
    fn inverted_range_reports_and_recovers() {
        let mut state = session(Variant::Months);
        state.handle(FilterEvent::SetMonths(9, 2));
        assert!(state.visible_indices.is_empty());
        assert_eq!(
            state.status_message.as_deref(),
            Some("invalid month range: 9 is after 2")
        );

        state.handle(FilterEvent::SetMonths(2, 9));
        assert_eq!(state.visible_indices, vec![1, 2]);
        assert_eq!(state.status_message, None);
    }

    #[test]
    fn events_without_dataset_are_harmless() {
        let mut state = AppState::default();
        state.handle(FilterEvent::SelectAllCounties);
        state.handle(FilterEvent::SetMonths(3, 4));
        assert!(state.visible_indices.is_empty());
        assert!(state.counties.is_empty());
    }

    #[test]
    fn sessions_share_dataset_not_selection() {
        let shared = dataset();
        let handles: Vec<_> = ["Dakota", "Aitkin"]
            .into_iter()
            .map(|county| {
                let ds = Arc::clone(&shared);
                thread::spawn(move || {
                    let mut state = AppState::new(Variant::Dates);
                    state.set_dataset(ds);
                    state.handle(FilterEvent::ClearCounties);
                    state.handle(FilterEvent::ToggleCounty(county.to_string()));
                    state.visible_indices
                })
            })
            .collect();
        let results: Vec<Vec<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![vec![0, 2], vec![1]]);
        assert_eq!(shared.len(), 3);
    }
}
