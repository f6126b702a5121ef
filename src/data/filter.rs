use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter criteria: the user's current selection
// ---------------------------------------------------------------------------

/// Time window of a [`FilterCriteria`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Months `lo..=hi` of a single year.
    Months { months: (u32, u32), year: i32 },
    /// Calendar dates `start..=end`.
    Dates { dates: (NaiveDate, NaiveDate) },
}

/// Snapshot of the selection a session filters with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Selected county labels. Empty selects nothing.
    pub counties: BTreeSet<String>,
    pub window: Window,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("invalid {field} range: {lower} is after {upper}")]
    InvalidRange {
        field: &'static str,
        lower: String,
        upper: String,
    },
}

/// Reject windows whose lower bound exceeds the upper bound.
pub fn validate(criteria: &FilterCriteria) -> Result<(), FilterError> {
    match criteria.window {
        Window::Months {
            months: (lo, hi), ..
        } if lo > hi => Err(FilterError::InvalidRange {
            field: "month",
            lower: lo.to_string(),
            upper: hi.to_string(),
        }),
        Window::Dates {
            dates: (start, end),
        } if start > end => Err(FilterError::InvalidRange {
            field: "date",
            lower: start.to_string(),
            upper: end.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Whether a single record passes `criteria`. Both bounds are inclusive.
///
/// Assumes `criteria` has been through [`validate`]; an inverted window
/// simply matches nothing here.
pub fn matches(record: &Record, criteria: &FilterCriteria) -> bool {
    if !criteria.counties.contains(&record.county) {
        return false;
    }
    match criteria.window {
        Window::Months {
            months: (lo, hi),
            year,
        } => record.year == year && (lo..=hi).contains(&record.month),
        Window::Dates {
            dates: (start, end),
        } => (start..=end).contains(&record.date),
    }
}

/// Return indices of records that pass `criteria`, in dataset order.
///
/// An empty county selection or an unknown county label is not an error,
/// it just yields an empty result.
pub fn filtered_indices(
    dataset: &Dataset,
    criteria: &FilterCriteria,
) -> Result<Vec<usize>, FilterError> {
    validate(criteria)?;
    if criteria.counties.is_empty() {
        return Ok(Vec::new());
    }
    Ok(dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| matches(rec, criteria))
        .map(|(i, _)| i)
        .collect())
}

/// Same as [`filtered_indices`] but borrowing the matching records.
pub fn filter_records<'a>(
    dataset: &'a Dataset,
    criteria: &FilterCriteria,
) -> Result<Vec<&'a Record>, FilterError> {
    Ok(filtered_indices(dataset, criteria)?
        .into_iter()
        .map(|i| &dataset.records[i])
        .collect())
}
