use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Record – one row of the case-count table
// ---------------------------------------------------------------------------

/// Case count for one county on one date.
///
/// `month` and `year` are derived from `date` in [`Record::new`] and are
/// never set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub county: String,
    pub date: NaiveDate,
    pub cases: u64,
    /// Calendar month, 1..=12.
    pub month: u32,
    pub year: i32,
}

impl Record {
    pub fn new(county: impl Into<String>, date: NaiveDate, cases: u64) -> Self {
        Record {
            county: county.into(),
            date,
            cases,
            month: date.month(),
            year: date.year(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.county, self.date, self.cases)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed selector domains.
///
/// Built once by the loader and then shared read-only (`Arc<Dataset>`)
/// between every session.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records in load order.
    pub records: Vec<Record>,
    /// Sorted set of county labels.
    pub counties: BTreeSet<String>,
    /// Sorted set of years present.
    pub years: BTreeSet<i32>,
    /// Earliest and latest date, `None` when empty.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

impl Dataset {
    /// Build selector domains from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut counties = BTreeSet::new();
        let mut years = BTreeSet::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            if !counties.contains(&rec.county) {
                counties.insert(rec.county.clone());
            }
            years.insert(rec.year);
            date_span = Some(match date_span {
                None => (rec.date, rec.date),
                Some((lo, hi)) => (lo.min(rec.date), hi.max(rec.date)),
            });
        }

        Dataset {
            records,
            counties,
            years,
            date_span,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent year in the data.
    pub fn latest_year(&self) -> Option<i32> {
        self.years.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn record_derives_month_and_year() {
        let rec = Record::new("Dakota", date(2021, 3, 5), 10);
        assert_eq!(rec.month, 3);
        assert_eq!(rec.year, 2021);
    }

    #[test]
    fn dataset_indices() {
        let ds = Dataset::from_records(vec![
            Record::new("Ramsey", date(2020, 6, 10), 4),
            Record::new("Aitkin", date(2021, 1, 2), 1),
            Record::new("Ramsey", date(2020, 1, 10), 2),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.counties.iter().map(String::as_str).collect::<Vec<_>>(),
            ["Aitkin", "Ramsey"]
        );
        assert_eq!(ds.years.iter().copied().collect::<Vec<_>>(), [2020, 2021]);
        assert_eq!(ds.date_span, Some((date(2020, 1, 10), date(2021, 1, 2))));
        assert_eq!(ds.latest_year(), Some(2021));
        // load order is kept
        assert_eq!(ds.records[0].date, date(2020, 6, 10));
    }

    #[test]
    fn empty_dataset() {
        let ds = Dataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.date_span, None);
        assert_eq!(ds.latest_year(), None);
    }
}
