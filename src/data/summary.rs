use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::Dataset;

/// Per-county aggregate over a filtered subset, shown in the summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountySummary {
    pub county: String,
    pub rows: usize,
    pub total_cases: u64,
    pub peak_cases: u64,
    /// First date on which `peak_cases` was reported.
    pub peak_date: NaiveDate,
}

/// Aggregate the records at `indices` by county, sorted by county label.
pub fn county_totals(dataset: &Dataset, indices: &[usize]) -> Vec<CountySummary> {
    let mut by_county: BTreeMap<&str, CountySummary> = BTreeMap::new();

    for rec in indices.iter().map(|&i| &dataset.records[i]) {
        let entry = by_county
            .entry(rec.county.as_str())
            .or_insert_with(|| CountySummary {
                county: rec.county.clone(),
                rows: 0,
                total_cases: 0,
                peak_cases: rec.cases,
                peak_date: rec.date,
            });
        entry.rows += 1;
        entry.total_cases = entry.total_cases.saturating_add(rec.cases);
        if rec.cases > entry.peak_cases
            || (rec.cases == entry.peak_cases && rec.date < entry.peak_date)
        {
            entry.peak_cases = rec.cases;
            entry.peak_date = rec.date;
        }
    }

    by_county.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn totals_per_county() {
        let ds = Dataset::from_records(vec![
            Record::new("Ramsey", date(2020, 6, 10), 7),
            Record::new("Dakota", date(2020, 6, 10), 2),
            Record::new("Ramsey", date(2020, 1, 10), 7),
            Record::new("Ramsey", date(2020, 2, 10), 1),
        ]);
        let out = county_totals(&ds, &[0, 1, 2, 3]);
        assert_eq!(
            out,
            vec![
                CountySummary {
                    county: "Dakota".into(),
                    rows: 1,
                    total_cases: 2,
                    peak_cases: 2,
                    peak_date: date(2020, 6, 10),
                },
                CountySummary {
                    county: "Ramsey".into(),
                    rows: 3,
                    total_cases: 15,
                    peak_cases: 7,
                    peak_date: date(2020, 1, 10),
                },
            ]
        );
    }

    #[test]
    fn only_selected_indices_count() {
        let ds = Dataset::from_records(vec![
            Record::new("Ramsey", date(2020, 6, 10), 7),
            Record::new("Dakota", date(2020, 6, 10), 2),
        ]);
        let out = county_totals(&ds, &[1]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].county, "Dakota");
        assert!(county_totals(&ds, &[]).is_empty());
    }
}
