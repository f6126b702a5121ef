use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Float64Type, Int32Type, Int64Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Dataset, Record};

/// Header names accepted for the county column (case-insensitive).
/// `Admin2` is what the Johns Hopkins time-series files call it.
const COUNTY_HEADERS: [&str; 2] = ["county", "admin2"];

/// Date spellings accepted in cells and wide-format headers.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a case-count dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – long (`county,date,cases`) or wide (one column per date)
/// * `.json`    – `[{ "county": ..., "date": ..., "cases": ... }, ...]`
/// * `.parquet` – columns `county`, `date`, `cases`
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            read_json(&text)
        }
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            read_csv(file)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} records for {} counties from {}",
        dataset.len(),
        dataset.counties.len(),
        path.display()
    );
    Ok(dataset)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_cases(s: &str, row: usize, col: &str) -> Result<u64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }
    let f = s
        .parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{s}' is not a number"))?;
    cases_from_f64(f).with_context(|| format!("Row {row}, {col}: '{s}' is not a case count"))
}

/// Accept floats only when they hold a non-negative whole number.
fn cases_from_f64(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read CSV in either layout.
///
/// Long layout has `county`, `date` and `cases` columns.  Without a `date`
/// column the file is taken to be wide: every header that parses as a date
/// is one day of counts, and each non-empty cell is pivoted into a record.
pub fn read_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let county_idx = headers
        .iter()
        .position(|h| COUNTY_HEADERS.iter().any(|c| h.eq_ignore_ascii_case(c)))
        .context("CSV missing 'county' column")?;
    let date_idx = headers.iter().position(|h| h.eq_ignore_ascii_case("date"));

    let records = match date_idx {
        Some(date_idx) => {
            let cases_idx = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case("cases"))
                .context("CSV missing 'cases' column")?;
            read_long_rows(&mut reader, county_idx, date_idx, cases_idx)?
        }
        None => {
            let date_cols: Vec<(usize, NaiveDate)> = headers
                .iter()
                .enumerate()
                .filter_map(|(i, h)| parse_date(h).map(|d| (i, d)))
                .collect();
            if date_cols.is_empty() {
                bail!("CSV has neither a 'date' column nor date-named columns");
            }
            read_wide_rows(&mut reader, &headers, county_idx, &date_cols)?
        }
    };

    Ok(Dataset::from_records(records))
}

fn read_long_rows<R: Read>(
    reader: &mut csv::Reader<R>,
    county_idx: usize,
    date_idx: usize,
    cases_idx: usize,
) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let county = row.get(county_idx).unwrap_or("").trim();
        if county.is_empty() {
            log::debug!("CSV row {row_no}: no county, skipped");
            continue;
        }
        let raw_date = row.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date)
            .with_context(|| format!("Row {row_no}, date: '{raw_date}' is not a date"))?;
        let cases = parse_cases(row.get(cases_idx).unwrap_or(""), row_no, "cases")?;

        records.push(Record::new(county, date, cases));
    }

    Ok(records)
}

fn read_wide_rows<R: Read>(
    reader: &mut csv::Reader<R>,
    headers: &[String],
    county_idx: usize,
    date_cols: &[(usize, NaiveDate)],
) -> Result<Vec<Record>> {
    let mut records = Vec::with_capacity(date_cols.len());

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let county = row.get(county_idx).unwrap_or("").trim();
        if county.is_empty() {
            log::debug!("CSV row {row_no}: no county, skipped");
            continue;
        }

        for &(col_idx, date) in date_cols {
            let cell = row.get(col_idx).unwrap_or("").trim();
            if cell.is_empty() {
                continue;
            }
            let cases = parse_cases(cell, row_no, &headers[col_idx])?;
            records.push(Record::new(county, date, cases));
        }
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JsonRow {
    county: String,
    date: String,
    cases: u64,
}

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "county": "Dakota", "date": "2021-03-05", "cases": 10 },
///   ...
/// ]
/// ```
pub fn read_json(text: &str) -> Result<Dataset> {
    let rows: Vec<JsonRow> = serde_json::from_str(text).context("parsing JSON")?;

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let date = parse_date(&row.date)
                .with_context(|| format!("Row {i}, date: '{}' is not a date", row.date))?;
            Ok(Record::new(row.county, date, row.cases))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of case counts.
///
/// Expected schema:
/// - `county`: Utf8 or LargeUtf8
/// - `date`: Date32, or a string in one of the accepted date spellings
/// - `cases`: Int32, Int64, UInt32, UInt64 or whole-valued Float64
///
/// Rows with a null county or null case count are skipped.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut row_base = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let county_col = column(&batch, "county")?;
        let date_col = column(&batch, "date")?;
        let cases_col = column(&batch, "cases")?;

        for row in 0..batch.num_rows() {
            let row_no = row_base + row;
            let Some(county) = string_at(county_col, row)
                .with_context(|| format!("Row {row_no}: failed to read 'county'"))?
            else {
                continue;
            };
            if cases_col.is_null(row) {
                log::debug!("Parquet row {row_no}: null cases, skipped");
                continue;
            }
            let date = date_at(date_col, row)
                .with_context(|| format!("Row {row_no}: failed to read 'date'"))?;
            let cases = cases_at(cases_col, row)
                .with_context(|| format!("Row {row_no}: failed to read 'cases'"))?;

            records.push(Record::new(county, date, cases));
        }
        row_base += batch.num_rows();
    }

    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn string_at(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .context("expected StringArray")?
            .value(row),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .context("expected LargeStringArray")?
            .value(row),
        other => bail!("Expected string column, got {other:?}"),
    };
    Ok(Some(value.to_string()))
}

fn date_at(col: &ArrayRef, row: usize) -> Result<NaiveDate> {
    if col.is_null(row) {
        bail!("null date");
    }
    match col.data_type() {
        DataType::Date32 => col
            .as_primitive_opt::<Date32Type>()
            .context("expected Date32Array")?
            .value_as_date(row)
            .context("date out of range"),
        DataType::Utf8 | DataType::LargeUtf8 => {
            let raw = string_at(col, row)?.unwrap_or_default();
            parse_date(&raw).with_context(|| format!("'{raw}' is not a date"))
        }
        other => bail!("Expected Date32 or string column, got {other:?}"),
    }
}

fn cases_at(col: &ArrayRef, row: usize) -> Result<u64> {
    let signed = |v: i64| u64::try_from(v).with_context(|| format!("negative case count {v}"));
    match col.data_type() {
        DataType::Int32 => signed(
            col.as_primitive_opt::<Int32Type>()
                .context("expected Int32Array")?
                .value(row)
                .into(),
        ),
        DataType::Int64 => signed(
            col.as_primitive_opt::<Int64Type>()
                .context("expected Int64Array")?
                .value(row),
        ),
        DataType::UInt32 => Ok(col
            .as_primitive_opt::<UInt32Type>()
            .context("expected UInt32Array")?
            .value(row)
            .into()),
        DataType::UInt64 => Ok(col
            .as_primitive_opt::<UInt64Type>()
            .context("expected UInt64Array")?
            .value(row)),
        DataType::Float64 => {
            let f = col
                .as_primitive_opt::<Float64Type>()
                .context("expected Float64Array")?
                .value(row);
            cases_from_f64(f).with_context(|| format!("{f} is not a case count"))
        }
        other => bail!("Expected integer column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Date32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_spellings() {
        assert_eq!(parse_date("2021-03-05"), Some(date(2021, 3, 5)));
        assert_eq!(parse_date("1/22/20"), Some(date(2020, 1, 22)));
        assert_eq!(parse_date("3/5/2021"), Some(date(2021, 3, 5)));
        assert_eq!(parse_date(" 2021-03-05 "), Some(date(2021, 3, 5)));
        assert_eq!(parse_date("Province_State"), None);
    }

    #[test]
    fn long_csv() {
        let csv = "date,county,state,cases\n\
                   2021-03-05,Dakota,Minnesota,10\n\
                   2021-03-05,Aitkin,Minnesota,2\n\
                   2021-03-06,,Minnesota,4\n\
                   2021-03-06,Dakota,Minnesota,12.0\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            ds.records,
            vec![
                Record::new("Dakota", date(2021, 3, 5), 10),
                Record::new("Aitkin", date(2021, 3, 5), 2),
                Record::new("Dakota", date(2021, 3, 6), 12),
            ]
        );
    }

    #[test]
    fn wide_csv_is_pivoted() {
        let csv = "UID,Admin2,Province_State,1/22/20,1/23/20\n\
                   1,Aitkin,Minnesota,0,1\n\
                   2,Dakota,Minnesota,3,\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            ds.records,
            vec![
                Record::new("Aitkin", date(2020, 1, 22), 0),
                Record::new("Aitkin", date(2020, 1, 23), 1),
                Record::new("Dakota", date(2020, 1, 22), 3),
            ]
        );
        assert_eq!(ds.date_span, Some((date(2020, 1, 22), date(2020, 1, 23))));
    }

    #[test]
    fn csv_errors() {
        let err = read_csv("name,date,cases\nDakota,2021-03-05,1\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("county"));

        let err = read_csv("county,notes\nDakota,x\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("date-named"));

        let err = read_csv("county,date,cases\nDakota,2021-03-05,-3\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("'-3' is not a case count"));

        let err = read_csv("county,date,cases\nDakota,yesterday,3\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("'yesterday' is not a date"));
    }

    #[test]
    fn json_records() {
        let json = r#"[
            {"county": "Ramsey", "date": "2020-01-10", "cases": 3},
            {"county": "Ramsey", "date": "6/10/2020", "cases": 7}
        ]"#;
        let ds = read_json(json).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].date, date(2020, 6, 10));
        assert_eq!(ds.records[1].month, 6);

        assert!(read_json(r#"{"county": "Ramsey"}"#).is_err());
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("cases.xlsx")).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension: .xlsx"));
    }

    #[test]
    fn parquet_roundtrip() {
        let epoch = date(1970, 1, 1);
        let days: Vec<i32> = [date(2020, 1, 10), date(2020, 6, 10), date(2020, 6, 11)]
            .iter()
            .map(|d| (*d - epoch).num_days() as i32)
            .collect();

        let schema = Arc::new(Schema::new(vec![
            Field::new("county", DataType::Utf8, true),
            Field::new("date", DataType::Date32, false),
            Field::new("cases", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Ramsey"), None, Some("Ramsey")])),
                Arc::new(Date32Array::from(days)),
                Arc::new(Int64Array::from(vec![Some(3), Some(5), Some(7)])),
            ],
        )
        .unwrap();

        let path = std::env::temp_dir().join(format!(
            "county-cases-loader-{}.parquet",
            std::process::id()
        ));
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            ds.records,
            vec![
                Record::new("Ramsey", date(2020, 1, 10), 3),
                Record::new("Ramsey", date(2020, 6, 11), 7),
            ]
        );
    }
}
