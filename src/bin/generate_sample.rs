use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Two-wave epidemic curve: sum of Gaussian bumps over the day index.
fn expected_cases(day: f64, waves: &[(f64, f64, f64)]) -> f64 {
    waves
        .iter()
        .map(|&(peak_day, width, height)| {
            height * (-(day - peak_day).powi(2) / (2.0 * width.powi(2))).exp()
        })
        .sum()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Serialize)]
struct Row<'a> {
    county: &'a str,
    date: NaiveDate,
    cases: u64,
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let start = NaiveDate::from_ymd_opt(2020, 3, 1).context("start date")?;
    let n_days = 671; // through 2021-12-31

    // (county, population scale)
    let counties = [
        ("Aitkin", 0.15),
        ("Dakota", 4.3),
        ("Hennepin", 12.8),
        ("Ramsey", 5.5),
        ("St. Louis", 2.0),
    ];
    let waves = [(270.0, 35.0, 60.0), (420.0, 25.0, 35.0), (630.0, 40.0, 80.0)];

    let mut all_county: Vec<&str> = Vec::new();
    let mut all_date: Vec<NaiveDate> = Vec::new();
    let mut all_cases: Vec<u64> = Vec::new();

    for &(county, scale) in &counties {
        for day in 0..n_days {
            let mean = expected_cases(day as f64, &waves) * scale;
            let noisy = rng.gauss(mean, mean.sqrt().max(0.5)).round().max(0.0);

            all_county.push(county);
            all_date.push(start + Duration::days(day));
            all_cases.push(noisy as u64);
        }
    }

    // Long-format CSV
    let csv_path = "sample_cases.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV output")?;
    for ((&county, &date), &cases) in all_county.iter().zip(&all_date).zip(&all_cases) {
        writer.serialize(Row {
            county,
            date,
            cases,
        })?;
    }
    writer.flush()?;

    // Parquet
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch")?;
    let days: Vec<i32> = all_date
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();
    let cases: Vec<i64> = all_cases.iter().map(|&c| c as i64).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("county", DataType::Utf8, false),
        Field::new("date", DataType::Date32, false),
        Field::new("cases", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(all_county)),
            Arc::new(Date32Array::from(days)),
            Arc::new(Int64Array::from(cases)),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "sample_cases.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {} records ({} counties × {n_days} days) to {csv_path} and {parquet_path}",
        all_cases.len(),
        counties.len(),
    );
    Ok(())
}
