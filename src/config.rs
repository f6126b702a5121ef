use std::path::PathBuf;

use clap::Parser;

use crate::state::Variant;

/// Interactive dashboard for county-level COVID-19 case counts.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Case-count file to open at startup (.csv, .json or .parquet)
    #[arg(long, env = "COUNTY_CASES_DATA")]
    pub data: Option<PathBuf>,

    /// Time window shown in the filter panel
    #[arg(long, value_enum, default_value_t = Variant::Months)]
    pub variant: Variant,

    /// Initial window width in points
    #[arg(long, default_value_t = 1200.0)]
    pub width: f32,

    /// Initial window height in points
    #[arg(long, default_value_t = 800.0)]
    pub height: f32,
}
