/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file (pivot wide CSV) → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ Arc<Dataset> │  Vec<Record>, county/year/date domains, read-only
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → ordered record indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ summary  │  per-county totals for the summary table
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
