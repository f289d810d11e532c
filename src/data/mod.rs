/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, country / year index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range + country set → View
///   └──────────┘
///        │
///        ├──► summary   KPI totals, leader, country × year pivot
///        ├──► series    per-chart derivations
///        └──► export    View → CSV bytes
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod series;
pub mod summary;
