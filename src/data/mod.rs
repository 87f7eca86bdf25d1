/// Data layer: core types, loading, masking, and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → LogTable (domain + signal columns, NaN = missing)
///   └──────────┘
///        │  one add_datum per signal column
///        ▼
///   ┌──────────┐
///   │  filter   │  NaN-coherence mask over (domain, signal)
///   └──────────┘
///        │
///        ▼
///     Borehole ──resample──▶ writer  (aligned CSV)
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod writer;
