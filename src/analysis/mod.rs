/// Numerical layer: interpolation onto a shared grid and column post-processing.
///
/// ```text
///   clean (domain, signal)
///        │
///        ▼
///   ┌───────────┐
///   │ resampler │  sort, dedupe, linear interpolation
///   └───────────┘
///        │  one column per dataset
///        ▼
///   ┌───────────┐
///   │  detrend  │  optional per-column trend removal
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize │  optional column z-scores
///   └───────────┘
/// ```

pub mod detrend;
pub mod normalize;
pub mod resampler;
