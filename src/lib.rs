//! Alignment of irregularly sampled borehole logs.
//!
//! Each log is a (domain, signal) series, typically measured against depth
//! with its own spacing and gaps.  A [`Borehole`] collects named logs and
//! resamples all of them onto one evenly spaced domain, yielding a dense
//! matrix with one column per log.

pub mod analysis;
pub mod borehole;
pub mod config;
pub mod data;
pub mod error;

pub use analysis::detrend::Trend;
pub use analysis::resampler::Resampler;
pub use borehole::{Borehole, BoreholeState, ResampleOptions, SharedBorehole};
pub use config::AlignConfig;
pub use error::{BoreholeError, Result};
