use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BoreholeError, Result};

// ---------------------------------------------------------------------------
// Numeric conversion at the ingestion boundary
// ---------------------------------------------------------------------------

/// Strictly convert text cells to floats.
///
/// This is the parser for callers handing raw text straight to the library,
/// where a bad cell should stop the import.  The file loaders use
/// [`float_or_nan`] instead and let the mask drop bad cells.
///
/// Anything `f64::from_str` rejects is a [`BoreholeError::TypeConversion`];
/// the literal `nan` is accepted and marks a missing value.
pub fn parse_floats<S: AsRef<str>>(cells: &[S]) -> Result<Vec<f64>> {
    cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let cell = cell.as_ref();
            cell.trim()
                .parse::<f64>()
                .map_err(|_| BoreholeError::TypeConversion {
                    index,
                    value: cell.to_string(),
                })
        })
        .collect()
}

/// Lenient conversion used by tabular adapters: unparsable → NaN.
pub fn float_or_nan(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// SampleSeries – one (domain, signal) pair
// ---------------------------------------------------------------------------

/// A measurement series: signal values at (possibly irregular) domain positions.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    /// Sample positions, e.g. depth along the hole.
    pub domain: Vec<f64>,
    /// Measured values – same length as `domain`.
    pub signal: Vec<f64>,
}

impl SampleSeries {
    pub fn new(domain: Vec<f64>, signal: Vec<f64>) -> Result<Self> {
        if domain.len() != signal.len() {
            return Err(BoreholeError::ShapeMismatch {
                expected: domain.len(),
                found: signal.len(),
            });
        }
        Ok(SampleSeries { domain, signal })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DomainBounds / SamplerProperties
// ---------------------------------------------------------------------------

/// A validated, non-empty, finite domain interval `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct DomainBounds {
    min: f64,
    max: f64,
}

impl DomainBounds {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        // Written as a negation so NaN bounds are rejected too.
        if !(min < max) {
            return Err(BoreholeError::DomainConfig(format!(
                "domain bounds must satisfy min < max, got ({min}, {max})"
            )));
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(BoreholeError::DomainConfig(format!(
                "domain bounds must be finite, got ({min}, {max})"
            )));
        }
        Ok(DomainBounds { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl TryFrom<(f64, f64)> for DomainBounds {
    type Error = BoreholeError;

    fn try_from((min, max): (f64, f64)) -> Result<Self> {
        DomainBounds::new(min, max)
    }
}

impl From<DomainBounds> for (f64, f64) {
    fn from(bounds: DomainBounds) -> Self {
        (bounds.min, bounds.max)
    }
}

impl fmt::Display for DomainBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Sample count and bounds shared by every resampler in one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerProperties {
    pub nsamples: usize,
    pub domain_bounds: DomainBounds,
}

impl SamplerProperties {
    pub fn new(nsamples: usize, domain_bounds: DomainBounds) -> Result<Self> {
        if nsamples < 1 {
            return Err(BoreholeError::DomainConfig(
                "nsamples must be at least 1".to_string(),
            ));
        }
        Ok(SamplerProperties {
            nsamples,
            domain_bounds,
        })
    }

    /// Evenly spaced positions from `min` to `max` inclusive.
    pub fn target_domain(&self) -> Vec<f64> {
        linspace(self.domain_bounds.min, self.domain_bounds.max, self.nsamples)
    }
}

/// Running defaults kept by a borehole as datasets are added.
///
/// The bounds are stored raw: the intersection of disjoint datasets is an
/// empty interval, which only becomes an error once someone resamples with it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplerDefaults {
    /// Largest clean sample count over all datasets.
    pub nsamples: Option<usize>,
    /// Intersection of every dataset's clean domain range.
    pub domain_bounds: Option<(f64, f64)>,
}

impl SamplerDefaults {
    /// Fold one more dataset (clean count, clean range) into the defaults.
    pub fn absorb(&mut self, nsamples: usize, range: (f64, f64)) {
        match (self.nsamples, self.domain_bounds) {
            (Some(n), Some((lo, hi))) => {
                self.nsamples = Some(n.max(nsamples));
                self.domain_bounds = Some((lo.max(range.0), hi.min(range.1)));
            }
            _ => {
                self.nsamples = Some(nsamples);
                self.domain_bounds = Some(range);
            }
        }
    }
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
///
/// The last value is pinned to `stop` so the endpoint is exact.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            out[n - 1] = stop;
            out
        }
    }
}
