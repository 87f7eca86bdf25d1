use crate::data::filter::{apply_mask, mask_all_nans};
use crate::data::model::{DomainBounds, SampleSeries, SamplerProperties};
use crate::error::{BoreholeError, Result};

/// Relative tolerance under which two domain positions count as one.
const DUPLICATE_TOLERANCE: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Resampler – linear interpolation of one series onto a regular grid
// ---------------------------------------------------------------------------

/// Wraps one NaN-free series and evaluates it anywhere on the domain.
///
/// On construction the samples are sorted by domain position and repeated
/// positions are collapsed (first occurrence wins).  Evaluation is piecewise
/// linear between knots; outside the knot range the nearest edge segment is
/// extended, so values are linearly extrapolated rather than clamped.
#[derive(Debug, Clone)]
pub struct Resampler {
    /// Clean samples in their original order.
    series: SampleSeries,
    knots_x: Vec<f64>,
    knots_y: Vec<f64>,
}

impl Resampler {
    /// Interpolation order. Only linear interpolation is supported.
    pub const ORDER: usize = 1;

    /// Build a resampler for the dataset `key`, dropping any sample with a
    /// NaN in either array.
    ///
    /// An infinite value that survives the mask is rejected: it would turn
    /// every interpolated value (and the default bounds) into NaN or inf.
    pub fn new(key: &str, domain: &[f64], signal: &[f64]) -> Result<Self> {
        let mask = mask_all_nans(&[domain, signal])?;
        if let Some(index) = (0..mask.len())
            .find(|&i| mask[i] && !(domain[i].is_finite() && signal[i].is_finite()))
        {
            return Err(BoreholeError::NonFinite {
                key: key.to_string(),
                index,
            });
        }
        let series = SampleSeries::new(apply_mask(domain, &mask), apply_mask(signal, &mask))?;
        if series.is_empty() {
            return Err(BoreholeError::InsufficientData {
                key: key.to_string(),
            });
        }

        let mut pairs: Vec<(f64, f64)> = series
            .domain
            .iter()
            .copied()
            .zip(series.signal.iter().copied())
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut knots_x: Vec<f64> = Vec::with_capacity(pairs.len());
        let mut knots_y: Vec<f64> = Vec::with_capacity(pairs.len());
        for (x, y) in pairs {
            if let Some(&last) = knots_x.last() {
                if is_duplicate(last, x) {
                    continue;
                }
            }
            knots_x.push(x);
            knots_y.push(y);
        }

        Ok(Resampler {
            series,
            knots_x,
            knots_y,
        })
    }

    /// The clean (NaN-free) samples, in input order.
    pub fn series(&self) -> &SampleSeries {
        &self.series
    }

    /// Number of clean samples held.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Always false: a resampler holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Smallest and largest clean domain position.
    pub fn domain_bounds(&self) -> (f64, f64) {
        (self.knots_x[0], self.knots_x[self.knots_x.len() - 1])
    }

    /// Resample onto `nsamples` evenly spaced points over `domain_bounds`.
    pub fn resample(&self, nsamples: usize, domain_bounds: (f64, f64)) -> Result<SampleSeries> {
        let bounds = DomainBounds::new(domain_bounds.0, domain_bounds.1)?;
        let props = SamplerProperties::new(nsamples, bounds)?;
        Ok(self.resample_with(&props))
    }

    /// Resample over this series' own clean range.
    pub fn resample_own(&self, nsamples: usize) -> Result<SampleSeries> {
        self.resample(nsamples, self.domain_bounds())
    }

    /// Resample with already validated properties.
    pub fn resample_with(&self, props: &SamplerProperties) -> SampleSeries {
        let domain = props.target_domain();
        let signal = self.interpolate(&domain);
        SampleSeries { domain, signal }
    }

    /// Evaluate the interpolant at arbitrary positions.
    pub fn interpolate(&self, targets: &[f64]) -> Vec<f64> {
        targets.iter().map(|&x| self.evaluate(x)).collect()
    }

    fn evaluate(&self, x: f64) -> f64 {
        let n = self.knots_x.len();
        if n == 1 {
            return self.knots_y[0];
        }
        // Segment (i - 1, i); the clamp extends the edge segments outwards.
        let i = self.knots_x.partition_point(|&k| k < x).clamp(1, n - 1);
        let (x0, x1) = (self.knots_x[i - 1], self.knots_x[i]);
        let (y0, y1) = (self.knots_y[i - 1], self.knots_y[i]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

fn is_duplicate(a: f64, b: f64) -> bool {
    a == b || (a - b).powi(2) / a.abs() <= DUPLICATE_TOLERANCE
}
