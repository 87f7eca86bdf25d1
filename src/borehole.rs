use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::analysis::detrend::{detrend, Trend};
use crate::analysis::normalize::standardize_columns;
use crate::analysis::resampler::Resampler;
use crate::data::model::{DomainBounds, SampleSeries, SamplerDefaults, SamplerProperties};
use crate::error::{BoreholeError, Result};

/// A borehole behind a reader-writer lock: `add_datum` and `resample` take
/// the write half, accessors the read half.
pub type SharedBorehole = Arc<RwLock<Borehole>>;

// ---------------------------------------------------------------------------
// Resample options
// ---------------------------------------------------------------------------

/// Per-call overrides for [`Borehole::resample`].
///
/// An absent field keeps the borehole's running default for it; it never
/// clears the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResampleOptions {
    pub nsamples: Option<usize>,
    /// Raw `(min, max)`; validated when the pass starts.
    pub domain_bounds: Option<(f64, f64)>,
    /// Replace the matrix with column z-scores.
    pub normalize: bool,
    /// Trend removed from each resampled signal before normalising.
    pub detrend: Option<Trend>,
}

impl ResampleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nsamples(mut self, nsamples: usize) -> Self {
        self.nsamples = Some(nsamples);
        self
    }

    pub fn domain_bounds(mut self, min: f64, max: f64) -> Self {
        self.domain_bounds = Some((min, max));
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn detrend(mut self, trend: Option<Trend>) -> Self {
        self.detrend = trend;
        self
    }
}

// ---------------------------------------------------------------------------
// Registry state
// ---------------------------------------------------------------------------

/// Lifecycle of a [`Borehole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoreholeState {
    /// No datasets yet.
    Empty,
    /// Datasets present, no current matrix.
    Populated,
    /// The matrix reflects every dataset currently registered.
    Resampled,
}

/// Display label plus the matrix column assigned in the last resample pass.
#[derive(Debug, Clone, PartialEq)]
struct Label {
    column: Option<usize>,
    text: String,
}

/// Output of one resample pass.
#[derive(Debug, Clone)]
struct Aligned {
    properties: SamplerProperties,
    domain: Array1<f64>,
    /// Shape (nsamples, ndatasets).
    data: Array2<f64>,
}

/// Clean samples and label of one dataset, as returned by
/// [`Borehole::get_raw_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawDatum<'a> {
    pub key: &'a str,
    pub label: &'a str,
    pub column: Option<usize>,
    pub series: &'a SampleSeries,
}

// ---------------------------------------------------------------------------
// Borehole – named datasets aligned onto one domain
// ---------------------------------------------------------------------------

/// A set of named measurement series and, once resampled, their values on a
/// shared evenly spaced domain.
///
/// Column `i` of the matrix belongs to the `i`-th key in insertion order.
/// Re-adding an existing key replaces its data but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct Borehole {
    samplers: IndexMap<String, Resampler>,
    labels: IndexMap<String, Label>,
    defaults: SamplerDefaults,
    aligned: Option<Aligned>,
}

impl Borehole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a lock for shared use across threads.
    pub fn into_shared(self) -> SharedBorehole {
        Arc::new(RwLock::new(self))
    }

    /// Add (or replace) the dataset stored under `key`.
    ///
    /// Samples with a NaN in either array are dropped first; an infinite
    /// value among the rest is a [`BoreholeError::NonFinite`].  The label
    /// defaults to the key.  Any previously resampled matrix is discarded,
    /// since it no longer covers every dataset.
    pub fn add_datum(
        &mut self,
        domain: &[f64],
        signal: &[f64],
        key: &str,
        label: Option<&str>,
    ) -> Result<()> {
        let sampler = Resampler::new(key, domain, signal)?;
        let clean = sampler.len();

        let label = label.unwrap_or(key).to_string();
        info!(
            "Adding dataset {key} with {} entries ({clean} clean), and label {label}",
            signal.len()
        );
        if self.samplers.contains_key(key) {
            debug!("Replacing existing dataset {key}");
        }

        self.samplers.insert(key.to_string(), sampler);
        self.labels.insert(
            key.to_string(),
            Label {
                column: None,
                text: label,
            },
        );
        self.defaults = self.samplers.values().fold(SamplerDefaults::default(), |mut acc, s| {
            acc.absorb(s.len(), s.domain_bounds());
            acc
        });
        self.invalidate();
        Ok(())
    }

    /// Interpolate every dataset onto one shared domain.
    ///
    /// Absent options fall back to the running defaults: the largest clean
    /// sample count and the intersection of all dataset ranges.  Every
    /// dataset is recomputed on each call.  On error the previous matrix (if
    /// any) is kept as it was.
    pub fn resample(&mut self, options: &ResampleOptions) -> Result<()> {
        if self.samplers.is_empty() {
            return Err(BoreholeError::State(
                "cannot resample a borehole with no datasets".to_string(),
            ));
        }
        let properties = self.resolve_properties(options)?;

        info!(
            "Aligning {} datasets onto {} samples over {}",
            self.samplers.len(),
            properties.nsamples,
            properties.domain_bounds
        );

        let mut rows = Array2::<f64>::zeros((self.samplers.len(), properties.nsamples));
        let target = properties.target_domain();
        for (index, (key, sampler)) in self.samplers.iter().enumerate() {
            let mut signal = sampler.interpolate(&target);
            if let Some(trend) = options.detrend {
                debug!("Detrending {key} ({trend})");
                detrend(&mut signal, trend)?;
            }
            rows.row_mut(index).assign(&ArrayView1::from(&signal));
        }

        // Rows are samples, columns are datasets
        let mut data = rows.reversed_axes();
        if options.normalize {
            info!("Normalising datasets");
            let keys: Vec<String> = self.samplers.keys().cloned().collect();
            data = standardize_columns(&data, &keys)?;
        }

        self.aligned = Some(Aligned {
            properties,
            domain: Array1::from(target),
            data,
        });
        for (index, key) in self.samplers.keys().enumerate() {
            if let Some(label) = self.labels.get_mut(key) {
                label.column = Some(index);
            }
        }
        self.check_columns()
    }

    fn resolve_properties(&self, options: &ResampleOptions) -> Result<SamplerProperties> {
        let nsamples = options.nsamples.or(self.defaults.nsamples).ok_or_else(|| {
            BoreholeError::DomainConfig("no sample count available".to_string())
        })?;
        let (min, max) = options
            .domain_bounds
            .or(self.defaults.domain_bounds)
            .ok_or_else(|| BoreholeError::DomainConfig("no domain bounds available".to_string()))?;
        let bounds = DomainBounds::new(min, max).map_err(|err| {
            if options.domain_bounds.is_none() {
                BoreholeError::DomainConfig(format!(
                    "datasets share no common domain range ({min}, {max})"
                ))
            } else {
                err
            }
        })?;
        SamplerProperties::new(nsamples, bounds)
    }

    /// Verify that every key maps to the matrix column of its position.
    pub fn check_columns(&self) -> Result<()> {
        let Some(aligned) = &self.aligned else {
            return Ok(());
        };
        if aligned.data.ncols() != self.samplers.len() {
            return Err(BoreholeError::State(format!(
                "matrix has {} columns for {} datasets",
                aligned.data.ncols(),
                self.samplers.len()
            )));
        }
        for (index, key) in self.samplers.keys().enumerate() {
            let column = self.labels.get(key).and_then(|l| l.column);
            if column != Some(index) {
                return Err(BoreholeError::State(format!(
                    "dataset {key} is at position {index} but mapped to column {column:?}"
                )));
            }
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        if self.aligned.take().is_some() {
            debug!("Discarding stale aligned matrix");
        }
        for label in self.labels.values_mut() {
            label.column = None;
        }
    }

    // -- Accessors --

    /// Where the borehole is in its lifecycle.
    pub fn state(&self) -> BoreholeState {
        if self.samplers.is_empty() {
            BoreholeState::Empty
        } else if self.aligned.is_some() {
            BoreholeState::Resampled
        } else {
            BoreholeState::Populated
        }
    }

    /// Number of datasets.
    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.samplers.contains_key(key)
    }

    /// The running defaults used when `resample` is given no overrides.
    pub fn default_sampler_properties(&self) -> SamplerDefaults {
        self.defaults
    }

    /// Properties of the last resample pass, if the matrix is current.
    pub fn sampler_properties(&self) -> Option<SamplerProperties> {
        self.aligned.as_ref().map(|a| a.properties)
    }

    /// The resampler stored under `key`.
    pub fn sampler(&self, key: &str) -> Result<&Resampler> {
        self.samplers
            .get(key)
            .ok_or_else(|| BoreholeError::KeyNotFound(key.to_string()))
    }

    /// Keys in matrix column order.
    pub fn get_keys(&self) -> Vec<&str> {
        self.samplers.keys().map(String::as_str).collect()
    }

    /// The shared domain of the last resample pass.
    pub fn get_domain(&self) -> Option<ArrayView1<'_, f64>> {
        self.aligned.as_ref().map(|a| a.domain.view())
    }

    /// The resampled matrix, shape (nsamples, ndatasets).
    pub fn get_data(&self) -> Option<ArrayView2<'_, f64>> {
        self.aligned.as_ref().map(|a| a.data.view())
    }

    /// Resampled columns for `keys`, in the order requested.  With no keys,
    /// every column in matrix order.
    pub fn get_signal(&self, keys: &[&str]) -> Result<IndexMap<String, ArrayView1<'_, f64>>> {
        let keys = self.resolve_keys(keys)?;
        let aligned = self.aligned.as_ref().ok_or_else(|| {
            BoreholeError::State("get_signal called before resample".to_string())
        })?;

        keys.into_iter()
            .map(|key| {
                let column = self
                    .labels
                    .get(key)
                    .and_then(|l| l.column)
                    .ok_or_else(|| BoreholeError::State(format!("dataset {key} has no column")))?;
                Ok((key.to_string(), aligned.data.index_axis(Axis(1), column)))
            })
            .collect()
    }

    /// Clean input samples and labels for `keys` (all datasets if empty).
    pub fn get_raw_data(&self, keys: &[&str]) -> Result<Vec<RawDatum<'_>>> {
        self.resolve_keys(keys)?
            .into_iter()
            .map(|key| {
                let (key, sampler) = self
                    .samplers
                    .get_key_value(key)
                    .ok_or_else(|| BoreholeError::KeyNotFound(key.to_string()))?;
                let label = self
                    .labels
                    .get(key)
                    .ok_or_else(|| BoreholeError::KeyNotFound(key.to_string()))?;
                Ok(RawDatum {
                    key: key.as_str(),
                    label: label.text.as_str(),
                    column: label.column,
                    series: sampler.series(),
                })
            })
            .collect()
    }

    /// Labels in matrix column order, restricted to `keys` when given.
    pub fn get_labels(&self, keys: &[&str]) -> Result<Vec<&str>> {
        self.resolve_keys(keys)?;
        Ok(self
            .labels
            .iter()
            .filter(|(key, _)| keys.is_empty() || keys.contains(&key.as_str()))
            .map(|(_, label)| label.text.as_str())
            .collect())
    }

    /// Check that every key is registered; empty means all keys.
    fn resolve_keys<'k>(&'k self, keys: &[&'k str]) -> Result<Vec<&'k str>> {
        if keys.is_empty() {
            return Ok(self.get_keys());
        }
        for key in keys {
            if !self.samplers.contains_key(*key) {
                return Err(BoreholeError::KeyNotFound(key.to_string()));
            }
        }
        Ok(keys.to_vec())
    }
}
