use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::detrend::Trend;
use crate::borehole::ResampleOptions;
use crate::data::model::DomainBounds;

// ---------------------------------------------------------------------------
// Alignment configuration
// ---------------------------------------------------------------------------

/// Everything needed to turn one log file into an aligned matrix.
///
/// Built explicitly (from JSON or by hand) and passed by reference; there is
/// no process-wide instance.
///
/// ```json
/// {
///   "domain_key": "depth",
///   "signal_keys": ["gamma", "bulk_density"],
///   "labels": { "gamma": "Gamma ray (API)" },
///   "nsamples": 500,
///   "domain_bounds": [10.0, 250.0],
///   "normalize": true,
///   "detrend": "linear"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlignConfig {
    /// Column holding the sample positions.
    pub domain_key: String,
    /// Signal columns to load; empty loads every other column.
    pub signal_keys: Vec<String>,
    /// Display labels by key.
    pub labels: BTreeMap<String, String>,
    pub nsamples: Option<usize>,
    pub domain_bounds: Option<DomainBounds>,
    pub normalize: bool,
    pub detrend: Option<Trend>,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            domain_key: "depth".to_string(),
            signal_keys: Vec::new(),
            labels: BTreeMap::new(),
            nsamples: None,
            domain_bounds: None,
            normalize: false,
            detrend: None,
        }
    }
}

impl AlignConfig {
    /// Read a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Overrides for [`Borehole::resample`](crate::borehole::Borehole::resample).
    pub fn resample_options(&self) -> ResampleOptions {
        ResampleOptions {
            nsamples: self.nsamples,
            domain_bounds: self.domain_bounds.map(Into::into),
            normalize: self.normalize,
            detrend: self.detrend,
        }
    }
}
