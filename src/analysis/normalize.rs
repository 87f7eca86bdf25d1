use ndarray::{Array2, Axis};

use crate::error::{BoreholeError, Result};

/// Spread below which a column counts as constant, relative to its magnitude.
const VARIANCE_FLOOR: f64 = 1e-12;

/// Column-wise z-scores: zero mean, unit (population) standard deviation.
///
/// `keys` names the columns for error reporting.  A constant column is
/// rejected with [`BoreholeError::UndefinedVariance`] instead of producing
/// NaN or infinite values. The input matrix is left untouched.
pub fn standardize_columns(data: &Array2<f64>, keys: &[String]) -> Result<Array2<f64>> {
    let mut out = data.clone();
    for (index, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
        let n = column.len() as f64;
        let mean = column.sum() / n;
        let std = (column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        let scale = column.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

        if !(std > VARIANCE_FLOOR * scale) {
            let key = keys
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("#{index}"));
            return Err(BoreholeError::UndefinedVariance { key });
        }
        column.mapv_inplace(|v| (v - mean) / std);
    }
    Ok(out)
}
