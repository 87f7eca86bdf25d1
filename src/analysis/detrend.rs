use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::data::model::linspace;
use crate::error::{BoreholeError, Result};

/// Trend model removed from each resampled signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Subtract the mean.
    Mean,
    Linear,
    Quadratic,
    Cubic,
}

impl Trend {
    /// Polynomial degree of the model (`Mean` is degree 0).
    pub fn degree(&self) -> usize {
        match self {
            Trend::Mean => 0,
            Trend::Linear => 1,
            Trend::Quadratic => 2,
            Trend::Cubic => 3,
        }
    }
}

impl FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(Trend::Mean),
            "linear" => Ok(Trend::Linear),
            "quadratic" => Ok(Trend::Quadratic),
            "cubic" => Ok(Trend::Cubic),
            other => Err(format!(
                "unknown trend '{other}', expected one of mean, linear, quadratic, cubic"
            )),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trend::Mean => "mean",
            Trend::Linear => "linear",
            Trend::Quadratic => "quadratic",
            Trend::Cubic => "cubic",
        };
        write!(f, "{name}")
    }
}

/// Parse a trend name where `none` means no detrending.
pub fn parse_optional_trend(s: &str) -> std::result::Result<Option<Trend>, String> {
    if s.eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

/// Remove `trend` from `signal` in place.
///
/// Polynomial trends are least-squares fits against positions spread evenly
/// over the unit interval, so only the sample order matters, not the actual
/// domain spacing.
pub fn detrend(signal: &mut [f64], trend: Trend) -> Result<()> {
    let n = signal.len();
    let ncoeffs = trend.degree() + 1;
    if n < ncoeffs {
        return Err(BoreholeError::DegenerateTrend {
            degree: trend.degree(),
            nsamples: n,
        });
    }

    if trend == Trend::Mean {
        let mean = signal.iter().sum::<f64>() / n as f64;
        signal.iter_mut().for_each(|v| *v -= mean);
        return Ok(());
    }

    let t = linspace(0.0, 1.0, n);
    let coeffs = fit_polynomial(&t, signal, trend.degree())?;
    for (v, &ti) in signal.iter_mut().zip(&t) {
        *v -= eval_polynomial(&coeffs, ti);
    }
    Ok(())
}

/// Least-squares polynomial coefficients, lowest order first.
fn fit_polynomial(x: &[f64], y: &[f64], degree: usize) -> Result<Array1<f64>> {
    let m = degree + 1;
    let mut ata = Array2::<f64>::zeros((m, m));
    let mut aty = Array1::<f64>::zeros(m);

    for (&xi, &yi) in x.iter().zip(y) {
        let powers: Vec<f64> = (0..m).map(|p| xi.powi(p as i32)).collect();
        for r in 0..m {
            aty[r] += powers[r] * yi;
            for c in 0..m {
                ata[[r, c]] += powers[r] * powers[c];
            }
        }
    }

    solve(ata, aty).ok_or(BoreholeError::DegenerateTrend {
        degree,
        nsamples: x.len(),
    })
}

/// Gaussian elimination with partial pivoting. `None` if singular.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let m = b.len();
    for col in 0..m {
        let pivot = (col..m).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for k in 0..m {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        for row in col + 1..m {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..m {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(m);
    for row in (0..m).rev() {
        let tail: f64 = (row + 1..m).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}

fn eval_polynomial(coeffs: &Array1<f64>, x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
