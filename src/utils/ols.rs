//! Ordinary least squares on an explicit design matrix.
//!
//! Used by the unit-root regression and for coefficient covariance of
//! fitted models.

use crate::error::{AnalysisError, Result};

/// Result of an OLS fit.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// Coefficients in design-matrix column order.
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Vec<f64>,
    /// Residual sum of squares.
    pub ssr: f64,
    /// Number of observations.
    pub nobs: usize,
}

impl OLSResult {
    /// t-statistic of coefficient `index`.
    pub fn t_value(&self, index: usize) -> f64 {
        self.coefficients[index] / self.std_errors[index]
    }

    /// Number of estimated coefficients.
    pub fn num_params(&self) -> usize {
        self.coefficients.len()
    }

    /// Gaussian log-likelihood at the OLS estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.num_params() as f64
    }
}

/// Fit `y = X β + ε` by least squares.
///
/// # Arguments
/// * `design` - Rows of the design matrix (one row per observation)
/// * `y` - Target values
///
/// # Returns
/// Coefficients with standard errors. Fails when the design matrix is
/// rank-deficient or there are no residual degrees of freedom.
pub fn ols_fit(design: &[Vec<f64>], y: &[f64]) -> Result<OLSResult> {
    let n = y.len();
    if design.len() != n {
        return Err(AnalysisError::DimensionMismatch {
            expected: n,
            got: design.len(),
        });
    }
    let k = design.first().map(|row| row.len()).unwrap_or(0);
    if k == 0 {
        return Err(AnalysisError::InvalidParameter(
            "design matrix has no columns".to_string(),
        ));
    }
    if n <= k {
        return Err(AnalysisError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in design.iter().zip(y) {
        if row.len() != k {
            return Err(AnalysisError::DimensionMismatch {
                expected: k,
                got: row.len(),
            });
        }
        for i in 0..k {
            xty[i] += row[i] * target;
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
    }

    let inverse = invert_symmetric(&xtx).ok_or_else(|| {
        AnalysisError::ComputationError("singular design matrix".to_string())
    })?;

    let coefficients: Vec<f64> = inverse
        .iter()
        .map(|row| row.iter().zip(&xty).map(|(a, b)| a * b).sum())
        .collect();

    let ssr: f64 = design
        .iter()
        .zip(y)
        .map(|(row, &target)| {
            let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
            (target - fitted).powi(2)
        })
        .sum();

    let sigma_sq = ssr / (n - k) as f64;
    let std_errors = (0..k).map(|i| (sigma_sq * inverse[i][i]).sqrt()).collect();

    Ok(OLSResult {
        coefficients,
        std_errors,
        ssr,
        nobs: n,
    })
}

/// Invert a symmetric positive definite matrix.
///
/// The matrix is first rescaled to unit diagonal so that columns on very
/// different scales (a constant next to price levels) do not defeat the
/// positive-definiteness check. Returns `None` when the matrix is singular.
pub(crate) fn invert_symmetric(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    if n == 0 || a.iter().any(|row| row.len() != n) {
        return None;
    }

    let scale: Vec<f64> = (0..n).map(|i| a[i][i].sqrt()).collect();
    if scale.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
        return None;
    }
    let scaled: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| a[i][j] / (scale[i] * scale[j])).collect())
        .collect();

    let l = cholesky(&scaled)?;

    let mut inverse = vec![vec![0.0; n]; n];
    let mut unit = vec![0.0; n];
    for col in 0..n {
        unit.iter_mut().for_each(|u| *u = 0.0);
        unit[col] = 1.0;
        let x = cholesky_solve(&l, &unit);
        for row in 0..n {
            inverse[row][col] = x[row] / (scale[row] * scale[col]);
        }
    }

    Some(inverse)
}

/// Cholesky decomposition `A = L L'`.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 1e-12 {
                    return None; // Not positive definite
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

/// Solve `L L' x = b` given the Cholesky factor.
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    x
}
