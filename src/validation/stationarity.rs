//! Augmented Dickey-Fuller unit-root test.
//!
//! The null hypothesis is that the series has a unit root. A small p-value
//! is evidence that the series is stationary.
//!
//! The regression includes a constant:
//!
//! `Δy_t = α + β y_{t-1} + Σ γ_i Δy_{t-i} + ε_t`
//!
//! The lag count is chosen by AIC on a common sample, p-values follow
//! MacKinnon (1994) and critical values MacKinnon (2010).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::is_missing;
use crate::error::{AnalysisError, Result};
use crate::transform::{rolling_mean, rolling_std};
use crate::utils::ols::{ols_fit, OLSResult};
use crate::utils::stats::normal_cdf;

/// Minimum number of observations for the test to run.
pub const MIN_OBSERVATIONS: usize = 4;

/// Window of the rolling statistics reported by [`stationarity_check`].
pub const ROLLING_WINDOW: usize = 12;

// MacKinnon (1994) response surface, constant only, one variable.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALLP: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGEP: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) critical value coefficients, constant only.
const CRIT_1PCT: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CRIT_5PCT: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CRIT_10PCT: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

/// Critical values of the test statistic.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub one_pct: f64,
    /// Critical value at 5% significance
    pub five_pct: f64,
    /// Critical value at 10% significance
    pub ten_pct: f64,
}

impl CriticalValues {
    /// Finite-sample critical values for `nobs` regression observations.
    pub fn for_nobs(nobs: usize) -> Self {
        let inv = 1.0 / nobs.max(1) as f64;
        Self {
            one_pct: eval_poly(&CRIT_1PCT, inv),
            five_pct: eval_poly(&CRIT_5PCT, inv),
            ten_pct: eval_poly(&CRIT_10PCT, inv),
        }
    }
}

/// Result of an augmented Dickey-Fuller test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    /// t-statistic of the lagged level coefficient.
    pub statistic: f64,
    /// Approximate p-value.
    pub p_value: f64,
    /// Number of lagged differences in the final regression.
    pub used_lag: usize,
    /// Number of observations in the final regression.
    pub nobs: usize,
    /// Critical values for this sample size.
    pub critical_values: CriticalValues,
}

impl AdfResult {
    /// Whether the unit-root null is rejected at `alpha`.
    pub fn is_stationary(&self, alpha: f64) -> bool {
        self.p_value <= alpha
    }
}

impl fmt::Display for AdfResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results of Dickey-Fuller Test:")?;
        writeln!(f, "{:<32}{:>12.6}", "Test Statistic", self.statistic)?;
        writeln!(f, "{:<32}{:>12.6}", "p-value", self.p_value)?;
        writeln!(f, "{:<32}{:>12}", "#Lags Used", self.used_lag)?;
        writeln!(f, "{:<32}{:>12}", "Number of Observations Used", self.nobs)?;
        writeln!(f, "{:<32}{:>12.6}", "Critical Value (1%)", self.critical_values.one_pct)?;
        writeln!(f, "{:<32}{:>12.6}", "Critical Value (5%)", self.critical_values.five_pct)?;
        write!(f, "{:<32}{:>12.6}", "Critical Value (10%)", self.critical_values.ten_pct)
    }
}

/// Default upper bound on the lag search: `ceil(12 (n / 100)^(1/4))`.
pub fn default_max_lag(nobs: usize) -> usize {
    (12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as usize
}

/// Augmented Dickey-Fuller test with AIC lag selection.
///
/// Missing values are dropped first.
///
/// # Arguments
/// * `series` - Time series data
/// * `max_lags` - Largest lag considered (default: `ceil(12 (n/100)^(1/4))`),
///   capped at `n/2 - 2`
///
/// # Errors
/// `InsufficientData` for fewer than four observations, `ComputationError`
/// for a constant series or a degenerate regression.
pub fn adf_test(series: &[f64], max_lags: Option<usize>) -> Result<AdfResult> {
    let x = prepare(series)?;
    let cap = (x.len() / 2).saturating_sub(2);
    let max_lag = max_lags
        .unwrap_or_else(|| default_max_lag(x.len()))
        .min(cap);

    let diff: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let lag = select_lag(&x, &diff, max_lag)?;
    run_regression(&x, &diff, lag, lag)
}

/// Augmented Dickey-Fuller test with a fixed number of lagged differences.
pub fn adf_test_fixed_lag(series: &[f64], lag: usize) -> Result<AdfResult> {
    let x = prepare(series)?;
    let cap = (x.len() / 2).saturating_sub(2);
    if lag > cap {
        return Err(AnalysisError::InsufficientData {
            needed: 2 * (lag + 2),
            got: x.len(),
        });
    }

    let diff: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    run_regression(&x, &diff, lag, lag)
}

/// p-value of the ADF test with default lag selection.
pub fn stationarity_p_value(series: &[f64]) -> Result<f64> {
    adf_test(series, None).map(|r| r.p_value)
}

/// Rolling level and dispersion of a series next to its ADF result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityCheck {
    pub window: usize,
    pub rolling_mean: Vec<f64>,
    pub rolling_std: Vec<f64>,
    pub adf: AdfResult,
}

impl StationarityCheck {
    /// Range of the defined rolling means, `None` before the first full window.
    pub fn mean_drift(&self) -> Option<f64> {
        let (lo, hi) = self
            .rolling_mean
            .iter()
            .filter(|v| !is_missing(**v))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        (hi >= lo).then(|| hi - lo)
    }
}

/// Trailing rolling mean and std over `window` plus an ADF test.
pub fn stationarity_check(series: &[f64], window: usize) -> Result<StationarityCheck> {
    if window < 2 {
        return Err(AnalysisError::InvalidParameter(format!(
            "rolling window must be at least 2, got {}",
            window
        )));
    }
    let adf = adf_test(series, None)?;

    Ok(StationarityCheck {
        window,
        rolling_mean: rolling_mean(series, window),
        rolling_std: rolling_std(series, window),
        adf,
    })
}

/// MacKinnon (1994) approximate p-value of an ADF statistic.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let coefs: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALLP
    } else {
        &TAU_LARGEP
    };
    normal_cdf(eval_poly(coefs, statistic))
}

fn prepare(series: &[f64]) -> Result<Vec<f64>> {
    let x: Vec<f64> = series.iter().copied().filter(|v| !is_missing(*v)).collect();
    if x.len() < MIN_OBSERVATIONS {
        return Err(AnalysisError::InsufficientData {
            needed: MIN_OBSERVATIONS,
            got: x.len(),
        });
    }

    let min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return Err(AnalysisError::ComputationError(
            "unit-root test is undefined for a constant series".to_string(),
        ));
    }
    Ok(x)
}

/// Pick the lag in `0..=max_lag` with the lowest AIC, all fitted on the
/// sample that the largest lag allows. Ties keep the smaller lag.
fn select_lag(x: &[f64], diff: &[f64], max_lag: usize) -> Result<usize> {
    let mut best: Option<(f64, usize)> = None;
    let mut last_error = None;

    for lag in 0..=max_lag {
        match fit_adf(x, diff, lag, max_lag) {
            Ok(fit) => {
                let aic = fit.aic();
                if aic.is_finite() && best.map_or(true, |(b, _)| aic < b) {
                    best = Some((aic, lag));
                }
            }
            Err(e) => last_error = Some(e),
        }
    }

    match (best, last_error) {
        (Some((_, lag)), _) => Ok(lag),
        (None, Some(e)) => Err(e),
        (None, None) => Err(AnalysisError::ComputationError(
            "no lag order could be evaluated".to_string(),
        )),
    }
}

fn run_regression(x: &[f64], diff: &[f64], lag: usize, sample_lag: usize) -> Result<AdfResult> {
    let fit = fit_adf(x, diff, lag, sample_lag)?;
    let statistic = fit.t_value(0);
    if !statistic.is_finite() {
        return Err(AnalysisError::ComputationError(
            "degenerate unit-root regression".to_string(),
        ));
    }

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag: lag,
        nobs: fit.nobs,
        critical_values: CriticalValues::for_nobs(fit.nobs),
    })
}

/// Regress `Δy_t` on `[y_{t-1}, 1, Δy_{t-1}, ..., Δy_{t-lag}]` for the
/// rows `sample_lag..diff.len()`.
fn fit_adf(x: &[f64], diff: &[f64], lag: usize, sample_lag: usize) -> Result<OLSResult> {
    let mut design = Vec::with_capacity(diff.len().saturating_sub(sample_lag));
    let mut target = Vec::with_capacity(design.capacity());

    for t in sample_lag..diff.len() {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(x[t]);
        row.push(1.0);
        row.extend((1..=lag).map(|i| diff[t - i]));
        design.push(row);
        target.push(diff[t]);
    }

    let fit = ols_fit(&design, &target)?;
    let scale: f64 = target.iter().map(|v| v * v).sum();
    if fit.ssr <= 1e-14 * scale {
        return Err(AnalysisError::ComputationError(
            "unit-root regression has no residual variance".to_string(),
        ));
    }
    Ok(fit)
}

/// Evaluate `c0 + c1 x + c2 x^2 + ...`.
fn eval_poly(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}
