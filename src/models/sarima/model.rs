//! Seasonal ARIMA fitted by conditional sum of squares.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{is_missing, Forecast, TimeSeries};
use crate::error::{AnalysisError, Result};
use crate::models::sarima::order::{SarimaOrder, Trend};
use crate::models::sarima::poly;
use crate::models::Forecaster;
use crate::utils::ols::invert_symmetric;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, quantile_normal, two_sided_p_value};

/// Bound on AR and MA coefficients when bounds are enforced.
const COEFFICIENT_BOUND: f64 = 0.99;

/// An estimated parameter with its standard error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    /// Parameter name, e.g. `ar.L1` or `ma.S.L12`.
    pub name: String,
    /// Point estimate.
    pub value: f64,
    /// Standard error (NaN when the information matrix is singular).
    pub std_error: f64,
    /// z-statistic.
    pub z: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

impl Coefficient {
    fn new(name: String, value: f64, std_error: f64) -> Self {
        let z = value / std_error;
        Self {
            name,
            value,
            std_error,
            z,
            p_value: two_sided_p_value(z),
        }
    }
}

/// Model parameters unpacked from the optimiser vector.
///
/// Layout of the vector: trend terms, AR, MA, seasonal AR, seasonal MA.
#[derive(Debug, Clone, Default, PartialEq)]
struct Params {
    intercept: f64,
    drift: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
}

impl Params {
    fn unpack(order: &SarimaOrder, trend: Trend, theta: &[f64]) -> Self {
        let mut rest = theta;
        let mut take = |count: usize| {
            let (head, tail) = rest.split_at(count.min(rest.len()));
            rest = tail;
            head.to_vec()
        };

        let mut scalar = |present: bool| {
            if present {
                take(1).first().copied().unwrap_or(0.0)
            } else {
                0.0
            }
        };
        let intercept = scalar(trend.has_constant());
        let drift = scalar(trend.has_drift());
        Self {
            intercept,
            drift,
            ar: take(order.p),
            ma: take(order.q),
            seasonal_ar: take(order.seasonal_p),
            seasonal_ma: take(order.seasonal_q),
        }
    }

    fn names(order: &SarimaOrder, trend: Trend) -> Vec<String> {
        let mut names = Vec::with_capacity(order.num_coefficients() + trend.num_params());
        if trend.has_constant() {
            names.push("intercept".to_string());
        }
        if trend.has_drift() {
            names.push("drift".to_string());
        }
        names.extend((1..=order.p).map(|i| format!("ar.L{}", i)));
        names.extend((1..=order.q).map(|i| format!("ma.L{}", i)));
        names.extend((1..=order.seasonal_p).map(|i| format!("ar.S.L{}", i * order.period)));
        names.extend((1..=order.seasonal_q).map(|i| format!("ma.S.L{}", i * order.period)));
        names
    }

    /// Trend value at index `t` of the differenced series.
    fn mean_at(&self, t: usize) -> f64 {
        self.intercept + self.drift * (t + 1) as f64
    }

    fn ar_poly(&self, period: usize) -> Vec<f64> {
        poly::ar_polynomial(&self.ar, &self.seasonal_ar, period)
    }

    fn ma_poly(&self, period: usize) -> Vec<f64> {
        poly::ma_polynomial(&self.ma, &self.seasonal_ma, period)
    }
}

/// Residuals `e_t` of the differenced series; zero before the largest AR lag.
fn css_residuals(w: &[f64], period: usize, params: &Params) -> Vec<f64> {
    let ar = params.ar_poly(period);
    let ma = params.ma_poly(period);
    let start = ar.len() - 1;

    let centered: Vec<f64> = w
        .iter()
        .enumerate()
        .map(|(t, v)| v - params.mean_at(t))
        .collect();

    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let autoregressive: f64 = ar.iter().enumerate().map(|(k, c)| c * centered[t - k]).sum();
        let moving_average: f64 = ma
            .iter()
            .enumerate()
            .skip(1)
            .take_while(|(k, _)| *k <= t)
            .map(|(k, c)| c * e[t - k])
            .sum();
        e[t] = autoregressive - moving_average;
    }
    e
}

fn sum_of_squares(residuals: &[f64]) -> f64 {
    residuals.iter().map(|e| e * e).sum()
}

/// State of a fitted model.
#[derive(Debug, Clone)]
struct FitState {
    values: Vec<f64>,
    diff_poly: Vec<f64>,
    differenced: Vec<f64>,
    params: Params,
    /// Residuals on the differenced index.
    innovations: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    nobs_effective: usize,
    coefficients: Vec<Coefficient>,
    converged: bool,
}

/// Seasonal ARIMA `(p, d, q) x (P, D, Q, s)` with an optional trend.
///
/// The model is `φ(B) Φ(B^s) (w_t - μ_t) = θ(B) Θ(B^s) e_t` where
/// `w_t = (1-B)^d (1-B^s)^D y_t` and `μ_t` is the trend. Parameters minimise
/// the conditional sum of squares with Nelder-Mead. AR and MA coefficients
/// are unconstrained unless [`Sarima::with_bounds`] is enabled.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use realty_forecast::core::TimeSeries;
/// use realty_forecast::models::{Forecaster, Sarima, SarimaOrder, Trend};
///
/// let start = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
/// let values: Vec<f64> = (0..60)
///     .map(|i| 200_000.0 + 800.0 * i as f64 + 1_500.0 * (i as f64 * 0.9).sin())
///     .collect();
/// let series = TimeSeries::monthly(start, values).unwrap();
///
/// let mut model = Sarima::new(SarimaOrder::new(1, 1, 0)).with_trend(Trend::Constant);
/// model.fit(&series).unwrap();
///
/// let forecast = model.predict_with_intervals(12, 0.95).unwrap();
/// assert_eq!(forecast.horizon(), 12);
/// assert!(model.aic().unwrap().is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Sarima {
    order: SarimaOrder,
    trend: Trend,
    enforce_bounds: bool,
    optimizer: NelderMeadConfig,
    state: Option<FitState>,
}

impl Sarima {
    /// Create an unfitted model.
    pub fn new(order: SarimaOrder) -> Self {
        Self {
            order,
            trend: Trend::None,
            enforce_bounds: false,
            optimizer: NelderMeadConfig::default().with_max_iter(2000),
            state: None,
        }
    }

    /// Set the trend term.
    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = trend;
        self
    }

    /// Clamp AR and MA coefficients to `(-0.99, 0.99)` during fitting.
    pub fn with_bounds(mut self, enforce: bool) -> Self {
        self.enforce_bounds = enforce;
        self
    }

    pub fn order(&self) -> SarimaOrder {
        self.order
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    /// Number of estimated parameters excluding the innovation variance.
    pub fn num_params(&self) -> usize {
        self.order.num_coefficients() + self.trend.num_params()
    }

    /// Shortest series this order can be fitted to.
    pub fn min_observations(&self) -> usize {
        self.order.differencing_lag()
            + self.order.max_ar_lag().max(self.order.max_ma_lag())
            + self.num_params()
            + 2
    }

    /// Estimated coefficients, including `sigma2`.
    pub fn coefficients(&self) -> Option<&[Coefficient]> {
        self.state.as_ref().map(|s| s.coefficients.as_slice())
    }

    /// Look up a coefficient by name.
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients()?.iter().find(|c| c.name == name)
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        self.state
            .as_ref()
            .map(|s| s.params.ar.as_slice())
            .unwrap_or(&[])
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        self.state
            .as_ref()
            .map(|s| s.params.ma.as_slice())
            .unwrap_or(&[])
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        self.state
            .as_ref()
            .map(|s| s.params.seasonal_ar.as_slice())
            .unwrap_or(&[])
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        self.state
            .as_ref()
            .map(|s| s.params.seasonal_ma.as_slice())
            .unwrap_or(&[])
    }

    /// Innovation variance.
    pub fn sigma2(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.sigma2)
    }

    /// Conditional Gaussian log-likelihood.
    pub fn log_likelihood(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.log_likelihood)
    }

    pub fn aic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.aic)
    }

    pub fn bic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.bic)
    }

    /// Number of residuals entering the likelihood.
    pub fn nobs_effective(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.nobs_effective)
    }

    /// Whether the optimiser met its tolerance before the iteration limit.
    pub fn converged(&self) -> Option<bool> {
        self.state.as_ref().map(|s| s.converged)
    }

    /// Fit to raw values. Missing values are rejected.
    pub fn fit_values(&mut self, values: &[f64]) -> Result<()> {
        self.order.validate()?;
        if values.is_empty() {
            return Err(AnalysisError::EmptyData);
        }
        if values.iter().any(|v| is_missing(*v)) {
            return Err(AnalysisError::MissingValues);
        }
        let needed = self.min_observations();
        if values.len() < needed {
            return Err(AnalysisError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let order = self.order;
        let trend = self.trend;
        let period = order.period;

        let diff_poly = poly::differencing_polynomial(order.d, order.seasonal_d, period);
        let w = poly::apply_filter(&diff_poly, values);
        let start = order.max_ar_lag();
        let nobs_effective = w.len() - start;

        let css = |theta: &[f64]| {
            let params = Params::unpack(&order, trend, theta);
            sum_of_squares(&css_residuals(&w, period, &params)[start..])
        };

        let initial = self.initial_guess(&w);
        let (theta, converged) = if initial.is_empty() {
            (initial, true)
        } else {
            let scale = match css(&initial) {
                s if s.is_finite() && s > 0.0 => s,
                _ => 1.0,
            };
            let bounds = self.bounds();
            let result = nelder_mead(
                |theta| css(theta) / scale,
                &initial,
                bounds.as_deref(),
                self.optimizer,
            );
            debug!(
                order = %order,
                iterations = result.iterations,
                converged = result.converged,
                "css optimisation finished"
            );
            (result.optimal_point, result.converged)
        };

        let params = Params::unpack(&order, trend, &theta);
        let innovations = css_residuals(&w, period, &params);
        let ssr = sum_of_squares(&innovations[start..]);
        if !ssr.is_finite() {
            return Err(AnalysisError::ComputationError(format!(
                "{} diverged: conditional sum of squares is not finite",
                order
            )));
        }

        let n = nobs_effective as f64;
        let sigma2 = ssr / n;
        if sigma2 <= 0.0 || !sigma2.is_finite() {
            return Err(AnalysisError::ComputationError(format!(
                "{} fits exactly: residual variance is zero",
                order
            )));
        }

        let log_likelihood = -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + sigma2.ln() + 1.0);
        let k = (theta.len() + 1) as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n.ln();

        let std_errors = standard_errors(&theta, sigma2, |t| {
            let params = Params::unpack(&order, trend, t);
            css_residuals(&w, period, &params).split_off(start)
        });
        let mut coefficients: Vec<Coefficient> = Params::names(&order, trend)
            .into_iter()
            .zip(theta.iter().zip(std_errors))
            .map(|(name, (&value, se))| Coefficient::new(name, value, se))
            .collect();
        coefficients.push(Coefficient::new(
            "sigma2".to_string(),
            sigma2,
            sigma2 * (2.0 / n).sqrt(),
        ));

        let offset = diff_poly.len() - 1;
        let mut fitted = vec![f64::NAN; values.len()];
        let mut residuals = vec![f64::NAN; values.len()];
        for t in start..w.len() {
            residuals[offset + t] = innovations[t];
            fitted[offset + t] = values[offset + t] - innovations[t];
        }

        self.state = Some(FitState {
            values: values.to_vec(),
            diff_poly,
            differenced: w,
            params,
            innovations,
            fitted,
            residuals,
            sigma2,
            log_likelihood,
            aic,
            bic,
            nobs_effective,
            coefficients,
            converged,
        });
        Ok(())
    }

    fn initial_guess(&self, w: &[f64]) -> Vec<f64> {
        let mut initial = Vec::with_capacity(self.num_params());
        // least-squares line through w against t = 1..=n
        let t: Vec<f64> = (1..=w.len()).map(|i| i as f64).collect();
        match (self.trend.has_constant(), self.trend.has_drift()) {
            (true, true) => {
                let (t_bar, w_bar) = (mean(&t), mean(w));
                let sxy: f64 = t.iter().zip(w).map(|(a, b)| (a - t_bar) * (b - w_bar)).sum();
                let sxx: f64 = t.iter().map(|a| (a - t_bar).powi(2)).sum();
                let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
                initial.push(w_bar - slope * t_bar);
                initial.push(slope);
            }
            (true, false) => initial.push(mean(w)),
            (false, true) => {
                let sxy: f64 = t.iter().zip(w).map(|(a, b)| a * b).sum();
                let sxx: f64 = t.iter().map(|a| a * a).sum();
                initial.push(if sxx > 0.0 { sxy / sxx } else { 0.0 });
            }
            (false, false) => {}
        }
        initial.extend((0..self.order.p).map(|i| 0.1 / (i + 1) as f64));
        initial.extend((0..self.order.q).map(|i| 0.1 / (i + 1) as f64));
        initial.extend((0..self.order.seasonal_p).map(|_| 0.1));
        initial.extend((0..self.order.seasonal_q).map(|_| 0.1));
        initial
    }

    fn bounds(&self) -> Option<Vec<(f64, f64)>> {
        if !self.enforce_bounds {
            return None;
        }
        let unbounded = (f64::NEG_INFINITY, f64::INFINITY);
        let bounded = (-COEFFICIENT_BOUND, COEFFICIENT_BOUND);
        let mut bounds = vec![unbounded; self.trend.num_params()];
        bounds.extend(std::iter::repeat(bounded).take(self.order.num_coefficients()));
        Some(bounds)
    }

    fn state(&self) -> Result<&FitState> {
        self.state.as_ref().ok_or(AnalysisError::FitRequired)
    }

    /// Forecast of the differenced series with zero future shocks.
    fn forecast_differenced(&self, state: &FitState, horizon: usize) -> Vec<f64> {
        let period = self.order.period;
        let ar = state.params.ar_poly(period);
        let ma = state.params.ma_poly(period);
        let m = state.differenced.len();

        let mut centered: Vec<f64> = state
            .differenced
            .iter()
            .enumerate()
            .map(|(t, v)| v - state.params.mean_at(t))
            .collect();
        let mut shocks = state.innovations.clone();

        for t in m..m + horizon {
            let autoregressive: f64 = ar
                .iter()
                .enumerate()
                .skip(1)
                .take_while(|(k, _)| *k <= t)
                .map(|(k, c)| c * centered[t - k])
                .sum();
            let moving_average: f64 = ma
                .iter()
                .enumerate()
                .skip(1)
                .take_while(|(k, _)| *k <= t)
                .map(|(k, c)| c * shocks[t - k])
                .sum();
            centered.push(moving_average - autoregressive);
            shocks.push(0.0);
        }

        centered[m..]
            .iter()
            .enumerate()
            .map(|(h, c)| c + state.params.mean_at(m + h))
            .collect()
    }
}

/// `sqrt(diag(σ² (JᵀJ)⁻¹))` with a central-difference Jacobian of the
/// residual vector. NaN when the information matrix is singular.
fn standard_errors<F>(theta: &[f64], sigma2: f64, residuals: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let k = theta.len();
    if k == 0 {
        return vec![];
    }

    let mut columns = Vec::with_capacity(k);
    for j in 0..k {
        let step = 1e-5 * theta[j].abs().max(1.0);
        let mut forward = theta.to_vec();
        let mut backward = theta.to_vec();
        forward[j] += step;
        backward[j] -= step;
        let column: Vec<f64> = residuals(&forward)
            .iter()
            .zip(residuals(&backward))
            .map(|(f, b)| (f - b) / (2.0 * step))
            .collect();
        columns.push(column);
    }

    let information: Vec<Vec<f64>> = (0..k)
        .map(|i| {
            (0..k)
                .map(|j| columns[i].iter().zip(&columns[j]).map(|(a, b)| a * b).sum())
                .collect()
        })
        .collect();

    match invert_symmetric(&information) {
        Some(inverse) => (0..k).map(|i| (sigma2 * inverse[i][i]).sqrt()).collect(),
        None => {
            debug!("information matrix is singular, standard errors unavailable");
            vec![f64::NAN; k]
        }
    }
}

impl Forecaster for Sarima {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.fit_values(series.values())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state()?;
        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let future_w = self.forecast_differenced(state, horizon);
        let predictions = poly::integrate(&state.diff_poly, &state.values, &future_w);
        Ok(Forecast::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "confidence level must be in (0, 1), got {}",
                level
            )));
        }

        let state = self.state()?;
        let forecast = self.predict(horizon)?;
        if horizon == 0 {
            return Ok(forecast);
        }

        let period = self.order.period;
        let full_ar = poly::multiply(&state.params.ar_poly(period), &state.diff_poly);
        let psi = poly::psi_weights(&full_ar, &state.params.ma_poly(period), horizon);
        let z = quantile_normal((1.0 + level) / 2.0);

        let mut cumulative = 0.0;
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (point, weight) in forecast.point().iter().zip(&psi) {
            cumulative += weight * weight;
            let half_width = z * (state.sigma2 * cumulative).sqrt();
            lower.push(point - half_width);
            upper.push(point + half_width);
        }

        Forecast::from_values_with_intervals(forecast.point().to_vec(), lower, upper, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.residuals.as_slice())
    }

    fn name(&self) -> &str {
        "SARIMA"
    }
}

impl fmt::Display for Sarima {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} trend={}", self.order, self.trend)?;
        let Some(state) = &self.state else {
            return write!(f, " (unfitted)");
        };

        writeln!(f)?;
        writeln!(
            f,
            "{:<12}{:>14}{:>14}{:>10}{:>10}",
            "", "coef", "std err", "z", "P>|z|"
        )?;
        for c in &state.coefficients {
            writeln!(
                f,
                "{:<12}{:>14.4}{:>14.4}{:>10.3}{:>10.3}",
                c.name, c.value, c.std_error, c.z, c.p_value
            )?;
        }
        writeln!(f, "Log likelihood {:.3}", state.log_likelihood)?;
        write!(f, "AIC {:.3}  BIC {:.3}", state.aic, state.bic)
    }
}
