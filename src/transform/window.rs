//! Rolling and exponentially weighted window functions.
//!
//! Missing values propagate: a trailing window that contains a NaN yields
//! NaN, while exponentially weighted means skip missing observations.

use crate::core::is_missing;
use crate::error::{AnalysisError, Result};

/// Trailing rolling mean; the first `window - 1` entries are NaN.
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(series, window, |s| s.iter().sum::<f64>() / s.len() as f64)
}

/// Trailing rolling sample standard deviation.
pub fn rolling_std(series: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return vec![f64::NAN; series.len()];
    }

    rolling_apply(series, window, |s| {
        let mean = s.iter().sum::<f64>() / s.len() as f64;
        let var = s.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (s.len() - 1) as f64;
        var.sqrt()
    })
}

fn rolling_apply<F>(series: &[f64], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 || series.len() < window {
        return vec![f64::NAN; series.len()];
    }

    let mut result = vec![f64::NAN; window - 1];
    result.extend(series.windows(window).map(&f));
    result
}

/// Smoothing factor for an exponentially weighted mean with the given half-life.
///
/// `alpha = 1 - exp(-ln(2) / half_life)`
pub fn halflife_alpha(half_life: f64) -> Result<f64> {
    if half_life <= 0.0 || !half_life.is_finite() {
        return Err(AnalysisError::InvalidParameter(format!(
            "half-life must be positive, got {}",
            half_life
        )));
    }
    Ok(1.0 - (-std::f64::consts::LN_2 / half_life).exp())
}

/// Compute exponentially weighted moving average (EWMA).
///
/// Uses bias-adjusted weights: the value at `t` is
/// `Σ (1-α)^i x_{t-i} / Σ (1-α)^i` over the observed `x_{t-i}`. Missing
/// observations contribute no weight but still age the older ones.
/// Entries before the first observation are NaN.
///
/// # Arguments
/// * `series` - Input time series
/// * `alpha` - Smoothing factor (0 < alpha <= 1)
pub fn ewm_mean(series: &[f64], alpha: f64) -> Vec<f64> {
    let alpha = alpha.clamp(0.0, 1.0);
    let decay = 1.0 - alpha;

    let mut numerator = 0.0;
    let mut denominator = 0.0;

    series
        .iter()
        .map(|&x| {
            numerator *= decay;
            denominator *= decay;
            if !is_missing(x) {
                numerator += x;
                denominator += 1.0;
            }
            if denominator > 0.0 {
                numerator / denominator
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Subtract the trailing rolling mean from a series.
///
/// The result has the same length as the input; the first `window - 1`
/// entries are NaN.
pub fn subtract_rolling_mean(series: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(AnalysisError::InvalidParameter(
            "window must be positive".to_string(),
        ));
    }

    let trend = rolling_mean(series, window);
    Ok(series.iter().zip(trend).map(|(x, m)| x - m).collect())
}

/// Subtract the exponentially weighted mean with the given half-life.
pub fn subtract_ewm_mean(series: &[f64], half_life: f64) -> Result<Vec<f64>> {
    let alpha = halflife_alpha(half_life)?;
    let trend = ewm_mean(series, alpha);
    Ok(series.iter().zip(trend).map(|(x, m)| x - m).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rolling_mean_trailing() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = rolling_mean(&series, 3);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_relative_eq!(result[2], 2.0, epsilon = 1e-10);
        assert_relative_eq!(result[3], 3.0, epsilon = 1e-10);
        assert_relative_eq!(result[4], 4.0, epsilon = 1e-10);
    }

    #[test]
    fn rolling_mean_window_with_missing_is_missing() {
        let series = vec![1.0, f64::NAN, 3.0, 4.0, 5.0];
        let result = rolling_mean(&series, 2);

        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_relative_eq!(result[3], 3.5, epsilon = 1e-10);
    }

    #[test]
    fn rolling_std_matches_sample_std() {
        let series = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_std(&series, 8);
        assert!(result[..7].iter().all(|v| v.is_nan()));
        assert_relative_eq!(result[7], (32.0_f64 / 7.0).sqrt(), epsilon = 1e-10);
        assert!(rolling_std(&series, 1).iter().all(|v| v.is_nan()));
        assert!(rolling_std(&series[..3], 4).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_zero_window() {
        let result = rolling_mean(&[1.0, 2.0], 0);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn halflife_alpha_known_values() {
        // half-life 1 halves the weight each step
        assert_relative_eq!(halflife_alpha(1.0).unwrap(), 0.5, epsilon = 1e-12);
        assert!(halflife_alpha(0.0).is_err());
        assert!(halflife_alpha(-2.0).is_err());
        assert!(halflife_alpha(f64::NAN).is_err());
    }

    #[test]
    fn ewm_mean_adjusted_weights() {
        let series = vec![1.0, 2.0, 3.0];
        let result = ewm_mean(&series, 0.5);

        assert_relative_eq!(result[0], 1.0, epsilon = 1e-12);
        // (2 + 0.5*1) / 1.5
        assert_relative_eq!(result[1], 2.5 / 1.5, epsilon = 1e-12);
        // (3 + 0.5*2 + 0.25*1) / 1.75
        assert_relative_eq!(result[2], 4.25 / 1.75, epsilon = 1e-12);
    }

    #[test]
    fn ewm_mean_skips_missing() {
        let series = vec![f64::NAN, 1.0, f64::NAN, 3.0];
        let result = ewm_mean(&series, 0.5);

        assert!(result[0].is_nan());
        assert_relative_eq!(result[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(result[2], 1.0, epsilon = 1e-12);
        // (3 + 0.25*1) / (1 + 0.25)
        assert_relative_eq!(result[3], 3.25 / 1.25, epsilon = 1e-12);
    }

    #[test]
    fn ewm_mean_empty() {
        assert!(ewm_mean(&[], 0.3).is_empty());
    }

    #[test]
    fn subtract_rolling_mean_keeps_length() {
        let series: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let result = subtract_rolling_mean(&series, 4).unwrap();

        assert_eq!(result.len(), series.len());
        assert!(result[..3].iter().all(|v| v.is_nan()));
        // linear trend minus trailing mean of 4 = 1.5 everywhere
        for v in &result[3..] {
            assert_relative_eq!(*v, 1.5, epsilon = 1e-10);
        }
    }

    #[test]
    fn subtract_rolling_mean_rejects_zero_window() {
        assert!(matches!(
            subtract_rolling_mean(&[1.0, 2.0], 0),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }

    #[test]
    fn subtract_ewm_mean_starts_at_zero() {
        let series = vec![10.0, 12.0, 11.0, 15.0];
        let result = subtract_ewm_mean(&series, 2.0).unwrap();

        assert_eq!(result.len(), 4);
        assert_relative_eq!(result[0], 0.0, epsilon = 1e-12);
        assert!(result[1] > 0.0);
    }
}
