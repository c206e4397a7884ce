//! Projected growth along a forecast and its confidence bounds.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::Forecast;
use crate::error::{AnalysisError, Result};
use crate::models::Forecaster;

/// Fractional change between the first and last value of a path.
///
/// # Example
///
/// ```
/// use realty_forecast::projection::growth_rate;
///
/// let rate = growth_rate(&[100.0, 110.0, 121.0]).unwrap();
/// assert!((rate - 0.21).abs() < 1e-12);
/// ```
pub fn growth_rate(path: &[f64]) -> Result<f64> {
    let (first, last) = match (path.first(), path.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(AnalysisError::EmptyData),
    };
    if first == 0.0 {
        return Err(AnalysisError::ComputationError(
            "growth rate undefined for a path starting at zero".to_string(),
        ));
    }
    Ok((last - first) / first)
}

/// Forecast settings used by [`expected_growth`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Steps ahead to forecast.
    pub horizon: usize,
    /// Significance level; the interval has confidence `1 - alpha`.
    pub alpha: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 36,
            alpha: 0.05,
        }
    }
}

impl ForecastConfig {
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(AnalysisError::InvalidParameter(
                "horizon must be positive".to_string(),
            ));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Growth along the upper bound, the mean and the lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthProjection {
    pub upper: f64,
    pub mean: f64,
    pub lower: f64,
}

impl GrowthProjection {
    /// Growth of each path of a forecast carrying an interval.
    pub fn from_forecast(forecast: &Forecast) -> Result<Self> {
        Ok(Self {
            upper: growth_rate(forecast.upper()?)?,
            mean: growth_rate(forecast.point())?,
            lower: growth_rate(forecast.lower()?)?,
        })
    }
}

/// A forecast together with its growth projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthEstimate {
    pub forecast: Forecast,
    pub projection: GrowthProjection,
    /// Significance level the interval was built with.
    pub alpha: f64,
}

impl GrowthEstimate {
    pub fn horizon(&self) -> usize {
        self.forecast.horizon()
    }

    /// Distance between the highest and lowest final forecast value.
    pub fn spread(&self) -> f64 {
        let finals = [
            self.forecast.upper().ok().and_then(|u| u.last().copied()),
            self.forecast.point().last().copied(),
            self.forecast.lower().ok().and_then(|l| l.last().copied()),
        ];
        let (lo, hi) = finals
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if hi >= lo {
            hi - lo
        } else {
            0.0
        }
    }

    /// Human-readable summary for the area `name`.
    pub fn describe<'a>(&'a self, name: &'a str) -> GrowthDescription<'a> {
        GrowthDescription {
            estimate: self,
            name,
        }
    }
}

/// [`GrowthEstimate`] rendered for a named area.
#[derive(Debug, Clone, Copy)]
pub struct GrowthDescription<'a> {
    estimate: &'a GrowthEstimate,
    name: &'a str,
}

impl fmt::Display for GrowthDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let estimate = self.estimate;
        let projection = &estimate.projection;
        writeln!(
            f,
            "With a {}% confidence interval {} is forecast to grow at the following rates after {} months:",
            ((1.0 - estimate.alpha) * 100.0).round(),
            self.name,
            estimate.horizon()
        )?;
        writeln!(f, "\tUpper rate: {:.1}%", projection.upper * 100.0)?;
        writeln!(f, "\tMean rate: {:.1}%", projection.mean * 100.0)?;
        writeln!(f, "\tLower rate: {:.1}%", projection.lower * 100.0)?;
        write!(
            f,
            "Range of ${:.2} between the highest and lowest projected values.",
            estimate.spread()
        )
    }
}

/// Forecast `horizon` steps with `1 - alpha` confidence and measure growth.
pub fn expected_growth(model: &dyn Forecaster, horizon: usize, alpha: f64) -> Result<GrowthEstimate> {
    ForecastConfig { horizon, alpha }.validate()?;

    let forecast = model.predict_with_intervals(horizon, 1.0 - alpha)?;
    let projection = GrowthProjection::from_forecast(&forecast)?;
    debug!(
        model = model.name(),
        horizon,
        upper = projection.upper,
        mean = projection.mean,
        lower = projection.lower,
        "expected growth"
    );

    Ok(GrowthEstimate {
        forecast,
        projection,
        alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeSeries;
    use approx::assert_relative_eq;

    /// Straight line with a fixed-width band.
    struct Line {
        slope: f64,
        width: f64,
        fitted: Option<Vec<f64>>,
    }

    impl Line {
        fn new(slope: f64, width: f64) -> Self {
            Self {
                slope,
                width,
                fitted: None,
            }
        }
    }

    impl Forecaster for Line {
        fn fit(&mut self, series: &TimeSeries) -> Result<()> {
            self.fitted = Some(series.values().to_vec());
            Ok(())
        }

        fn predict(&self, horizon: usize) -> Result<Forecast> {
            let last = self
                .fitted
                .as_ref()
                .and_then(|f| f.last().copied())
                .ok_or(AnalysisError::FitRequired)?;
            Ok(Forecast::from_values(
                (1..=horizon).map(|h| last + self.slope * h as f64).collect(),
            ))
        }

        fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
            let point = self.predict(horizon)?.point().to_vec();
            let lower = point.iter().map(|v| v - self.width).collect();
            let upper = point.iter().map(|v| v + self.width).collect();
            Forecast::from_values_with_intervals(point, lower, upper, level)
        }

        fn fitted_values(&self) -> Option<&[f64]> {
            self.fitted.as_deref()
        }

        fn residuals(&self) -> Option<&[f64]> {
            None
        }

        fn name(&self) -> &str {
            "Line"
        }
    }

    fn fitted_line(slope: f64, width: f64) -> Line {
        use chrono::{TimeZone, Utc};
        let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let series = TimeSeries::monthly(start, vec![90.0, 95.0, 100.0]).unwrap();
        let mut model = Line::new(slope, width);
        model.fit(&series).unwrap();
        model
    }

    #[test]
    fn growth_rate_of_path() {
        assert_relative_eq!(growth_rate(&[100.0, 110.0, 121.0]).unwrap(), 0.21, epsilon = 1e-12);
        assert_relative_eq!(growth_rate(&[50.0]).unwrap(), 0.0);
        assert!(matches!(growth_rate(&[]), Err(AnalysisError::EmptyData)));
        assert!(growth_rate(&[0.0, 1.0]).is_err());
    }

    #[test]
    fn expected_growth_on_each_path() {
        let model = fitted_line(10.0, 5.0);
        let estimate = expected_growth(&model, 3, 0.05).unwrap();

        // mean 110, 120, 130; upper 115..135; lower 105..125
        assert_relative_eq!(estimate.projection.mean, 20.0 / 110.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.projection.upper, 20.0 / 115.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.projection.lower, 20.0 / 105.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.spread(), 10.0, epsilon = 1e-12);
        assert_eq!(estimate.forecast.level(), Some(0.95));
    }

    #[test]
    fn expected_growth_validates_arguments() {
        let model = fitted_line(1.0, 1.0);
        assert!(expected_growth(&model, 0, 0.05).is_err());
        assert!(expected_growth(&model, 12, 0.0).is_err());
        assert!(expected_growth(&model, 12, 1.0).is_err());
    }

    #[test]
    fn expected_growth_requires_fit() {
        let model = Line::new(1.0, 1.0);
        assert!(matches!(
            expected_growth(&model, 12, 0.05),
            Err(AnalysisError::FitRequired)
        ));
    }

    #[test]
    fn describe_mentions_rates() {
        let estimate = expected_growth(&fitted_line(10.0, 5.0), 3, 0.05).unwrap();
        let text = estimate.describe("Austin").to_string();
        assert!(text.starts_with("With a 95% confidence interval Austin"));
        assert!(text.contains("Mean rate: 18.2%"));
        assert!(text.contains("$10.00"));
    }

    #[test]
    fn default_config() {
        let config = ForecastConfig::default();
        assert_eq!(config.horizon, 36);
        assert_relative_eq!(config.alpha, 0.05);
        assert!(config.validate().is_ok());
        assert!(config.with_alpha(1.5).validate().is_err());
    }
}
