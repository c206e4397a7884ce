//! Forecaster trait defining the common interface for fitted models.

use crate::core::{Forecast, TimeSeries};
use crate::error::Result;

/// Common interface for forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with confidence intervals at `level` (e.g. 0.95).
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        // Models without an error distribution return point predictions only
        let _ = level;
        self.predict(horizon)
    }

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster + Send>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use chrono::{TimeZone, Utc};

    /// Repeats the last observation.
    #[derive(Default)]
    struct LastValue {
        fitted: Option<Vec<f64>>,
        residuals: Option<Vec<f64>>,
    }

    impl Forecaster for LastValue {
        fn fit(&mut self, series: &TimeSeries) -> Result<()> {
            let values = series.values();
            if values.is_empty() {
                return Err(AnalysisError::EmptyData);
            }
            let mut fitted = vec![f64::NAN];
            fitted.extend_from_slice(&values[..values.len() - 1]);
            self.residuals = Some(values.iter().zip(&fitted).map(|(y, f)| y - f).collect());
            self.fitted = Some(fitted);
            Ok(())
        }

        fn predict(&self, horizon: usize) -> Result<Forecast> {
            let fitted = self.fitted.as_ref().ok_or(AnalysisError::FitRequired)?;
            let residuals = self.residuals.as_ref().ok_or(AnalysisError::FitRequired)?;
            let last = fitted[fitted.len() - 1] + residuals[residuals.len() - 1];
            Ok(Forecast::from_values(vec![last; horizon]))
        }

        fn fitted_values(&self) -> Option<&[f64]> {
            self.fitted.as_deref()
        }

        fn residuals(&self) -> Option<&[f64]> {
            self.residuals.as_deref()
        }

        fn name(&self) -> &str {
            "LastValue"
        }
    }

    fn make_series() -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        TimeSeries::monthly(start, vec![100.0, 101.0, 103.0, 104.0]).unwrap()
    }

    #[test]
    fn boxed_forecaster_fit_predict() {
        let mut model: BoxedForecaster = Box::new(LastValue::default());
        assert!(!model.is_fitted());
        assert!(matches!(model.predict(3), Err(AnalysisError::FitRequired)));

        model.fit(&make_series()).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.predict(3).unwrap().point(), &[104.0, 104.0, 104.0]);
    }

    #[test]
    fn default_intervals_are_point_only() {
        let mut model = LastValue::default();
        model.fit(&make_series()).unwrap();

        let forecast = model.predict_with_intervals(2, 0.95).unwrap();
        assert_eq!(forecast.horizon(), 2);
        assert!(!forecast.has_intervals());
    }
}
