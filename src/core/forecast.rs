//! Forecast result structure for holding predictions.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Bounds of a confidence interval around the point path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Confidence level, e.g. 0.95.
    pub level: f64,
    /// Lower bound per step.
    pub lower: Vec<f64>,
    /// Upper bound per step.
    pub upper: Vec<f64>,
}

/// A forecast containing the predicted mean path and an optional interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    point: Vec<f64>,
    interval: Option<Interval>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            interval: None,
        }
    }

    /// Create a forecast with a confidence interval.
    pub fn from_values_with_intervals(
        values: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
        level: f64,
    ) -> Result<Self> {
        for bound in [&lower, &upper] {
            if bound.len() != values.len() {
                return Err(AnalysisError::DimensionMismatch {
                    expected: values.len(),
                    got: bound.len(),
                });
            }
        }

        Ok(Self {
            point: values,
            interval: Some(Interval {
                level,
                lower,
                upper,
            }),
        })
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Predicted mean path.
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn has_intervals(&self) -> bool {
        self.interval.is_some()
    }

    pub fn interval(&self) -> Option<&Interval> {
        self.interval.as_ref()
    }

    /// Lower bound path.
    pub fn lower(&self) -> Result<&[f64]> {
        self.interval
            .as_ref()
            .map(|i| i.lower.as_slice())
            .ok_or_else(|| {
                AnalysisError::InvalidParameter("forecast has no confidence interval".to_string())
            })
    }

    /// Upper bound path.
    pub fn upper(&self) -> Result<&[f64]> {
        self.interval
            .as_ref()
            .map(|i| i.upper.as_slice())
            .ok_or_else(|| {
                AnalysisError::InvalidParameter("forecast has no confidence interval".to_string())
            })
    }

    /// Confidence level of the interval, if any.
    pub fn level(&self) -> Option<f64> {
        self.interval.as_ref().map(|i| i.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_only_forecast() {
        let forecast = Forecast::from_values(vec![1.0, 2.0, 3.0]);
        assert_eq!(forecast.horizon(), 3);
        assert!(!forecast.has_intervals());
        assert!(forecast.lower().is_err());
        assert!(forecast.level().is_none());
    }

    #[test]
    fn forecast_with_intervals() {
        let forecast = Forecast::from_values_with_intervals(
            vec![10.0, 11.0],
            vec![9.0, 9.5],
            vec![11.0, 12.5],
            0.95,
        )
        .unwrap();

        assert!(forecast.has_intervals());
        assert_eq!(forecast.lower().unwrap(), &[9.0, 9.5]);
        assert_eq!(forecast.upper().unwrap(), &[11.0, 12.5]);
        assert_eq!(forecast.level(), Some(0.95));
    }

    #[test]
    fn interval_lengths_must_match() {
        let err =
            Forecast::from_values_with_intervals(vec![1.0, 2.0], vec![0.0], vec![3.0, 4.0], 0.9)
                .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DimensionMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn empty_forecast() {
        let forecast = Forecast::new();
        assert!(forecast.is_empty());
        assert_eq!(forecast.horizon(), 0);
    }
}
