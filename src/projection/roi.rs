//! Return on an investment spread over properties at the current price.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::TimeSeries;
use crate::error::{AnalysisError, Result};
use crate::projection::growth::GrowthProjection;

/// Dollar return of buying as many properties as an investment affords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiProjection {
    pub investment: f64,
    pub current_price: f64,
    pub properties_affordable: u64,
    pub growth: GrowthProjection,
    pub upper_return: f64,
    pub mean_return: f64,
    pub lower_return: f64,
}

impl RoiProjection {
    /// # Example
    ///
    /// ```
    /// use realty_forecast::projection::{GrowthProjection, RoiProjection};
    ///
    /// let growth = GrowthProjection { upper: 0.3, mean: 0.21, lower: 0.1 };
    /// let roi = RoiProjection::new(growth, 1_000_000.0, 100_000.0).unwrap();
    /// assert_eq!(roi.properties_affordable, 10);
    /// assert!((roi.mean_return - 210_000.0).abs() < 1e-6);
    /// ```
    pub fn new(growth: GrowthProjection, investment: f64, current_price: f64) -> Result<Self> {
        if !(current_price.is_finite() && current_price > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "current price must be positive, got {}",
                current_price
            )));
        }
        if !(investment.is_finite() && investment >= 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "investment must be finite and non-negative, got {}",
                investment
            )));
        }

        let properties = (investment / current_price).floor();
        let path_return = |rate: f64| current_price * rate * properties;

        Ok(Self {
            investment,
            current_price,
            properties_affordable: properties as u64,
            growth,
            upper_return: path_return(growth.upper),
            mean_return: path_return(growth.mean),
            lower_return: path_return(growth.lower),
        })
    }

    /// Use the last observed value of `series` as the current price.
    pub fn from_series(growth: GrowthProjection, investment: f64, series: &TimeSeries) -> Result<Self> {
        let (_, price) = series.last_observed().ok_or(AnalysisError::EmptyData)?;
        Self::new(growth, investment, price)
    }

    /// Mean return per property, or `None` when nothing is affordable.
    pub fn mean_return_per_property(&self) -> Option<f64> {
        (self.properties_affordable > 0).then(|| self.mean_return / self.properties_affordable as f64)
    }
}

impl fmt::Display for RoiProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "An initial investment of ${:.2} would:", self.investment)?;
        writeln!(
            f,
            "\tbuy approximately {} properties at ${:.2}",
            self.properties_affordable, self.current_price
        )?;
        write!(
            f,
            "\tnet ${:.2} at a mean growth of {:.1}%",
            self.mean_return,
            self.growth.mean * 100.0
        )?;
        if let Some(per_property) = self.mean_return_per_property() {
            write!(f, " (${:.2} per property)", per_property)?;
        }
        writeln!(f)?;
        write!(
            f,
            "\tor between ${:.2} and ${:.2} at growth rates of {:.1}% and {:.1}%",
            self.lower_return,
            self.upper_return,
            self.growth.lower * 100.0,
            self.growth.upper * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn growth() -> GrowthProjection {
        GrowthProjection {
            upper: 0.3,
            mean: 0.21,
            lower: -0.05,
        }
    }

    #[test]
    fn returns_per_path() {
        let roi = RoiProjection::new(growth(), 1_000_000.0, 100_000.0).unwrap();

        assert_eq!(roi.properties_affordable, 10);
        assert_relative_eq!(roi.mean_return, 210_000.0, epsilon = 1e-6);
        assert_relative_eq!(roi.upper_return, 300_000.0, epsilon = 1e-6);
        assert_relative_eq!(roi.lower_return, -50_000.0, epsilon = 1e-6);
        assert_relative_eq!(roi.mean_return_per_property().unwrap(), 21_000.0, epsilon = 1e-6);
    }

    #[test]
    fn partial_property_is_floored() {
        let roi = RoiProjection::new(growth(), 250_000.0, 100_000.0).unwrap();
        assert_eq!(roi.properties_affordable, 2);

        let none = RoiProjection::new(growth(), 50_000.0, 100_000.0).unwrap();
        assert_eq!(none.properties_affordable, 0);
        assert_relative_eq!(none.mean_return, 0.0);
        assert!(none.mean_return_per_property().is_none());
    }

    #[test]
    fn rejects_invalid_inputs() {
        assert!(RoiProjection::new(growth(), 1e6, 0.0).is_err());
        assert!(RoiProjection::new(growth(), 1e6, -5.0).is_err());
        assert!(RoiProjection::new(growth(), -1.0, 100.0).is_err());
        assert!(RoiProjection::new(growth(), f64::NAN, 100.0).is_err());
    }

    #[test]
    fn current_price_from_last_observation() {
        let start = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        let series =
            TimeSeries::monthly(start, vec![180_000.0, 190_000.0, 200_000.0, f64::NAN]).unwrap();

        let roi = RoiProjection::from_series(growth(), 1_000_000.0, &series).unwrap();
        assert_relative_eq!(roi.current_price, 200_000.0);
        assert_eq!(roi.properties_affordable, 5);
    }

    #[test]
    fn display_summary() {
        let roi = RoiProjection::new(growth(), 1_000_000.0, 100_000.0).unwrap();
        let text = roi.to_string();
        assert!(text.contains("10 properties"));
        assert!(text.contains("$210000.00"));
        assert!(text.contains("$21000.00 per property"));
    }
}
