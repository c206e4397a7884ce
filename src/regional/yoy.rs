//! Year-over-year change and its rate of change.

use serde::{Deserialize, Serialize};

use crate::core::{is_missing, TimeSeries};
use crate::regional::panel::RegionPanel;
use crate::transform::{difference, pct_change};

/// Periods in one year of monthly data.
pub const YEAR: usize = 12;

/// Periods over which the YoY change is differenced.
pub const RATE_LAG: usize = 3;

/// A series with its year-over-year columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoyAugmented {
    pub series: TimeSeries,
    /// 12-period fractional change; leading entries are NaN.
    pub yoy_change: Vec<f64>,
    /// 3-period difference of `yoy_change`.
    pub yoy_rate_change: Vec<f64>,
}

impl YoyAugmented {
    pub fn from_series(series: &TimeSeries) -> Self {
        let yoy_change = pct_change(series.values(), YEAR);
        let yoy_rate_change = difference(&yoy_change, RATE_LAG);
        Self {
            series: series.clone(),
            yoy_change,
            yoy_rate_change,
        }
    }

    /// Mean of the non-missing YoY changes.
    pub fn mean_yoy_change(&self) -> Option<f64> {
        let observed: Vec<f64> = self
            .yoy_change
            .iter()
            .copied()
            .filter(|v| !is_missing(*v))
            .collect();
        (!observed.is_empty()).then(|| observed.iter().sum::<f64>() / observed.len() as f64)
    }
}

impl RegionPanel {
    /// Every region with its YoY columns.
    pub fn with_yoy(&self) -> Vec<(String, YoyAugmented)> {
        self.iter()
            .map(|(name, series)| (name.to_string(), YoyAugmented::from_series(series)))
            .collect()
    }

    /// Mean YoY change per region, ascending. Regions with no YoY value are left out.
    pub fn average_yoy_change(&self) -> Vec<(String, f64)> {
        let mut averages: Vec<(String, f64)> = self
            .iter()
            .filter_map(|(name, series)| {
                YoyAugmented::from_series(series)
                    .mean_yoy_change()
                    .map(|avg| (name.to_string(), avg))
            })
            .collect();
        averages.sort_by(|a, b| a.1.total_cmp(&b.1));
        averages
    }
}
