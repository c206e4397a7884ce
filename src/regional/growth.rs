//! Period growth rates per region and top-growth selection.

use std::collections::BTreeSet;

use chrono::Months;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{is_missing, TimeSeries};
use crate::error::{AnalysisError, Result};
use crate::regional::panel::RegionPanel;

/// Growth since the first observation and over the last 5, 3 and 1 years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthRates {
    pub total: f64,
    pub five_year: f64,
    pub three_year: f64,
    pub one_year: f64,
}

impl GrowthRates {
    /// Growth ending at the last observation.
    ///
    /// Period bases are the values 60, 36 and 12 calendar months before
    /// the last observation, which must exist and be non-missing.
    pub fn from_series(series: &TimeSeries) -> Result<Self> {
        let (last_ts, last) = series.last_observed().ok_or(AnalysisError::EmptyData)?;
        let first = series
            .values()
            .iter()
            .copied()
            .find(|v| !is_missing(*v))
            .ok_or(AnalysisError::EmptyData)?;

        let back = |months: u32| -> Result<f64> {
            let ts = last_ts
                .checked_sub_months(Months::new(months))
                .ok_or_else(|| AnalysisError::TimestampError("date out of range".to_string()))?;
            let base = series.value_at(&ts).ok_or_else(|| {
                AnalysisError::TimestampError(format!("no observation at {}", ts.format("%Y-%m")))
            })?;
            rate(base, last)
        };

        Ok(Self {
            total: rate(first, last)?,
            five_year: back(60)?,
            three_year: back(36)?,
            one_year: back(12)?,
        })
    }

    /// Rates in period order: total, 5, 3 and 1 years.
    pub fn periods(&self) -> [f64; 4] {
        [self.total, self.five_year, self.three_year, self.one_year]
    }
}

fn rate(base: f64, last: f64) -> Result<f64> {
    if base == 0.0 {
        return Err(AnalysisError::ComputationError(
            "growth base value is zero".to_string(),
        ));
    }
    Ok((last - base) / base)
}

/// One row of [`RegionPanel::growth_table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGrowth {
    pub region: String,
    pub rates: GrowthRates,
}

impl RegionPanel {
    /// Growth rates of every region with enough history.
    pub fn growth_table(&self) -> Vec<RegionGrowth> {
        self.iter()
            .filter_map(|(region, series)| match GrowthRates::from_series(series) {
                Ok(rates) => Some(RegionGrowth {
                    region: region.to_string(),
                    rates,
                }),
                Err(err) => {
                    warn!(region, error = %err, "skipping region without growth history");
                    None
                }
            })
            .collect()
    }
}

/// Union of the top `n` regions by each growth period.
pub fn top_growth_regions(table: &[RegionGrowth], n: usize) -> BTreeSet<String> {
    let mut selected = BTreeSet::new();
    for period in 0..4 {
        let mut rows: Vec<&RegionGrowth> = table.iter().collect();
        rows.sort_by(|a, b| b.rates.periods()[period].total_cmp(&a.rates.periods()[period]));
        selected.extend(rows.into_iter().take(n).map(|row| row.region.clone()));
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn linear(months: usize, start_value: f64, step: f64) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2009, 1, 1, 0, 0, 0).unwrap();
        let values = (0..months).map(|i| start_value + step * i as f64).collect();
        TimeSeries::monthly(start, values).unwrap()
    }

    #[test]
    fn period_rates() {
        // 2009-01 .. 2018-04
        let series = linear(112, 100.0, 1.0);
        let rates = GrowthRates::from_series(&series).unwrap();

        assert_relative_eq!(rates.total, 111.0 / 100.0, epsilon = 1e-12);
        assert_relative_eq!(rates.five_year, 60.0 / 151.0, epsilon = 1e-12);
        assert_relative_eq!(rates.three_year, 36.0 / 175.0, epsilon = 1e-12);
        assert_relative_eq!(rates.one_year, 12.0 / 199.0, epsilon = 1e-12);
    }

    #[test]
    fn short_history_is_an_error() {
        let series = linear(40, 100.0, 1.0);
        assert!(matches!(
            GrowthRates::from_series(&series),
            Err(AnalysisError::TimestampError(_))
        ));
    }

    #[test]
    fn growth_table_skips_short_regions() {
        let mut panel = RegionPanel::new();
        panel.insert("long", linear(72, 100.0, 1.0));
        panel.insert("short", linear(24, 100.0, 1.0));

        let table = panel.growth_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].region, "long");
    }

    #[test]
    fn top_regions_union() {
        let row = |region: &str, total: f64, one_year: f64| RegionGrowth {
            region: region.to_string(),
            rates: GrowthRates {
                total,
                five_year: total,
                three_year: total,
                one_year,
            },
        };
        let table = vec![
            row("a", 0.9, 0.01),
            row("b", 0.5, 0.02),
            row("c", 0.1, 0.30),
        ];

        let top = top_growth_regions(&table, 1);
        assert_eq!(top.into_iter().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(top_growth_regions(&table, 5).len(), 3);
        assert!(top_growth_regions(&table, 0).is_empty());
    }
}
