//! Brute-force SARIMA order selection by minimum AIC.
//!
//! Every `(p, d, q)` in `[0, N)^3` is crossed with every `(P, D, Q)` in
//! `[0, N)^3` at a fixed seasonal period. Orders that fail to fit are
//! recorded with the reason instead of aborting the search.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::TimeSeries;
use crate::error::{AnalysisError, Result};
use crate::models::sarima::model::Sarima;
use crate::models::sarima::order::{SarimaOrder, Trend};
use crate::models::Forecaster;

/// Configuration for [`SarimaGridSearch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchConfig {
    /// Exclusive upper bound N of every order component.
    pub order_bound: usize,
    /// Seasonal period s.
    pub seasonal_period: usize,
    /// Trend term of every candidate.
    pub trend: Trend,
    /// Clamp AR/MA coefficients during fitting.
    pub enforce_bounds: bool,
    /// Fit candidates on the rayon thread pool.
    pub parallel: bool,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        Self {
            order_bound: 2,
            seasonal_period: 12,
            trend: Trend::None,
            enforce_bounds: false,
            parallel: false,
        }
    }
}

impl GridSearchConfig {
    pub fn with_order_bound(mut self, bound: usize) -> Self {
        self.order_bound = bound;
        self
    }

    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = trend;
        self
    }

    pub fn with_bounds(mut self, enforce: bool) -> Self {
        self.enforce_bounds = enforce;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Result of fitting one candidate order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitOutcome {
    /// The fit succeeded with this AIC.
    Fitted { aic: f64 },
    /// The fit failed; the search continued.
    Skipped { reason: String },
}

impl FitOutcome {
    pub fn aic(&self) -> Option<f64> {
        match self {
            FitOutcome::Fitted { aic } => Some(*aic),
            FitOutcome::Skipped { .. } => None,
        }
    }
}

/// One enumerated order and what happened when it was fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAttempt {
    pub order: SarimaOrder,
    pub outcome: FitOutcome,
}

/// All attempts of a search plus the selected order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchOutcome {
    /// Attempts in enumeration order.
    pub attempts: Vec<GridAttempt>,
    /// Order with the lowest AIC.
    pub best_order: SarimaOrder,
    /// AIC of `best_order`.
    pub best_aic: f64,
}

impl GridSearchOutcome {
    /// Number of orders tried.
    pub fn attempted(&self) -> usize {
        self.attempts.len()
    }

    /// Attempts that fitted.
    pub fn fitted(&self) -> impl Iterator<Item = (&SarimaOrder, f64)> {
        self.attempts
            .iter()
            .filter_map(|a| a.outcome.aic().map(|aic| (&a.order, aic)))
    }

    /// Attempts that failed to fit.
    pub fn skipped(&self) -> impl Iterator<Item = &GridAttempt> {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, FitOutcome::Skipped { .. }))
    }
}

/// Lowest-AIC attempt; the first in `attempts` wins a tie.
pub fn select_best(attempts: &[GridAttempt]) -> Option<(SarimaOrder, f64)> {
    let mut best: Option<(SarimaOrder, f64)> = None;
    for attempt in attempts {
        if let Some(aic) = attempt.outcome.aic() {
            if best.map_or(true, |(_, b)| aic < b) {
                best = Some((attempt.order, aic));
            }
        }
    }
    best
}

/// Exhaustive SARIMA order search.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use realty_forecast::core::TimeSeries;
/// use realty_forecast::models::{GridSearchConfig, SarimaGridSearch};
///
/// let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
/// let values: Vec<f64> = (0..48).map(|i| 100.0 + i as f64 + (i as f64).sin()).collect();
/// let series = TimeSeries::monthly(start, values).unwrap();
///
/// let search = SarimaGridSearch::new(GridSearchConfig::default().with_order_bound(1)).unwrap();
/// let outcome = search.run(&series).unwrap();
/// assert_eq!(outcome.attempted(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SarimaGridSearch {
    config: GridSearchConfig,
}

impl SarimaGridSearch {
    /// Create a search, validating the configuration.
    pub fn new(config: GridSearchConfig) -> Result<Self> {
        if config.order_bound == 0 {
            return Err(AnalysisError::InvalidParameter(
                "order bound must be positive".to_string(),
            ));
        }
        if config.order_bound > 1 && config.seasonal_period < 2 {
            return Err(AnalysisError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                config.seasonal_period
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &GridSearchConfig {
        &self.config
    }

    /// Candidate orders in lexicographic `(p, d, q)` then `(P, D, Q)` order.
    pub fn orders(&self) -> Vec<SarimaOrder> {
        let n = self.config.order_bound;
        let triples: Vec<(usize, usize, usize)> = (0..n)
            .flat_map(|a| (0..n).flat_map(move |b| (0..n).map(move |c| (a, b, c))))
            .collect();

        triples
            .iter()
            .flat_map(|&(p, d, q)| {
                triples.iter().map(move |&(sp, sd, sq)| {
                    SarimaOrder::new(p, d, q).with_seasonal(sp, sd, sq, self.config.seasonal_period)
                })
            })
            .collect()
    }

    /// Fit every order as a [`Sarima`] and select the lowest AIC.
    pub fn run(&self, series: &TimeSeries) -> Result<GridSearchOutcome> {
        let trend = self.config.trend;
        let enforce_bounds = self.config.enforce_bounds;
        self.run_with(series, |order, series| {
            let mut model = Sarima::new(order)
                .with_trend(trend)
                .with_bounds(enforce_bounds);
            model.fit(series)?;
            model
                .aic()
                .ok_or_else(|| AnalysisError::ComputationError("fit produced no AIC".to_string()))
        })
    }

    /// Run the grid with a custom fitting function returning the AIC.
    ///
    /// A non-finite AIC counts as a failed fit.
    pub fn run_with<F>(&self, series: &TimeSeries, fitter: F) -> Result<GridSearchOutcome>
    where
        F: Fn(SarimaOrder, &TimeSeries) -> Result<f64> + Sync,
    {
        if series.is_empty() {
            return Err(AnalysisError::EmptyData);
        }
        if series.has_missing_values() {
            return Err(AnalysisError::MissingValues);
        }

        let attempt = |order: SarimaOrder| {
            let outcome = match fitter(order, series) {
                Ok(aic) if aic.is_finite() => FitOutcome::Fitted { aic },
                Ok(aic) => FitOutcome::Skipped {
                    reason: format!("non-finite AIC {}", aic),
                },
                Err(e) => FitOutcome::Skipped {
                    reason: e.to_string(),
                },
            };
            match &outcome {
                FitOutcome::Fitted { aic } => debug!(%order, aic, "fitted"),
                FitOutcome::Skipped { reason } => debug!(%order, %reason, "skipped"),
            }
            GridAttempt { order, outcome }
        };

        let orders = self.orders();
        let attempts: Vec<GridAttempt> = if self.config.parallel {
            orders.into_par_iter().map(attempt).collect()
        } else {
            orders.into_iter().map(attempt).collect()
        };

        let Some((best_order, best_aic)) = select_best(&attempts) else {
            warn!(attempted = attempts.len(), "no candidate order could be fitted");
            return Err(AnalysisError::NoViableModel {
                attempted: attempts.len(),
            });
        };

        info!(order = %best_order, aic = best_aic, "selected order");
        Ok(GridSearchOutcome {
            attempts,
            best_order,
            best_aic,
        })
    }

    /// Run the grid and refit the selected order.
    pub fn fit_best(&self, series: &TimeSeries) -> Result<(GridSearchOutcome, Sarima)> {
        let outcome = self.run(series)?;
        let mut model = Sarima::new(outcome.best_order)
            .with_trend(self.config.trend)
            .with_bounds(self.config.enforce_bounds);
        model.fit(series)?;
        Ok((outcome, model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series(n: usize) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2005, 1, 1, 0, 0, 0).unwrap();
        let values = (0..n)
            .map(|i| 150.0 + 0.8 * i as f64 + 3.0 * (i as f64 * 0.7).sin())
            .collect();
        TimeSeries::monthly(start, values).unwrap()
    }

    fn search(bound: usize) -> SarimaGridSearch {
        SarimaGridSearch::new(GridSearchConfig::default().with_order_bound(bound)).unwrap()
    }

    #[test]
    fn enumeration_is_lexicographic() {
        let orders = search(2).orders();

        assert_eq!(orders.len(), 64);
        assert_eq!(orders[0], SarimaOrder::new(0, 0, 0).with_seasonal(0, 0, 0, 12));
        assert_eq!(orders[1], SarimaOrder::new(0, 0, 0).with_seasonal(0, 0, 1, 12));
        assert_eq!(orders[8], SarimaOrder::new(0, 0, 1).with_seasonal(0, 0, 0, 12));
        assert_eq!(orders[63], SarimaOrder::new(1, 1, 1).with_seasonal(1, 1, 1, 12));

        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(sorted, orders);

        assert_eq!(search(3).orders().len(), 729);
    }

    #[test]
    fn bound_one_attempts_single_zero_order() {
        let outcome = search(1).run(&series(40)).unwrap();

        assert_eq!(outcome.attempted(), 1);
        assert_eq!(outcome.best_order, SarimaOrder::new(0, 0, 0));
        assert!(outcome.best_aic.is_finite());
    }

    #[test]
    fn tie_break_prefers_first_enumerated() {
        // Two orders share the minimum AIC.
        let outcome = search(2)
            .run_with(&series(40), |order, _| {
                if (order.p == 1 && order.seasonal_q == 1) || (order.q == 1 && order.d == 1) {
                    Ok(10.0)
                } else {
                    Ok(20.0)
                }
            })
            .unwrap();

        // (0, 1, 1) x (0, 0, 0) precedes (1, 0, 0) x (0, 0, 1)
        assert_eq!(outcome.best_order, SarimaOrder::new(0, 1, 1));
        assert_eq!(outcome.best_aic, 10.0);
    }

    #[test]
    fn constant_aic_selects_first_order() {
        let outcome = search(2).run_with(&series(40), |_, _| Ok(1.0)).unwrap();
        assert_eq!(outcome.best_order, search(2).orders()[0]);
    }

    #[test]
    fn failures_are_recorded_not_fatal() {
        let outcome = search(2)
            .run_with(&series(40), |order, _| {
                if order.seasonal_d == 1 {
                    Err(AnalysisError::ComputationError("diverged".to_string()))
                } else if order.seasonal_p == 1 {
                    Ok(f64::NAN)
                } else {
                    Ok(order.p as f64)
                }
            })
            .unwrap();

        assert_eq!(outcome.attempted(), 64);
        assert_eq!(outcome.skipped().count(), 48);
        assert_eq!(outcome.fitted().count(), 16);
        assert_eq!(outcome.best_aic, 0.0);

        let reasons: Vec<&GridAttempt> = outcome.skipped().collect();
        assert!(matches!(
            &reasons[0].outcome,
            FitOutcome::Skipped { reason } if reason.contains("diverged") || reason.contains("non-finite")
        ));
    }

    #[test]
    fn exhaustion_is_reported_explicitly() {
        let err = search(2)
            .run_with(&series(40), |_, _| {
                Err(AnalysisError::ComputationError("singular".to_string()))
            })
            .unwrap_err();

        assert_eq!(err, AnalysisError::NoViableModel { attempted: 64 });
    }

    #[test]
    fn parallel_matches_sequential() {
        let fitter = |order: SarimaOrder, _: &TimeSeries| -> Result<f64> {
            Ok(((order.p + order.q + order.seasonal_q) % 2) as f64)
        };
        let sequential = search(2).run_with(&series(40), fitter).unwrap();

        let parallel = SarimaGridSearch::new(
            GridSearchConfig::default()
                .with_order_bound(2)
                .with_parallel(true),
        )
        .unwrap()
        .run_with(&series(40), fitter)
        .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(SarimaGridSearch::new(GridSearchConfig::default().with_order_bound(0)).is_err());
        assert!(SarimaGridSearch::new(
            GridSearchConfig::default().with_seasonal_period(1)
        )
        .is_err());

        let start = Utc.with_ymd_and_hms(2005, 1, 1, 0, 0, 0).unwrap();
        let gappy = TimeSeries::monthly(start, vec![1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(search(1).run(&gappy).unwrap_err(), AnalysisError::MissingValues);
    }

    #[test]
    fn select_best_skips_failed_attempts() {
        let attempts = vec![
            GridAttempt {
                order: SarimaOrder::new(0, 0, 0),
                outcome: FitOutcome::Skipped {
                    reason: "x".to_string(),
                },
            },
            GridAttempt {
                order: SarimaOrder::new(1, 0, 0),
                outcome: FitOutcome::Fitted { aic: 5.0 },
            },
            GridAttempt {
                order: SarimaOrder::new(2, 0, 0),
                outcome: FitOutcome::Fitted { aic: 5.0 },
            },
        ];

        assert_eq!(select_best(&attempts), Some((SarimaOrder::new(1, 0, 0), 5.0)));
        assert_eq!(select_best(&attempts[..1]), None);
    }

    #[test]
    fn fit_best_refits_selected_order() {
        let (outcome, model) = search(1).fit_best(&series(40)).unwrap();
        assert_eq!(model.order(), outcome.best_order);
        assert_eq!(model.aic(), Some(outcome.best_aic));
    }
}
