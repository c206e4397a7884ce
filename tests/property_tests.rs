//! Property-based tests for transforms, searches and projections.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated price series.

use realty_forecast::core::TimeSeries;
use realty_forecast::models::{GridSearchConfig, SarimaGridSearch, SarimaOrder};
use realty_forecast::projection::{growth_rate, GrowthProjection, RoiProjection};
use realty_forecast::transform::{difference, subtract_rolling_mean};
use realty_forecast::validation::{StationaritySearch, StationaritySearchConfig};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn make_ts(values: &[f64]) -> TimeSeries {
    let start = Utc.with_ymd_and_hms(2009, 1, 1, 0, 0, 0).unwrap();
    TimeSeries::monthly(start, values.to_vec()).unwrap()
}

/// Positive prices with a small trend so no series is constant.
fn price_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        prop::collection::vec(1.0..1000.0_f64, len).prop_map(|mut v| {
            for (i, val) in v.iter_mut().enumerate() {
                *val += (i as f64) * 0.5;
            }
            v
        })
    })
}

// =============================================================================
// Transforms
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn rolling_subtraction_keeps_length(
        values in price_strategy(1, 80),
        window in 1usize..15
    ) {
        let out = subtract_rolling_mean(&values, window).unwrap();
        prop_assert_eq!(out.len(), values.len());
        for (i, v) in out.iter().enumerate() {
            if i + 1 < window {
                prop_assert!(v.is_nan());
            } else {
                prop_assert!(v.is_finite());
            }
        }
    }

    #[test]
    fn difference_is_pairwise(values in price_strategy(1, 80)) {
        let diffed = difference(&values, 1);
        prop_assert_eq!(diffed.len(), values.len());
        prop_assert!(diffed[0].is_nan());
        for i in 1..values.len() {
            prop_assert_eq!(diffed[i], values[i] - values[i - 1]);
        }
    }
}

// =============================================================================
// Stationarity search
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn alpha_one_keeps_every_tested_candidate(values in price_strategy(40, 90)) {
        let config = StationaritySearchConfig::default().with_alpha(1.0);
        let report = StationaritySearch::new(config).unwrap().run(&values).unwrap();
        prop_assert_eq!(report.attempted, 18);
        prop_assert_eq!(report.passing.len() + report.skipped.len(), report.attempted);
    }

    #[test]
    fn alpha_zero_keeps_only_zero_p_values(values in price_strategy(40, 90)) {
        let config = StationaritySearchConfig::default().with_alpha(0.0);
        let report = StationaritySearch::new(config).unwrap().run(&values).unwrap();
        prop_assert!(report.passing.iter().all(|c| c.p_value == 0.0));
    }

    #[test]
    fn passing_candidates_respect_alpha(
        values in price_strategy(40, 90),
        alpha in 0.01..0.5_f64
    ) {
        let config = StationaritySearchConfig::default().with_alpha(alpha);
        let report = StationaritySearch::new(config).unwrap().run(&values).unwrap();
        prop_assert!(report.passing.iter().all(|c| c.p_value <= alpha));
    }
}

// =============================================================================
// Grid search
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn grid_enumerates_bound_to_the_sixth(bound in 1usize..4) {
        let search = SarimaGridSearch::new(
            GridSearchConfig::default().with_order_bound(bound),
        ).unwrap();
        let orders = search.orders();
        prop_assert_eq!(orders.len(), bound.pow(6));
        prop_assert!(orders.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn tie_break_returns_first_enumerated(
        values in price_strategy(10, 30),
        aic in -100.0..100.0_f64
    ) {
        let ts = make_ts(&values);
        let search = SarimaGridSearch::new(GridSearchConfig::default()).unwrap();
        let outcome = search.run_with(&ts, |_, _| Ok(aic)).unwrap();
        prop_assert_eq!(outcome.best_order, SarimaOrder::default());
        prop_assert_eq!(outcome.best_aic, aic);
    }
}

// =============================================================================
// Projections
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn growth_of_geometric_path(first in 1.0..1e6_f64, rate in -0.5..0.5_f64, len in 2usize..40) {
        let path: Vec<f64> = (0..len).map(|i| first * (1.0 + rate).powi(i as i32)).collect();
        let expected = (1.0 + rate).powi(len as i32 - 1) - 1.0;
        let got = growth_rate(&path).unwrap();
        prop_assert!((got - expected).abs() <= 1e-9 * (1.0 + expected.abs()));
    }

    #[test]
    fn roi_properties_never_exceed_budget(
        investment in 0.0..1e8_f64,
        price in 1.0..1e6_f64,
        mean in -0.5..1.0_f64
    ) {
        let growth = GrowthProjection { upper: mean + 0.1, mean, lower: mean - 0.1 };
        let roi = RoiProjection::new(growth, investment, price).unwrap();
        let count = roi.properties_affordable as f64;
        prop_assert!(count * price <= investment * (1.0 + 1e-12));
        prop_assert!((count + 1.0) * price > investment * (1.0 - 1e-12));
        prop_assert!(roi.lower_return <= roi.mean_return && roi.mean_return <= roi.upper_return);
    }
}
