//! Stationarity testing and the search for a stationary transform.
//!
//! # Example
//!
//! ```
//! use realty_forecast::validation::adf_test;
//!
//! let series = vec![1.0, 1.2, 0.9, 1.1, 1.0, 0.95, 1.05, 1.0, 1.1, 0.9, 1.02, 0.98];
//! let result = adf_test(&series, None).unwrap();
//! println!("{}", result);
//! ```

pub mod search;
pub mod stationarity;

pub use search::{
    search_all_transforms, SkippedCandidate, Smoothing, StationarityReport, StationaritySearch,
    StationaritySearchConfig, TransformCandidate,
};
pub use stationarity::{
    adf_test, adf_test_fixed_lag, mackinnon_p_value, stationarity_check, stationarity_p_value,
    AdfResult, CriticalValues, StationarityCheck,
};
