//! # realty-forecast
//!
//! Housing-price time series analysis.
//!
//! Provides detrending transforms, an augmented Dickey-Fuller stationarity
//! search, seasonal ARIMA fitting with brute-force order selection by AIC,
//! growth and ROI projections from the fitted forecast, regional panels and
//! a few inferential helpers for comparing groups of prices.

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod projection;
pub mod regional;
pub mod transform;
pub mod utils;
pub mod validation;

pub use error::{AnalysisError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, TimeSeries};
    pub use crate::error::{AnalysisError, Result};
    pub use crate::models::{Forecaster, GridSearchConfig, Sarima, SarimaGridSearch, SarimaOrder, Trend};
    pub use crate::pipeline::{AnalysisSummary, Pipeline, PipelineConfig};
    pub use crate::projection::{expected_growth, GrowthProjection, RoiProjection};
    pub use crate::regional::RegionPanel;
    pub use crate::validation::{adf_test, StationaritySearch, StationaritySearchConfig};
}
