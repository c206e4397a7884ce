//! Seasonal ARIMA models and order selection.
//!
//! - [`Sarima`]: multiplicative seasonal ARIMA fitted by conditional sum of squares
//! - [`SarimaGridSearch`]: exhaustive order search by minimum AIC

mod grid_search;
mod model;
mod order;
pub mod poly;

pub use grid_search::{
    select_best, FitOutcome, GridAttempt, GridSearchConfig, GridSearchOutcome, SarimaGridSearch,
};
pub use model::{Coefficient, Sarima};
pub use order::{SarimaOrder, Trend};
