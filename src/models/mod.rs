//! Forecasting models.

mod traits;

pub mod sarima;

pub use sarima::{
    Coefficient, FitOutcome, GridAttempt, GridSearchConfig, GridSearchOutcome, Sarima,
    SarimaGridSearch, SarimaOrder, Trend,
};
pub use traits::{BoxedForecaster, Forecaster};
