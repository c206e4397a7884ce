//! Core data structures for time series analysis.

mod forecast;
mod time_series;

pub use forecast::{Forecast, Interval};
pub use time_series::{is_missing, MissingValuePolicy, TimeSeries};
