//! Data transformations for time series.
//!
//! Provides element-wise base transforms, rolling and exponentially
//! weighted detrending, and length-preserving differences.
//!
//! # Example
//!
//! ```
//! use realty_forecast::transform::{difference, subtract_rolling_mean, BaseTransform};
//!
//! let prices = vec![100.0, 102.0, 105.0, 103.0, 108.0, 112.0];
//!
//! let logged = BaseTransform::Log.apply(&prices).unwrap();
//! let detrended = subtract_rolling_mean(&logged, 3).unwrap();
//! let diffed = difference(&detrended, 1);
//!
//! assert_eq!(diffed.len(), prices.len());
//! ```

pub mod base;
pub mod diff;
pub mod window;

pub use base::BaseTransform;
pub use diff::{difference, pct_change};
pub use window::{
    ewm_mean, halflife_alpha, rolling_mean, rolling_std, subtract_ewm_mean,
    subtract_rolling_mean,
};
