//! Numerical utilities shared by the tester and the models.

pub mod ols;
pub mod optimization;
pub mod stats;

pub use ols::{ols_fit, OLSResult};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{
    mean, median, normal_cdf, population_variance, quantile_normal, std_dev, two_sided_p_value,
    variance,
};
