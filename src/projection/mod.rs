//! Growth and return projections from fitted models.

mod growth;
mod roi;

pub use growth::{
    expected_growth, growth_rate, ForecastConfig, GrowthDescription, GrowthEstimate,
    GrowthProjection,
};
pub use roi::RoiProjection;
