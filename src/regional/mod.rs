//! Panels of regional price series.
//!
//! - [`RegionPanel`]: region identifier to owned [`TimeSeries`](crate::core::TimeSeries)
//! - [`GrowthRates`]: total, 5, 3 and 1-year growth
//! - [`YoyAugmented`]: year-over-year change columns

mod growth;
mod panel;
mod yoy;

pub use growth::{top_growth_regions, GrowthRates, RegionGrowth};
pub use panel::{RegionPanel, DEFAULT_SPARSE_THRESHOLD};
pub use yoy::{YoyAugmented, RATE_LAG, YEAR};
