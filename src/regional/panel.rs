//! A set of regional price series keyed by region identifier.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::TimeSeries;
use crate::error::{AnalysisError, Result};

/// Share of missing values above which a region counts as sparse by default.
pub const DEFAULT_SPARSE_THRESHOLD: f64 = 0.75;

/// Region identifier to owned series, iterated in identifier order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionPanel {
    regions: BTreeMap<String, TimeSeries>,
}

impl RegionPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region, returning the series it replaced.
    pub fn insert(&mut self, name: impl Into<String>, series: TimeSeries) -> Option<TimeSeries> {
        self.regions.insert(name.into(), series)
    }

    pub fn get(&self, name: &str) -> Option<&TimeSeries> {
        self.regions.get(name)
    }

    /// Like [`get`](Self::get) but an unknown region is an error.
    pub fn require(&self, name: &str) -> Result<&TimeSeries> {
        self.regions
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownRegion(name.to_string()))
    }

    pub fn remove(&mut self, name: &str) -> Option<TimeSeries> {
        self.regions.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TimeSeries)> {
        self.regions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Fraction of missing values in one region.
    pub fn missing_share(&self, name: &str) -> Result<f64> {
        Ok(self.require(name)?.missing_share())
    }

    /// Regions whose missing share exceeds `threshold`.
    pub fn sparse_regions(&self, threshold: f64) -> Result<Vec<&str>> {
        validate_threshold(threshold)?;
        Ok(self
            .iter()
            .filter(|(_, series)| series.missing_share() > threshold)
            .map(|(name, _)| name)
            .collect())
    }

    /// A new panel without the sparse regions.
    pub fn without_sparse(&self, threshold: f64) -> Result<RegionPanel> {
        validate_threshold(threshold)?;
        let regions: BTreeMap<String, TimeSeries> = self
            .regions
            .iter()
            .filter(|(_, series)| series.missing_share() <= threshold)
            .map(|(name, series)| (name.clone(), series.clone()))
            .collect();
        debug!(
            kept = regions.len(),
            dropped = self.len() - regions.len(),
            threshold,
            "dropped sparse regions"
        );
        Ok(RegionPanel { regions })
    }
}

impl FromIterator<(String, TimeSeries)> for RegionPanel {
    fn from_iter<I: IntoIterator<Item = (String, TimeSeries)>>(iter: I) -> Self {
        Self {
            regions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RegionPanel {
    type Item = (String, TimeSeries);
    type IntoIter = std::collections::btree_map::IntoIter<String, TimeSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.into_iter()
    }
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AnalysisError::InvalidParameter(format!(
            "missing-share threshold must be in [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}
