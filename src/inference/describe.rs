//! Size, mean and spread of sample groups.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::utils::{mean, std_dev};

/// Summary of one group. `std_dev` is the sample standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl GroupSummary {
    pub fn of(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(AnalysisError::EmptyData);
        }
        Ok(Self {
            n: values.len(),
            mean: mean(values),
            std_dev: std_dev(values),
        })
    }
}

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n = {}\tmean = {:.2}\tstd = {:.2}", self.n, self.mean, self.std_dev)
    }
}

/// Summaries of several groups, numbered from one when displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupComparison {
    pub groups: Vec<GroupSummary>,
}

impl fmt::Display for GroupComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}. {}", i + 1, group)?;
        }
        Ok(())
    }
}

pub fn compare_groups(groups: &[&[f64]]) -> Result<GroupComparison> {
    let groups = groups
        .iter()
        .map(|g| GroupSummary::of(g))
        .collect::<Result<Vec<_>>>()?;
    Ok(GroupComparison { groups })
}
