//! Inferential helpers for comparing groups of prices.

mod describe;
mod hypothesis;
mod resample;

pub use describe::{compare_groups, GroupComparison, GroupSummary};
pub use hypothesis::{
    bonferroni_alpha, cohen_d, levene_test, normality_test, HypothesisDecision, TestResult,
};
pub use resample::{bootstrap_means, percentile_interval, BootstrapConfig};
