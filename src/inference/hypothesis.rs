//! Variance, normality and effect-size tests for comparing sample groups.

use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};

use crate::error::{AnalysisError, Result};
use crate::utils::{mean, median, population_variance};

/// Outcome of a null-hypothesis test at a significance level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum HypothesisDecision {
    /// `p > alpha`.
    FailToReject { p_value: f64, alpha: f64 },
    /// `p <= alpha`.
    Reject { p_value: f64, alpha: f64 },
}

impl HypothesisDecision {
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value > alpha {
            HypothesisDecision::FailToReject { p_value, alpha }
        } else {
            HypothesisDecision::Reject { p_value, alpha }
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, HypothesisDecision::Reject { .. })
    }
}

impl fmt::Display for HypothesisDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HypothesisDecision::FailToReject { p_value, alpha } => write!(
                f,
                "With a p-value of {}, which is greater than {}, we fail to reject H0",
                p_value, alpha
            ),
            HypothesisDecision::Reject { p_value, alpha } => write!(
                f,
                "With a p-value of {}, which is not greater than {}, we reject H0 and accept Ha",
                p_value, alpha
            ),
        }
    }
}

/// Test statistic and p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestResult {
    pub fn decision(&self, alpha: f64) -> HypothesisDecision {
        HypothesisDecision::from_p_value(self.p_value, alpha)
    }
}

/// Levene's test for equal variances, centred on group medians.
///
/// H0: all groups have the same variance.
pub fn levene_test(groups: &[&[f64]]) -> Result<TestResult> {
    let k = groups.len();
    if k < 2 {
        return Err(AnalysisError::InsufficientData { needed: 2, got: k });
    }
    if groups.iter().any(|g| g.is_empty()) {
        return Err(AnalysisError::EmptyData);
    }
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if total <= k {
        return Err(AnalysisError::InsufficientData {
            needed: k + 1,
            got: total,
        });
    }

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let center = median(g);
            g.iter().map(|x| (x - center).abs()).collect()
        })
        .collect();
    let group_means: Vec<f64> = deviations.iter().map(|z| mean(z)).collect();
    let grand_mean = deviations.iter().flatten().sum::<f64>() / total as f64;

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, m)| z.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, m)| z.iter().map(|x| (x - m).powi(2)).sum::<f64>())
        .sum();
    if within <= 0.0 {
        return Err(AnalysisError::ComputationError(
            "no within-group spread".to_string(),
        ));
    }

    let (df1, df2) = ((k - 1) as f64, (total - k) as f64);
    let statistic = df2 / df1 * between / within;
    let dist = FisherSnedecor::new(df1, df2)
        .map_err(|e| AnalysisError::ComputationError(e.to_string()))?;

    Ok(TestResult {
        statistic,
        p_value: dist.sf(statistic),
    })
}

/// Jarque-Bera normality test from sample skewness and kurtosis.
///
/// H0: the sample comes from a normal distribution.
pub fn normality_test(values: &[f64]) -> Result<TestResult> {
    let n = values.len();
    if n < 3 {
        return Err(AnalysisError::InsufficientData { needed: 3, got: n });
    }
    let m = mean(values);
    let moment = |power: i32| values.iter().map(|x| (x - m).powi(power)).sum::<f64>() / n as f64;
    let m2 = moment(2);
    if m2 <= 0.0 {
        return Err(AnalysisError::ComputationError(
            "normality undefined for a constant sample".to_string(),
        ));
    }
    let skew = moment(3) / m2.powf(1.5);
    let kurtosis = moment(4) / (m2 * m2);

    let statistic = n as f64 / 6.0 * (skew * skew + (kurtosis - 3.0).powi(2) / 4.0);
    let dist = ChiSquared::new(2.0).map_err(|e| AnalysisError::ComputationError(e.to_string()))?;

    Ok(TestResult {
        statistic,
        p_value: dist.sf(statistic),
    })
}

/// Absolute Cohen's d with a size-weighted pooled population variance.
pub fn cohen_d(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.is_empty() || b.is_empty() {
        return Err(AnalysisError::EmptyData);
    }
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let pooled = (n1 * population_variance(a) + n2 * population_variance(b)) / (n1 + n2);
    if pooled <= 0.0 {
        return Err(AnalysisError::ComputationError(
            "effect size undefined with zero pooled variance".to_string(),
        ));
    }
    Ok(((mean(a) - mean(b)) / pooled.sqrt()).abs())
}

/// Per-comparison significance level for `comparisons` tests.
pub fn bonferroni_alpha(alpha: f64, comparisons: usize) -> Result<f64> {
    if comparisons == 0 {
        return Err(AnalysisError::InvalidParameter(
            "number of comparisons must be positive".to_string(),
        ));
    }
    Ok(alpha / comparisons as f64)
}
