//! Search over detrending transforms for a stationary rendition of a series.
//!
//! A base transform is applied first, then each smoothing configuration of
//! a fixed grid, with and without a first difference. Every candidate is
//! tested with the ADF test and kept when its own p-value clears `alpha`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::transform::{difference, subtract_ewm_mean, subtract_rolling_mean, BaseTransform};
use crate::validation::stationarity::stationarity_p_value;

/// Trend removed from the base series before testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Smoothing {
    /// Test the base series itself.
    None,
    /// Subtract a trailing rolling mean.
    RollingMean { window: usize },
    /// Subtract an exponentially weighted mean.
    WeightedMean { half_life: f64 },
}

/// A transform configuration whose unit-root test cleared the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformCandidate {
    /// Human-readable name, e.g. `Log_minus_roll_mean_diff_12`.
    pub label: String,
    /// Base transform applied first.
    pub base: BaseTransform,
    /// Trend removed after the base transform.
    pub smoothing: Smoothing,
    /// Whether the detrended series was first-differenced.
    pub differenced: bool,
    /// ADF p-value of the tested series.
    pub p_value: f64,
}

/// A candidate whose unit-root test could not run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub label: String,
    pub reason: String,
}

/// Outcome of one stationarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityReport {
    /// Base transform the search ran on.
    pub transform: BaseTransform,
    /// Threshold used.
    pub alpha: f64,
    /// Number of grid candidates tried.
    pub attempted: usize,
    /// Candidates with `p <= alpha`, in grid order.
    pub passing: Vec<TransformCandidate>,
    /// Candidates that could not be tested.
    pub skipped: Vec<SkippedCandidate>,
}

impl StationarityReport {
    /// Labels of passing candidates.
    pub fn labels(&self) -> Vec<&str> {
        self.passing.iter().map(|c| c.label.as_str()).collect()
    }

    /// Passing candidate with the lowest p-value, first in grid order on ties.
    pub fn most_stationary(&self) -> Option<&TransformCandidate> {
        self.passing
            .iter()
            .fold(None, |best: Option<&TransformCandidate>, c| match best {
                Some(b) if b.p_value <= c.p_value => Some(b),
                _ => Some(c),
            })
    }
}

impl fmt::Display for StationarityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} transforms with p <= {} ({} of {} passed, {} skipped)",
            self.transform,
            self.alpha,
            self.passing.len(),
            self.attempted,
            self.skipped.len()
        )?;
        for candidate in &self.passing {
            writeln!(f, "  {:<36} {:.6}", candidate.label, candidate.p_value)?;
        }
        Ok(())
    }
}

/// Configuration for [`StationaritySearch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationaritySearchConfig {
    /// Maximum p-value for a candidate to be kept.
    pub alpha: f64,
    /// Base transform applied before detrending.
    pub transform: BaseTransform,
    /// Rolling mean windows.
    pub windows: Vec<usize>,
    /// Half-lives of the weighted means.
    pub half_lives: Vec<f64>,
}

impl Default for StationaritySearchConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            transform: BaseTransform::None,
            windows: vec![3, 6, 8, 12],
            half_lives: vec![1.0, 2.0, 3.0, 4.0],
        }
    }
}

impl StationaritySearchConfig {
    /// Set the significance threshold.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the base transform.
    pub fn with_transform(mut self, transform: BaseTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the rolling mean windows.
    pub fn with_windows(mut self, windows: Vec<usize>) -> Self {
        self.windows = windows;
        self
    }

    /// Set the weighted mean half-lives.
    pub fn with_half_lives(mut self, half_lives: Vec<f64>) -> Self {
        self.half_lives = half_lives;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(AnalysisError::InvalidParameter(format!(
                "alpha must be in [0, 1], got {}",
                self.alpha
            )));
        }
        if self.windows.contains(&0) {
            return Err(AnalysisError::InvalidParameter(
                "rolling windows must be positive".to_string(),
            ));
        }
        if self.half_lives.iter().any(|h| *h <= 0.0 || !h.is_finite()) {
            return Err(AnalysisError::InvalidParameter(
                "half-lives must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct CandidateSpec {
    smoothing: Smoothing,
    differenced: bool,
}

impl CandidateSpec {
    fn label(&self, base: BaseTransform) -> String {
        let diff = if self.differenced { "_diff" } else { "" };
        match self.smoothing {
            Smoothing::None => format!("{}{}", base, diff),
            Smoothing::RollingMean { window } => {
                format!("{}_minus_roll_mean{}_{}", base, diff, window)
            }
            Smoothing::WeightedMean { half_life } => {
                format!("{}_minus_w_roll_mean{}_{}", base, diff, half_life)
            }
        }
    }

    fn apply(&self, base: &[f64]) -> Result<Vec<f64>> {
        let detrended = match self.smoothing {
            Smoothing::None => base.to_vec(),
            Smoothing::RollingMean { window } => subtract_rolling_mean(base, window)?,
            Smoothing::WeightedMean { half_life } => subtract_ewm_mean(base, half_life)?,
        };
        Ok(if self.differenced {
            difference(&detrended, 1)
        } else {
            detrended
        })
    }
}

/// Grid search over detrending transforms.
///
/// # Example
///
/// ```
/// use realty_forecast::validation::{StationaritySearch, StationaritySearchConfig};
///
/// let series: Vec<f64> = (0..120).map(|i| 100.0 + i as f64 + (i as f64 * 0.9).sin()).collect();
/// let search = StationaritySearch::new(StationaritySearchConfig::default()).unwrap();
/// let report = search.run(&series).unwrap();
///
/// assert_eq!(report.attempted, 18);
/// assert!(report.passing.iter().all(|c| c.p_value <= 0.05));
/// ```
#[derive(Debug, Clone)]
pub struct StationaritySearch {
    config: StationaritySearchConfig,
}

impl StationaritySearch {
    /// Create a search, validating the configuration.
    pub fn new(config: StationaritySearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The search configuration.
    pub fn config(&self) -> &StationaritySearchConfig {
        &self.config
    }

    /// Run the grid on `series`.
    ///
    /// Fails only when the base transform cannot be applied. Candidates
    /// whose test cannot run are listed in [`StationarityReport::skipped`].
    pub fn run(&self, series: &[f64]) -> Result<StationarityReport> {
        if series.is_empty() {
            return Err(AnalysisError::EmptyData);
        }
        let base_transform = self.config.transform;
        let base = base_transform.apply(series)?;

        let specs = self.candidates();
        let mut passing = Vec::new();
        let mut skipped = Vec::new();

        for spec in &specs {
            let label = spec.label(base_transform);
            let tested = spec.apply(&base).and_then(|s| stationarity_p_value(&s));

            match tested {
                Ok(p_value) => {
                    debug!(candidate = %label, p_value, "unit-root test");
                    if p_value <= self.config.alpha {
                        passing.push(TransformCandidate {
                            label,
                            base: base_transform,
                            smoothing: spec.smoothing,
                            differenced: spec.differenced,
                            p_value,
                        });
                    }
                }
                Err(e) => {
                    debug!(candidate = %label, error = %e, "skipping candidate");
                    skipped.push(SkippedCandidate {
                        label,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(StationarityReport {
            transform: base_transform,
            alpha: self.config.alpha,
            attempted: specs.len(),
            passing,
            skipped,
        })
    }

    fn candidates(&self) -> Vec<CandidateSpec> {
        let mut specs: Vec<CandidateSpec> = [false, true]
            .into_iter()
            .map(|differenced| CandidateSpec {
                smoothing: Smoothing::None,
                differenced,
            })
            .collect();
        for differenced in [false, true] {
            specs.extend(self.config.windows.iter().map(|&window| CandidateSpec {
                smoothing: Smoothing::RollingMean { window },
                differenced,
            }));
        }
        for differenced in [false, true] {
            specs.extend(self.config.half_lives.iter().map(|&half_life| CandidateSpec {
                smoothing: Smoothing::WeightedMean { half_life },
                differenced,
            }));
        }
        specs
    }
}

/// Run the default search for every base transform.
///
/// Base transforms that cannot be applied to `series` (a log of a
/// non-positive price) are left out with a warning.
pub fn search_all_transforms(series: &[f64], alpha: f64) -> Result<Vec<StationarityReport>> {
    let mut reports = Vec::with_capacity(BaseTransform::ALL.len());
    for transform in BaseTransform::ALL {
        let config = StationaritySearchConfig::default()
            .with_alpha(alpha)
            .with_transform(transform);
        match StationaritySearch::new(config)?.run(series) {
            Ok(report) => reports.push(report),
            Err(e @ AnalysisError::DomainError { .. }) => {
                warn!(%transform, error = %e, "base transform not applicable");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(reports)
}
