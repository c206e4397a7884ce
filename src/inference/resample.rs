//! Bootstrap sample means.
//!
//! Draws repeated samples with replacement and records each sample's mean,
//! giving an approximately normal sampling distribution to test on.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::utils::mean;

/// Configuration for [`bootstrap_means`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of resamples, one mean each.
    pub n_resamples: usize,
    /// Draws per resample.
    pub sample_size: usize,
    /// Draw contiguous blocks of this length instead of single values.
    pub block_size: Option<usize>,
    /// Random seed for reproducibility (None for random).
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_resamples: 30,
            sample_size: 30,
            block_size: None,
            seed: None,
        }
    }
}

impl BootstrapConfig {
    pub fn new(n_resamples: usize) -> Self {
        Self {
            n_resamples,
            ..Default::default()
        }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Use moving blocks, keeping runs of autocorrelated values together.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = Some(block_size);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn draw_values(values: &[f64], size: usize, rng: &mut impl Rng) -> Vec<f64> {
    let n = values.len();
    (0..size).map(|_| values[rng.gen_range(0..n)]).collect()
}

fn draw_blocks(values: &[f64], size: usize, block_size: usize, rng: &mut impl Rng) -> Vec<f64> {
    let n = values.len();
    if block_size == 0 || block_size > n {
        return draw_values(values, size, rng);
    }

    let mut sample = Vec::with_capacity(size);
    while sample.len() < size {
        let start = rng.gen_range(0..=(n - block_size));
        let take = block_size.min(size - sample.len());
        sample.extend_from_slice(&values[start..start + take]);
    }
    sample
}

/// Means of `config.n_resamples` samples drawn with replacement.
///
/// # Example
///
/// ```
/// use realty_forecast::inference::{bootstrap_means, BootstrapConfig};
///
/// let prices = [210.0, 250.0, 199.0, 305.0, 280.0, 260.0];
/// let means = bootstrap_means(&prices, &BootstrapConfig::new(100).with_seed(7)).unwrap();
/// assert_eq!(means.len(), 100);
/// ```
pub fn bootstrap_means(values: &[f64], config: &BootstrapConfig) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyData);
    }
    if config.sample_size == 0 {
        return Err(AnalysisError::InvalidParameter(
            "bootstrap sample size must be positive".to_string(),
        ));
    }

    let mut rng: StdRng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    Ok((0..config.n_resamples)
        .map(|_| {
            let sample = match config.block_size {
                Some(bs) => draw_blocks(values, config.sample_size, bs, &mut rng),
                None => draw_values(values, config.sample_size, &mut rng),
            };
            mean(&sample)
        })
        .collect())
}

/// Percentile interval of bootstrap statistics at confidence `level`.
pub fn percentile_interval(statistics: &[f64], level: f64) -> Result<(f64, f64)> {
    if !(level > 0.0 && level < 1.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "confidence level must be in (0, 1), got {}",
            level
        )));
    }
    let mut sorted: Vec<f64> = statistics.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(AnalysisError::EmptyData);
    }
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let alpha = (1.0 - level) / 2.0;
    let lower_idx = ((alpha * n as f64).floor() as usize).min(n - 1);
    let upper_idx = (((1.0 - alpha) * n as f64).floor() as usize).min(n - 1);
    Ok((sorted[lower_idx], sorted[upper_idx]))
}
