//! Univariate time series with validated timestamps.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Policy for handling missing values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MissingValuePolicy {
    /// Return an error if missing values are present.
    #[default]
    Error,
    /// Drop observations with missing values.
    Drop,
    /// Fill missing values with a constant.
    Fill(f64),
    /// Carry the last observed value forward.
    ForwardFill,
}

/// Whether a value counts as missing (NaN or infinite).
pub fn is_missing(value: f64) -> bool {
    !value.is_finite()
}

/// An ordered sequence of `(timestamp, value)` pairs.
///
/// Timestamps are strictly increasing. Missing observations are stored as
/// NaN and are kept until a caller explicitly drops or fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a new series, validating ordering and lengths.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(AnalysisError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        Ok(Self { timestamps, values })
    }

    /// Create a monthly series starting at `start`.
    pub fn monthly(start: DateTime<Utc>, values: Vec<f64>) -> Result<Self> {
        let timestamps = (0..values.len())
            .map(|i| {
                u32::try_from(i)
                    .ok()
                    .and_then(|m| start.checked_add_months(Months::new(m)))
                    .ok_or_else(|| {
                        AnalysisError::TimestampError(format!(
                            "month offset {} overflows the calendar",
                            i
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(timestamps, values)
    }

    /// Get the number of observations (including missing ones).
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get the timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get the values, missing entries included.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|&v| is_missing(v))
    }

    /// Number of missing observations.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|&&v| is_missing(v)).count()
    }

    /// Fraction of observations that are missing (0 for an empty series).
    pub fn missing_share(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.missing_count() as f64 / self.len() as f64
    }

    /// Values with missing entries removed.
    pub fn observed_values(&self) -> Vec<f64> {
        self.values.iter().copied().filter(|&v| !is_missing(v)).collect()
    }

    /// The last non-missing observation.
    pub fn last_observed(&self) -> Option<(DateTime<Utc>, f64)> {
        self.timestamps
            .iter()
            .zip(self.values.iter())
            .rev()
            .find(|&(_, &v)| !is_missing(v))
            .map(|(&t, &v)| (t, v))
    }

    /// Value at an exact timestamp, `None` if absent or missing.
    pub fn value_at(&self, timestamp: &DateTime<Utc>) -> Option<f64> {
        self.timestamps
            .binary_search(timestamp)
            .ok()
            .map(|i| self.values[i])
            .filter(|v| !is_missing(*v))
    }

    /// A new series on the same index with different values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<TimeSeries> {
        if values.len() != self.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: self.len(),
                got: values.len(),
            });
        }
        Ok(TimeSeries {
            timestamps: self.timestamps.clone(),
            values,
        })
    }

    /// Return a sanitized copy with missing values handled.
    pub fn sanitized(&self, policy: MissingValuePolicy) -> Result<TimeSeries> {
        match policy {
            MissingValuePolicy::Error => {
                if self.has_missing_values() {
                    return Err(AnalysisError::MissingValues);
                }
                Ok(self.clone())
            }
            MissingValuePolicy::Drop => Ok(self.drop_missing()),
            MissingValuePolicy::Fill(fill_value) => {
                let values = self
                    .values
                    .iter()
                    .map(|&v| if is_missing(v) { fill_value } else { v })
                    .collect();
                self.with_values(values)
            }
            MissingValuePolicy::ForwardFill => {
                let mut last_valid = None;
                let values = self
                    .values
                    .iter()
                    .map(|&v| {
                        if is_missing(v) {
                            last_valid.unwrap_or(v)
                        } else {
                            last_valid = Some(v);
                            v
                        }
                    })
                    .collect();
                self.with_values(values)
            }
        }
    }

    /// Copy of the series without its missing observations.
    pub fn drop_missing(&self) -> TimeSeries {
        let (timestamps, values) = self
            .timestamps
            .iter()
            .zip(self.values.iter())
            .filter(|&(_, &v)| !is_missing(v))
            .map(|(&t, &v)| (t, v))
            .unzip();
        TimeSeries { timestamps, values }
    }
}
