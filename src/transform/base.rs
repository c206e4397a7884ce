//! Element-wise base transforms applied before detrending.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::is_missing;
use crate::error::{AnalysisError, Result};

/// Base value transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseTransform {
    /// Leave values unchanged.
    #[default]
    None,
    /// Natural logarithm; undefined for non-positive values.
    Log,
    /// Square root; undefined for negative values.
    Sqrt,
}

impl BaseTransform {
    /// All base transforms in search order.
    pub const ALL: [BaseTransform; 3] = [BaseTransform::None, BaseTransform::Log, BaseTransform::Sqrt];

    /// Apply the transform element-wise.
    ///
    /// Missing values stay missing. The first out-of-domain value fails the
    /// whole transform.
    pub fn apply(&self, values: &[f64]) -> Result<Vec<f64>> {
        let (name, in_domain, f): (&'static str, fn(f64) -> bool, fn(f64) -> f64) = match self {
            BaseTransform::None => return Ok(values.to_vec()),
            BaseTransform::Log => ("log", |v| v > 0.0, f64::ln),
            BaseTransform::Sqrt => ("sqrt", |v| v >= 0.0, f64::sqrt),
        };

        values
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                if is_missing(value) {
                    Ok(f64::NAN)
                } else if in_domain(value) {
                    Ok(f(value))
                } else {
                    Err(AnalysisError::DomainError {
                        transform: name,
                        index,
                        value,
                    })
                }
            })
            .collect()
    }
}

impl fmt::Display for BaseTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BaseTransform::None => "Original",
            BaseTransform::Log => "Log",
            BaseTransform::Sqrt => "Sqrt",
        };
        f.write_str(label)
    }
}
