//! SARIMA order and trend specification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Deterministic trend on the differenced series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// No trend term.
    #[default]
    None,
    /// Constant intercept (`c`).
    Constant,
    /// Linear drift in time (`t`).
    Linear,
    /// Intercept and drift (`ct`).
    ConstantLinear,
}

impl Trend {
    /// Number of trend parameters.
    pub fn num_params(&self) -> usize {
        match self {
            Trend::None => 0,
            Trend::Constant | Trend::Linear => 1,
            Trend::ConstantLinear => 2,
        }
    }

    pub fn has_constant(&self) -> bool {
        matches!(self, Trend::Constant | Trend::ConstantLinear)
    }

    pub fn has_drift(&self) -> bool {
        matches!(self, Trend::Linear | Trend::ConstantLinear)
    }

    /// Short code: `n`, `c`, `t` or `ct`.
    pub fn code(&self) -> &'static str {
        match self {
            Trend::None => "n",
            Trend::Constant => "c",
            Trend::Linear => "t",
            Trend::ConstantLinear => "ct",
        }
    }
}

impl FromStr for Trend {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "n" | "none" => Ok(Trend::None),
            "c" => Ok(Trend::Constant),
            "t" => Ok(Trend::Linear),
            "ct" => Ok(Trend::ConstantLinear),
            other => Err(AnalysisError::InvalidParameter(format!(
                "unknown trend '{}', expected one of n, c, t, ct",
                other
            ))),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Seasonal ARIMA order `(p, d, q) x (P, D, Q, s)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SarimaOrder {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    /// Seasonal AR order (P)
    pub seasonal_p: usize,
    /// Seasonal differencing order (D)
    pub seasonal_d: usize,
    /// Seasonal MA order (Q)
    pub seasonal_q: usize,
    /// Seasonal period (s)
    pub period: usize,
}

impl SarimaOrder {
    /// Non-seasonal order `(p, d, q)` with period 12 and no seasonal part.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p: 0,
            seasonal_d: 0,
            seasonal_q: 0,
            period: 12,
        }
    }

    /// Set the seasonal order `(P, D, Q, s)`.
    pub fn with_seasonal(mut self, p: usize, d: usize, q: usize, period: usize) -> Self {
        self.seasonal_p = p;
        self.seasonal_d = d;
        self.seasonal_q = q;
        self.period = period;
        self
    }

    /// `(p, d, q)`.
    pub fn non_seasonal(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// `(P, D, Q, s)`.
    pub fn seasonal(&self) -> (usize, usize, usize, usize) {
        (self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period)
    }

    /// Whether any seasonal component is present.
    pub fn is_seasonal(&self) -> bool {
        self.seasonal_p + self.seasonal_d + self.seasonal_q > 0
    }

    /// Number of AR and MA coefficients (trend excluded).
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    /// Largest lag of the combined AR polynomial.
    pub fn max_ar_lag(&self) -> usize {
        self.p + self.seasonal_p * self.period
    }

    /// Largest lag of the combined MA polynomial.
    pub fn max_ma_lag(&self) -> usize {
        self.q + self.seasonal_q * self.period
    }

    /// Observations consumed by differencing.
    pub fn differencing_lag(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    /// Check that the seasonal period is usable.
    pub fn validate(&self) -> Result<()> {
        if self.is_seasonal() && self.period < 2 {
            return Err(AnalysisError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                self.period
            )));
        }
        Ok(())
    }
}

impl Default for SarimaOrder {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl fmt::Display for SarimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SARIMA({}, {}, {})x({}, {}, {}, {})",
            self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
        )
    }
}
