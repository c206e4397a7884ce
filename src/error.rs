//! Error types for the realty-forecast library.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur during analysis operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// A value lies outside the domain of an element-wise transform.
    #[error("{transform} is undefined for value {value} at index {index}")]
    DomainError {
        transform: &'static str,
        index: usize,
        value: f64,
    },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Every hyperparameter combination of a grid search failed to fit.
    #[error("no viable model: all {attempted} candidate orders failed to fit")]
    NoViableModel { attempted: usize },

    /// A region identifier is not present in a panel.
    #[error("unknown region: {0}")]
    UnknownRegion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = AnalysisError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = AnalysisError::InsufficientData { needed: 10, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 10, got 5"
        );

        let err = AnalysisError::InvalidParameter("window must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: window must be positive"
        );

        let err = AnalysisError::DomainError {
            transform: "log",
            index: 3,
            value: -1.0,
        };
        assert_eq!(err.to_string(), "log is undefined for value -1 at index 3");

        let err = AnalysisError::NoViableModel { attempted: 64 };
        assert_eq!(
            err.to_string(),
            "no viable model: all 64 candidate orders failed to fit"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = AnalysisError::FitRequired;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
