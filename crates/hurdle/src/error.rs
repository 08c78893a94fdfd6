//! Error types for the hurdle screening library.
//!
//! A screening run is a single atomic transform: every fatal error aborts the
//! computation and propagates to the caller with enough context (offending
//! column, expression, or value) to diagnose. There is no retry or
//! partial-success mode.

use thiserror::Error;

/// The main error type for hurdle operations.
#[derive(Debug, Error)]
pub enum HurdleError {
    /// A required column (or a field referenced by the metric expression)
    /// is absent from the input data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The metric expression string is malformed.
    #[error("Invalid metric expression: {0}")]
    MetricExpr(String),

    /// A date value does not match the expected `MM/DD/YYYY` format.
    #[error("Invalid date value: {0}")]
    DateParse(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// A specialized Result type for hurdle operations.
pub type Result<T> = std::result::Result<T, HurdleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HurdleError::MissingColumn("epsNtm".to_string());
        assert_eq!(err.to_string(), "Missing required column: epsNtm");

        let err = HurdleError::MetricExpr("a/b/c".to_string());
        assert_eq!(err.to_string(), "Invalid metric expression: a/b/c");

        let err = HurdleError::DateParse("2015-01-31".to_string());
        assert_eq!(err.to_string(), "Invalid date value: 2015-01-31");
    }

    #[test]
    fn test_result_type() {
        let ok_result: Result<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: Result<i32> = Err(HurdleError::InvalidData("fail".to_string()));
        assert!(err_result.is_err());
    }
}
