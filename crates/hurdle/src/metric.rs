//! Metric expression parsing and evaluation.
//!
//! A screening metric is either a raw fundamental field (`roe`, `pB`) or a
//! ratio of two fields written `numerator/denominator` (`price/epsNtm`).
//! Expressions are parsed once, up front, so a malformed expression fails
//! before any data is touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HurdleError, Result};

/// The separator character splitting a ratio expression into its two fields.
pub const RATIO_SEPARATOR: char = '/';

/// A parsed screening metric.
///
/// # Example
///
/// ```
/// use hurdle::MetricSpec;
///
/// let pe: MetricSpec = "price/epsNtm".parse().unwrap();
/// assert_eq!(pe.fields(), vec!["price", "epsNtm"]);
///
/// let pb: MetricSpec = "pB".parse().unwrap();
/// assert_eq!(pb.fields(), vec!["pB"]);
///
/// assert!("a/b/c".parse::<MetricSpec>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricSpec {
    /// A single fundamental field used directly as the metric value.
    Field(String),
    /// A ratio of two fields, evaluated as `numerator / denominator`.
    Ratio {
        /// Field supplying the numerator.
        numerator: String,
        /// Field supplying the denominator.
        denominator: String,
    },
}

impl MetricSpec {
    /// The column names this expression references, numerator first.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Field(name) => vec![name.as_str()],
            Self::Ratio {
                numerator,
                denominator,
            } => vec![numerator.as_str(), denominator.as_str()],
        }
    }

    /// Evaluate the metric for one observation given the referenced field
    /// values, in the order returned by [`fields`](Self::fields).
    ///
    /// Division by zero or a NaN operand yields NaN, never an error: an
    /// observation without a measurable metric is simply not screenable.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        match self {
            Self::Field(_) => values[0],
            Self::Ratio { .. } => {
                let (num, den) = (values[0], values[1]);
                if den == 0.0 { f64::NAN } else { num / den }
            }
        }
    }

    /// The expression text with the separator replaced by an underscore,
    /// suitable for use as an output file stem (`price/epsNtm` →
    /// `price_epsNtm`).
    pub fn file_stem(&self) -> String {
        self.to_string().replace(RATIO_SEPARATOR, "_")
    }
}

impl FromStr for MetricSpec {
    type Err = HurdleError;

    fn from_str(expr: &str) -> Result<Self> {
        let parts: Vec<&str> = expr.split(RATIO_SEPARATOR).collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(HurdleError::MetricExpr(expr.to_string()));
        }
        match parts.as_slice() {
            [field] => Ok(Self::Field((*field).to_string())),
            [numerator, denominator] => Ok(Self::Ratio {
                numerator: (*numerator).to_string(),
                denominator: (*denominator).to_string(),
            }),
            _ => Err(HurdleError::MetricExpr(expr.to_string())),
        }
    }
}

impl fmt::Display for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{}", name),
            Self::Ratio {
                numerator,
                denominator,
            } => write!(f, "{}{}{}", numerator, RATIO_SEPARATOR, denominator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_ratio() {
        let spec: MetricSpec = "price/epsNtm".parse().unwrap();
        assert_eq!(
            spec,
            MetricSpec::Ratio {
                numerator: "price".to_string(),
                denominator: "epsNtm".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_field() {
        let spec: MetricSpec = "pB".parse().unwrap();
        assert_eq!(spec, MetricSpec::Field("pB".to_string()));
    }

    #[test]
    fn test_parse_rejects_multiple_separators() {
        assert!("a/b/c".parse::<MetricSpec>().is_err());
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!("".parse::<MetricSpec>().is_err());
        assert!("/epsNtm".parse::<MetricSpec>().is_err());
        assert!("price/".parse::<MetricSpec>().is_err());
        assert!("/".parse::<MetricSpec>().is_err());
    }

    #[test]
    fn test_evaluate_field() {
        let spec: MetricSpec = "roe".parse().unwrap();
        assert_relative_eq!(spec.evaluate(&[36.9]), 36.9);
    }

    #[test]
    fn test_evaluate_ratio() {
        let spec: MetricSpec = "price/epsNtm".parse().unwrap();
        assert_relative_eq!(spec.evaluate(&[117.16, 8.65]), 117.16 / 8.65);
    }

    #[test]
    fn test_evaluate_ratio_division_by_zero() {
        let spec: MetricSpec = "price/epsNtm".parse().unwrap();
        assert!(spec.evaluate(&[117.16, 0.0]).is_nan());
    }

    #[test]
    fn test_evaluate_ratio_nan_operand() {
        let spec: MetricSpec = "price/epsNtm".parse().unwrap();
        assert!(spec.evaluate(&[f64::NAN, 8.65]).is_nan());
        assert!(spec.evaluate(&[117.16, f64::NAN]).is_nan());
    }

    #[test]
    fn test_display_round_trip() {
        for expr in ["price/epsNtm", "entrVal/ebitdaNtm", "roe", "pB"] {
            let spec: MetricSpec = expr.parse().unwrap();
            assert_eq!(spec.to_string(), expr);
        }
    }

    #[test]
    fn test_file_stem() {
        let spec: MetricSpec = "price/epsNtm".parse().unwrap();
        assert_eq!(spec.file_stem(), "price_epsNtm");

        let spec: MetricSpec = "roe".parse().unwrap();
        assert_eq!(spec.file_stem(), "roe");
    }
}
