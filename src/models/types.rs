//! Error types shared by the partitioner, linear predictor, and evaluator.

use std::fmt;

use thiserror::Error;

use crate::input::InputError;

/// Semantic group a tagged parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterGroup {
    /// `zero_*` coefficients of the logistic part.
    Zero,
    /// `mean_*` coefficients of the marginal mean.
    Mean,
    /// The single `log_sigma` dispersion entry.
    LogSigma,
}

impl fmt::Display for ParameterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => f.write_str("zero_*"),
            Self::Mean => f.write_str("mean_*"),
            Self::LogSigma => f.write_str("log_sigma"),
        }
    }
}

/// Inputs outside the model's domain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("outcome at row {row} is negative ({value})")]
    NegativeOutcome { row: usize, value: f64 },
    #[error("weight at row {row} is negative ({value})")]
    NegativeWeight { row: usize, value: f64 },
    #[error("{what} contains non-finite values")]
    NonFiniteInput { what: &'static str },
    #[error("sigma = exp(log_sigma) must be strictly positive; log_sigma = {log_sigma}")]
    NonPositiveSigma { log_sigma: f64 },
}

/// Errors returned by marginal two-part likelihood evaluation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MarginalError {
    #[error("{what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("parameter group `{group}` is missing or malformed ({found} entries)")]
    MissingParameterGroup { group: ParameterGroup, found: usize },
    #[error("parameter name `{0}` matches none of zero_*, mean_*, log_sigma")]
    UnrecognizedParameterName(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("non-finite {stage} at row {row}")]
    NumericInstability { stage: &'static str, row: usize },
    #[error("non-finite {stage}")]
    NonFiniteTotal { stage: &'static str },
}

impl From<InputError> for MarginalError {
    fn from(value: InputError) -> Self {
        match value {
            InputError::EmptyDesign { what } => Self::DimensionMismatch {
                what,
                expected: 1,
                found: 0,
            },
            InputError::InvalidOutcomeShape { cols } => Self::DimensionMismatch {
                what: "outcome columns",
                expected: 1,
                found: cols,
            },
            InputError::InvalidWeightShape { cols } => Self::DimensionMismatch {
                what: "weight columns",
                expected: 1,
                found: cols,
            },
            InputError::DimensionMismatch { what, rows, len } => Self::DimensionMismatch {
                what,
                expected: len,
                found: rows,
            },
            InputError::NonFinite { what } => DomainError::NonFiniteInput { what }.into(),
            InputError::NegativeOutcome { row, value } => {
                DomainError::NegativeOutcome { row, value }.into()
            }
            InputError::NegativeWeight { row, value } => {
                DomainError::NegativeWeight { row, value }.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_map_to_domain_errors() {
        let err = MarginalError::from(InputError::NegativeOutcome { row: 3, value: -1.0 });
        assert_eq!(
            err,
            MarginalError::Domain(DomainError::NegativeOutcome { row: 3, value: -1.0 })
        );
    }

    #[test]
    fn input_shape_errors_map_to_dimension_mismatch() {
        let err = MarginalError::from(InputError::DimensionMismatch {
            what: "mean design rows",
            rows: 4,
            len: 5,
        });
        assert!(matches!(
            err,
            MarginalError::DimensionMismatch {
                expected: 5,
                found: 4,
                ..
            }
        ));
    }

    #[test]
    fn group_names_render_as_tags() {
        let err = MarginalError::MissingParameterGroup {
            group: ParameterGroup::LogSigma,
            found: 2,
        };
        assert!(err.to_string().contains("log_sigma"));
    }
}
