//! # Model inputs
//!
//! Defines a light-weight container for the two design matrices, outcomes,
//! and optional observation weights of a marginal two-part model.
//!
//! # Examples
//!
//! ```
//! use faer::Mat;
//! use marginal_two_part::MarginalInput;
//!
//! fn idx_to_f64(idx: usize) -> f64 {
//!     f64::from(u32::try_from(idx).unwrap_or(u32::MAX))
//! }
//!
//! let zero_design = Mat::from_fn(3, 2, |i, j| if j == 0 { 1.0 } else { idx_to_f64(i) });
//! let mean_design = Mat::from_fn(3, 1, |_, _| 1.0);
//! let outcome = Mat::from_fn(3, 1, |i, _| idx_to_f64(i));
//! let input = MarginalInput::new(zero_design, mean_design, outcome);
//!
//! assert!(input.validate().is_ok());
//! ```
//!
//! ```
//! use faer::Mat;
//! use marginal_two_part::MarginalInput;
//!
//! let zero_design = Mat::from_fn(3, 1, |_, _| 1.0);
//! let mean_design = Mat::from_fn(2, 1, |_, _| 1.0);
//! let outcome = Mat::from_fn(3, 1, |_, _| 1.0);
//! let input = MarginalInput::new(zero_design, mean_design, outcome);
//!
//! assert!(input.validate().is_err());
//! ```

use faer::Mat;
use thiserror::Error;

use crate::models::matrix_ops::gather_rows;
use crate::utils::{first_row_where, matrix_is_finite};

/// Errors returned when validating model inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("{what} must have at least one column")]
    EmptyDesign { what: &'static str },
    #[error("outcome must be a single column matrix; found {cols} columns")]
    InvalidOutcomeShape { cols: usize },
    #[error("{what} ({rows}) must match outcome rows ({len})")]
    DimensionMismatch {
        what: &'static str,
        rows: usize,
        len: usize,
    },
    #[error("weights must be a single column matrix; found {cols} columns")]
    InvalidWeightShape { cols: usize },
    #[error("{what} contains non-finite values")]
    NonFinite { what: &'static str },
    #[error("outcome at row {row} is negative ({value})")]
    NegativeOutcome { row: usize, value: f64 },
    #[error("weight at row {row} is negative ({value})")]
    NegativeWeight { row: usize, value: f64 },
}

/// Design matrices, outcomes, and optional weights for one evaluation.
///
/// `zero_design` (Z) drives the logistic part, `mean_design` (X) the
/// marginal mean. Missing weights mean unit weights.
#[derive(Debug, Clone)]
pub struct MarginalInput {
    pub zero_design: Mat<f64>,
    pub mean_design: Mat<f64>,
    pub outcome: Mat<f64>,
    pub sample_weights: Option<Mat<f64>>,
}

impl MarginalInput {
    #[must_use]
    pub const fn new(zero_design: Mat<f64>, mean_design: Mat<f64>, outcome: Mat<f64>) -> Self {
        Self {
            zero_design,
            mean_design,
            outcome,
            sample_weights: None,
        }
    }

    #[must_use]
    pub fn with_sample_weights(mut self, sample_weights: Mat<f64>) -> Self {
        self.sample_weights = Some(sample_weights);
        self
    }

    #[must_use]
    pub const fn zero_design(&self) -> &Mat<f64> {
        &self.zero_design
    }

    #[must_use]
    pub const fn mean_design(&self) -> &Mat<f64> {
        &self.mean_design
    }

    #[must_use]
    pub const fn outcome(&self) -> &Mat<f64> {
        &self.outcome
    }

    #[must_use]
    pub const fn sample_weights(&self) -> Option<&Mat<f64>> {
        self.sample_weights.as_ref()
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.outcome.nrows()
    }

    /// Weight of row `row`, or `1.0` when no weights are attached.
    #[must_use]
    pub fn weight(&self, row: usize) -> f64 {
        self.sample_weights
            .as_ref()
            .map_or(1.0, |weights| weights[(row, 0)])
    }

    /// Keep only the given rows, in the given order.
    #[must_use]
    pub fn subset(&self, rows: &[usize]) -> Self {
        Self {
            zero_design: gather_rows(&self.zero_design, rows),
            mean_design: gather_rows(&self.mean_design, rows),
            outcome: gather_rows(&self.outcome, rows),
            sample_weights: self
                .sample_weights
                .as_ref()
                .map(|weights| gather_rows(weights, rows)),
        }
    }

    /// Validate design matrices and outcome only.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if core inputs are malformed.
    pub fn validate_core(&self) -> Result<(), InputError> {
        validate_columns(&self.zero_design, &self.mean_design, &self.outcome)
    }

    /// Validate shapes and values for designs, outcome, and weights.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if inputs are malformed.
    pub fn validate(&self) -> Result<(), InputError> {
        self.validate_core()?;
        if let Some(weights) = &self.sample_weights {
            validate_weights(weights, self.outcome.nrows())?;
        }
        Ok(())
    }
}

/// Shape, finiteness, and sign checks shared by every entry point.
pub(crate) fn validate_columns(
    zero_design: &Mat<f64>,
    mean_design: &Mat<f64>,
    outcome: &Mat<f64>,
) -> Result<(), InputError> {
    if zero_design.ncols() == 0 {
        return Err(InputError::EmptyDesign {
            what: "zero design",
        });
    }
    if mean_design.ncols() == 0 {
        return Err(InputError::EmptyDesign {
            what: "mean design",
        });
    }
    if outcome.ncols() != 1 {
        return Err(InputError::InvalidOutcomeShape {
            cols: outcome.ncols(),
        });
    }
    let len = outcome.nrows();
    if zero_design.nrows() != len {
        return Err(InputError::DimensionMismatch {
            what: "zero design rows",
            rows: zero_design.nrows(),
            len,
        });
    }
    if mean_design.nrows() != len {
        return Err(InputError::DimensionMismatch {
            what: "mean design rows",
            rows: mean_design.nrows(),
            len,
        });
    }
    if !matrix_is_finite(zero_design) {
        return Err(InputError::NonFinite {
            what: "zero design",
        });
    }
    if !matrix_is_finite(mean_design) {
        return Err(InputError::NonFinite {
            what: "mean design",
        });
    }
    if !matrix_is_finite(outcome) {
        return Err(InputError::NonFinite { what: "outcome" });
    }
    if let Some(row) = first_row_where(outcome, |value| value < 0.0) {
        return Err(InputError::NegativeOutcome {
            row,
            value: outcome[(row, 0)],
        });
    }
    Ok(())
}

pub(crate) fn validate_weights(weights: &Mat<f64>, len: usize) -> Result<(), InputError> {
    if weights.ncols() != 1 {
        return Err(InputError::InvalidWeightShape {
            cols: weights.ncols(),
        });
    }
    if weights.nrows() != len {
        return Err(InputError::DimensionMismatch {
            what: "weight rows",
            rows: weights.nrows(),
            len,
        });
    }
    if !matrix_is_finite(weights) {
        return Err(InputError::NonFinite { what: "weights" });
    }
    if let Some(row) = first_row_where(weights, |value| value < 0.0) {
        return Err(InputError::NegativeWeight {
            row,
            value: weights[(row, 0)],
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ones(rows: usize, cols: usize) -> Mat<f64> {
        Mat::from_fn(rows, cols, |_i, _j| 1.0)
    }

    #[test]
    fn validate_rejects_negative_outcomes() {
        let outcome = Mat::from_fn(3, 1, |i, _| if i == 1 { -2.0 } else { 0.0 });
        let input = MarginalInput::new(ones(3, 1), ones(3, 1), outcome);
        let err = input
            .validate_core()
            .expect_err("negative outcome should fail");
        assert_eq!(err, InputError::NegativeOutcome { row: 1, value: -2.0 });
    }

    #[test]
    fn validate_accepts_zero_weights() {
        let weights = Mat::from_fn(2, 1, |i, _| if i == 0 { 1.0 } else { 0.0 });
        let input = MarginalInput::new(ones(2, 1), ones(2, 1), ones(2, 1))
            .with_sample_weights(weights);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_weights() {
        let weights = Mat::from_fn(2, 1, |i, _| if i == 0 { 1.0 } else { -0.5 });
        let input = MarginalInput::new(ones(2, 1), ones(2, 1), ones(2, 1))
            .with_sample_weights(weights);
        let err = input.validate().expect_err("negative weight should fail");
        assert_eq!(err, InputError::NegativeWeight { row: 1, value: -0.5 });
    }

    #[test]
    fn validate_rejects_empty_designs() {
        let input = MarginalInput::new(Mat::<f64>::zeros(2, 0), ones(2, 1), ones(2, 1));
        let err = input.validate_core().expect_err("empty zero design");
        assert_eq!(err, InputError::EmptyDesign { what: "zero design" });

        let input = MarginalInput::new(ones(2, 1), Mat::<f64>::zeros(2, 0), ones(2, 1));
        let err = input.validate_core().expect_err("empty mean design");
        assert_eq!(err, InputError::EmptyDesign { what: "mean design" });
    }

    #[test]
    fn validate_rejects_invalid_outcome_shape() {
        let input = MarginalInput::new(ones(2, 1), ones(2, 1), ones(2, 2));
        let err = input
            .validate_core()
            .expect_err("multi-column outcome should fail");
        assert_eq!(err, InputError::InvalidOutcomeShape { cols: 2 });
    }

    #[test]
    fn validate_rejects_row_mismatch() {
        let input = MarginalInput::new(ones(3, 1), ones(2, 1), ones(3, 1));
        let err = input.validate_core().expect_err("row mismatch should fail");
        assert_eq!(
            err,
            InputError::DimensionMismatch {
                what: "mean design rows",
                rows: 2,
                len: 3
            }
        );
    }

    #[test]
    fn validate_rejects_non_finite_values() {
        let design = Mat::from_fn(2, 1, |i, _j| if i == 0 { f64::NAN } else { 1.0 });
        let input = MarginalInput::new(design, ones(2, 1), ones(2, 1));
        let err = input.validate_core().expect_err("NaN design should fail");
        assert_eq!(err, InputError::NonFinite { what: "zero design" });

        let outcome = Mat::from_fn(2, 1, |i, _| if i == 0 { f64::INFINITY } else { 1.0 });
        let input = MarginalInput::new(ones(2, 1), ones(2, 1), outcome);
        let err = input.validate_core().expect_err("infinite outcome should fail");
        assert_eq!(err, InputError::NonFinite { what: "outcome" });
    }

    #[test]
    fn validate_rejects_invalid_weight_shape() {
        let input = MarginalInput::new(ones(3, 1), ones(3, 1), ones(3, 1))
            .with_sample_weights(ones(2, 1));
        let err = input
            .validate()
            .expect_err("invalid weight shape should fail");
        assert_eq!(
            err,
            InputError::DimensionMismatch {
                what: "weight rows",
                rows: 2,
                len: 3
            }
        );
    }

    #[test]
    fn subset_selects_rows_across_all_parts() {
        let zero_design = Mat::from_fn(4, 1, |i, _| [0.0, 1.0, 2.0, 3.0][i]);
        let outcome = Mat::from_fn(4, 1, |i, _| [0.0, 1.5, 0.0, 4.0][i]);
        let weights = Mat::from_fn(4, 1, |i, _| [1.0, 2.0, 3.0, 4.0][i]);
        let input =
            MarginalInput::new(zero_design, ones(4, 1), outcome).with_sample_weights(weights);

        let subset = input.subset(&[3, 1]);
        assert_eq!(subset.n_rows(), 2);
        assert_relative_eq!(subset.zero_design[(0, 0)], 3.0);
        assert_relative_eq!(subset.outcome[(1, 0)], 1.5);
        assert_relative_eq!(subset.weight(0), 4.0);
    }

    #[test]
    fn missing_weights_default_to_one() {
        let input = MarginalInput::new(ones(2, 1), ones(2, 1), ones(2, 1));
        assert_relative_eq!(input.weight(1), 1.0);
    }
}
