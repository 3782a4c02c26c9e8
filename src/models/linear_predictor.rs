//! Linear predictors of the zero part (`p0 = Z·alpha`) and the marginal mean
//! (`v = X·beta`).

use faer::Mat;

use super::matrix_ops::mat_vec;
use super::parameters::TwoPartParameters;
use super::types::MarginalError;

/// Per-observation linear predictors for both parts.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPredictors {
    /// Logit of Pr(y > 0).
    pub zero: Vec<f64>,
    /// Log of the marginal mean E[y].
    pub mean: Vec<f64>,
}

impl LinearPredictors {
    #[must_use]
    pub fn len(&self) -> usize {
        self.zero.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zero.is_empty()
    }
}

/// Compute `Z·alpha` and `X·beta`.
///
/// # Errors
///
/// - `DimensionMismatch` if a design's column count differs from its
///   coefficient group, or the designs disagree on the number of rows.
/// - `NumericInstability` if a finite design produces a non-finite predictor.
pub fn linear_predictors(
    parameters: &TwoPartParameters,
    zero_design: &Mat<f64>,
    mean_design: &Mat<f64>,
) -> Result<LinearPredictors, MarginalError> {
    if zero_design.ncols() != parameters.zero_coefficients.len() {
        return Err(MarginalError::DimensionMismatch {
            what: "zero design columns",
            expected: parameters.zero_coefficients.len(),
            found: zero_design.ncols(),
        });
    }
    if mean_design.ncols() != parameters.mean_coefficients.len() {
        return Err(MarginalError::DimensionMismatch {
            what: "mean design columns",
            expected: parameters.mean_coefficients.len(),
            found: mean_design.ncols(),
        });
    }
    if zero_design.nrows() != mean_design.nrows() {
        return Err(MarginalError::DimensionMismatch {
            what: "mean design rows",
            expected: zero_design.nrows(),
            found: mean_design.nrows(),
        });
    }

    let zero = mat_vec(zero_design, &parameters.zero_coefficients);
    if let Some(row) = zero.iter().position(|value| !value.is_finite()) {
        log::warn!("zero-part linear predictor overflowed at row {row}");
        return Err(MarginalError::NumericInstability {
            stage: "zero linear predictor",
            row,
        });
    }
    let mean = mat_vec(mean_design, &parameters.mean_coefficients);
    if let Some(row) = mean.iter().position(|value| !value.is_finite()) {
        log::warn!("mean-part linear predictor overflowed at row {row}");
        return Err(MarginalError::NumericInstability {
            stage: "mean linear predictor",
            row,
        });
    }

    Ok(LinearPredictors { zero, mean })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn predictors_are_row_dot_products() {
        let parameters = TwoPartParameters::new(vec![0.5, -1.0], vec![2.0], 0.0);
        let z = Mat::from_fn(3, 2, |i, j| if j == 0 { 1.0 } else { [0.0, 1.0, 2.0][i] });
        let x = Mat::from_fn(3, 1, |i, _| [1.0, -1.0, 0.25][i]);
        let predictors = linear_predictors(&parameters, &z, &x).expect("shapes match");
        assert_eq!(predictors.len(), 3);
        assert_relative_eq!(predictors.zero[0], 0.5);
        assert_relative_eq!(predictors.zero[1], -0.5);
        assert_relative_eq!(predictors.zero[2], -1.5);
        assert_relative_eq!(predictors.mean[1], -2.0);
        assert_relative_eq!(predictors.mean[2], 0.5);
    }

    #[test]
    fn column_mismatch_is_reported() {
        let parameters = TwoPartParameters::new(vec![0.5], vec![2.0], 0.0);
        let z = Mat::from_fn(3, 2, |_i, _j| 1.0);
        let x = Mat::from_fn(3, 1, |_i, _j| 1.0);
        let err = linear_predictors(&parameters, &z, &x).expect_err("zero columns differ");
        assert_eq!(
            err,
            MarginalError::DimensionMismatch {
                what: "zero design columns",
                expected: 1,
                found: 2
            }
        );

        let z = Mat::from_fn(3, 1, |_i, _j| 1.0);
        let x = Mat::from_fn(3, 3, |_i, _j| 1.0);
        let err = linear_predictors(&parameters, &z, &x).expect_err("mean columns differ");
        assert!(matches!(
            err,
            MarginalError::DimensionMismatch {
                what: "mean design columns",
                ..
            }
        ));
    }

    #[test]
    fn overflowing_predictor_is_rejected() {
        let parameters = TwoPartParameters::new(vec![1.0e10], vec![0.0], 0.0);
        let z = Mat::from_fn(2, 1, |i, _| if i == 1 { 1.0e300 } else { 1.0 });
        let x = Mat::from_fn(2, 1, |_i, _j| 1.0);
        let err = linear_predictors(&parameters, &z, &x).expect_err("overflow");
        assert_eq!(
            err,
            MarginalError::NumericInstability {
                stage: "zero linear predictor",
                row: 1
            }
        );
    }
}
