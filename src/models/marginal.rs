/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Marginalized two-part model: logistic zero part + log-normal positive part.
//
// Created on: 19 Oct 2026
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Marginal two-part model
//!
//! Public entry points for the marginalized logistic + log-normal model:
//! - Part 1: logistic regression for Pr(y > 0), driven by the zero design.
//! - Part 2: log-normal positive outcomes whose location is chosen so that
//!   `ln E[y] = X·beta` holds over all rows.
//!
//! Every entry point validates inputs, computes the linear predictors, and
//! runs the kernel in [`super::likelihood`]. Nothing is retained between
//! calls.

use faer::Mat;

use super::likelihood::{
    EvaluationOptions, negative_log_likelihood_from_predictors, observation_log_likelihood,
    predictor_scores,
};
use super::linear_predictor::linear_predictors;
use super::matrix_ops::transpose_mat_vec;
use super::parameters::{ParameterVector, TwoPartParameters};
use super::types::MarginalError;
use crate::input::{MarginalInput, validate_columns, validate_weights};

/// Gradient of the negative log-likelihood, grouped like [`TwoPartParameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct TwoPartGradient {
    pub zero: Vec<f64>,
    pub mean: Vec<f64>,
    pub log_sigma: f64,
}

impl TwoPartGradient {
    #[must_use]
    pub fn to_parameters(&self) -> TwoPartParameters {
        TwoPartParameters::new(self.zero.clone(), self.mean.clone(), self.log_sigma)
    }

    /// Flat gradient in `zero, mean, log_sigma` order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.to_parameters().to_vec()
    }

    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.to_vec().iter().fold(0.0, |acc, g| acc.max(g.abs()))
    }
}

fn validate(
    outcome: &Mat<f64>,
    zero_design: &Mat<f64>,
    mean_design: &Mat<f64>,
    weights: Option<&Mat<f64>>,
) -> Result<(), MarginalError> {
    validate_columns(zero_design, mean_design, outcome)?;
    if let Some(weights) = weights {
        validate_weights(weights, outcome.nrows())?;
    }
    Ok(())
}

fn nll(
    parameters: &TwoPartParameters,
    outcome: &Mat<f64>,
    zero_design: &Mat<f64>,
    mean_design: &Mat<f64>,
    weights: Option<&Mat<f64>>,
    options: EvaluationOptions,
) -> Result<f64, MarginalError> {
    validate(outcome, zero_design, mean_design, weights)?;
    let predictors = linear_predictors(parameters, zero_design, mean_design)?;
    negative_log_likelihood_from_predictors(
        &predictors,
        outcome,
        weights,
        parameters.log_sigma,
        options,
    )
}

fn gradient(
    parameters: &TwoPartParameters,
    outcome: &Mat<f64>,
    zero_design: &Mat<f64>,
    mean_design: &Mat<f64>,
    weights: Option<&Mat<f64>>,
) -> Result<TwoPartGradient, MarginalError> {
    validate(outcome, zero_design, mean_design, weights)?;
    let predictors = linear_predictors(parameters, zero_design, mean_design)?;
    let scores = predictor_scores(&predictors, outcome, weights, parameters.log_sigma)?;
    let negate = |values: Vec<f64>| values.into_iter().map(|g| -g).collect::<Vec<_>>();
    Ok(TwoPartGradient {
        zero: negate(transpose_mat_vec(zero_design, &scores.zero)),
        mean: negate(transpose_mat_vec(mean_design, &scores.mean)),
        log_sigma: -scores.log_sigma,
    })
}

/// Negative marginal log-likelihood for a tagged parameter vector.
///
/// `parameters` holds `zero_*` entries aligned with the columns of `z`,
/// `mean_*` entries aligned with the columns of `x`, and one `log_sigma`.
///
/// # Errors
///
/// Returns `MarginalError` if the parameters do not partition, shapes are
/// inconsistent, an outcome or weight is negative, or the result is not finite.
///
/// # Examples
///
/// ```
/// use faer::Mat;
/// use marginal_two_part::{ParameterVector, evaluate};
///
/// let parameters: ParameterVector = [
///     ("zero_(Intercept)", 0.0),
///     ("mean_(Intercept)", 0.5),
///     ("log_sigma", 0.0),
/// ]
/// .into_iter()
/// .collect();
/// let y = Mat::from_fn(4, 1, |i, _| if i % 2 == 0 { 0.0 } else { 1.5 });
/// let z = Mat::from_fn(4, 1, |_, _| 1.0);
/// let x = Mat::from_fn(4, 1, |_, _| 1.0);
/// let w = Mat::from_fn(4, 1, |_, _| 1.0);
///
/// let nll = evaluate(&parameters, &y, &z, &x, &w).expect("valid inputs");
/// assert!(nll.is_finite());
/// ```
pub fn evaluate(
    parameters: &ParameterVector,
    y: &Mat<f64>,
    z: &Mat<f64>,
    x: &Mat<f64>,
    w: &Mat<f64>,
) -> Result<f64, MarginalError> {
    evaluate_with_options(parameters, y, z, x, w, EvaluationOptions::default())
}

/// [`evaluate`] with explicit [`EvaluationOptions`].
///
/// # Errors
///
/// Same conditions as [`evaluate`].
pub fn evaluate_with_options(
    parameters: &ParameterVector,
    y: &Mat<f64>,
    z: &Mat<f64>,
    x: &Mat<f64>,
    w: &Mat<f64>,
    options: EvaluationOptions,
) -> Result<f64, MarginalError> {
    let parameters = parameters.partition()?;
    nll(&parameters, y, z, x, Some(w), options)
}

/// Gradient of [`evaluate`], returned with the names and order of `parameters`.
///
/// # Errors
///
/// Same conditions as [`evaluate`].
pub fn evaluate_gradient(
    parameters: &ParameterVector,
    y: &Mat<f64>,
    z: &Mat<f64>,
    x: &Mat<f64>,
    w: &Mat<f64>,
) -> Result<ParameterVector, MarginalError> {
    let structured = parameters.partition()?;
    let grad = gradient(&structured, y, z, x, Some(w))?;
    parameters.with_values(&grad.to_parameters())
}

/// Negative marginal log-likelihood for structured parameters.
///
/// # Errors
///
/// Returns `MarginalError` if inputs are malformed or the result is not finite.
///
/// # Examples
///
/// ```
/// use faer::Mat;
/// use marginal_two_part::{
///     EvaluationOptions, MarginalInput, TwoPartParameters, negative_log_likelihood,
/// };
///
/// let input = MarginalInput::new(
///     Mat::from_fn(3, 1, |_, _| 1.0),
///     Mat::from_fn(3, 1, |_, _| 1.0),
///     Mat::from_fn(3, 1, |i, _| [0.0, 2.0, 0.5][i]),
/// );
/// let parameters = TwoPartParameters::new(vec![0.2], vec![0.1], -0.3);
/// let nll = negative_log_likelihood(&parameters, &input, EvaluationOptions::default())
///     .expect("valid inputs");
/// assert!(nll > 0.0);
/// ```
pub fn negative_log_likelihood(
    parameters: &TwoPartParameters,
    input: &MarginalInput,
    options: EvaluationOptions,
) -> Result<f64, MarginalError> {
    nll(
        parameters,
        &input.outcome,
        &input.zero_design,
        &input.mean_design,
        input.sample_weights.as_ref(),
        options,
    )
}

/// Gradient of [`negative_log_likelihood`] with respect to alpha, beta, and `log_sigma`.
///
/// # Errors
///
/// Returns `MarginalError` if inputs are malformed or a derivative is not finite.
pub fn negative_log_likelihood_gradient(
    parameters: &TwoPartParameters,
    input: &MarginalInput,
) -> Result<TwoPartGradient, MarginalError> {
    gradient(
        parameters,
        &input.outcome,
        &input.zero_design,
        &input.mean_design,
        input.sample_weights.as_ref(),
    )
}

/// Weighted log-likelihood contribution of every observation.
///
/// # Errors
///
/// Returns `MarginalError` if inputs are malformed or a contribution is not finite.
pub fn observation_contributions(
    parameters: &TwoPartParameters,
    input: &MarginalInput,
) -> Result<Vec<f64>, MarginalError> {
    input.validate()?;
    let predictors = linear_predictors(parameters, &input.zero_design, &input.mean_design)?;
    observation_log_likelihood(
        &predictors,
        &input.outcome,
        input.sample_weights.as_ref(),
        parameters.log_sigma,
    )
}
