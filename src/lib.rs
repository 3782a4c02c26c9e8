#![forbid(unsafe_code)]

//! # `marginal_two_part`
//!
//! Negative log-likelihood of the marginalized two-part model for
//! non-negative semi-continuous outcomes: a logistic model for Pr(y > 0)
//! combined with a log-normal model for positive values, parameterized so
//! that the mean design models `ln E[y]` over all observations.
//!
//! The evaluator is a pure function of parameters and data, meant to be
//! driven by an external optimizer. It fails loudly on malformed parameter
//! tags, shape mismatches, out-of-domain inputs, and non-finite results.

pub mod input;
pub mod models;
pub mod preprocess;
pub mod utils;

pub use input::{InputError, MarginalInput};
pub use preprocess::{OutcomeDiagnostics, OutcomeSplit, outcome_diagnostics, split_outcome};
pub mod matrix_ops {
    pub use crate::models::matrix_ops::*;
}

pub use models::likelihood::{
    EvaluationOptions, PredictorScores, logistic_stable, negative_log_likelihood_from_predictors,
    observation_log_likelihood, predictor_scores, sigma_from_log, softplus,
};
pub use models::linear_predictor::{LinearPredictors, linear_predictors};
pub use models::marginal::{
    TwoPartGradient, evaluate, evaluate_gradient, evaluate_with_options, negative_log_likelihood,
    negative_log_likelihood_gradient, observation_contributions,
};
pub use models::parameters::{
    LOG_SIGMA, MEAN_PREFIX, MarginalPrediction, NamedParameter, ParameterVector,
    TwoPartParameters, ZERO_PREFIX,
};
pub use models::reference::reference_negative_log_likelihood;
pub use models::simulate::{SimulationOptions, simulate_marginal_two_part};
pub use models::types::{DomainError, MarginalError, ParameterGroup};
