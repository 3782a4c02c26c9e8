//! # Models
//!
//! The marginalized logistic + log-normal two-part model: parameter
//! partitioning, linear predictors, the likelihood kernel, and the public
//! entry points built on them. Also carries a row-by-row reference
//! evaluator and a synthetic data generator used for cross-checks.

pub mod likelihood;
pub mod linear_predictor;
pub mod marginal;
pub mod matrix_ops;
pub mod parameters;
pub mod reference;
pub mod simulate;
pub mod types;
