//! Synthetic data drawn from the marginal two-part model.
//!
//! Designs are an intercept column followed by standard-normal covariates.
//! A row is positive with probability `logistic(p0)`; positive values are
//! log-normal with location `v - ln logistic(p0) - sigma^2 / 2`, so that
//! `E[y] = exp(v)`.

use faer::Mat;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use super::likelihood::{logistic_stable, softplus};
use super::linear_predictor::linear_predictors;
use super::parameters::TwoPartParameters;
use super::types::MarginalError;
use crate::input::MarginalInput;

/// Settings for synthetic data generation.
#[derive(Debug, Clone, Copy)]
pub struct SimulationOptions {
    /// Number of observations.
    pub rows: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
    /// Attach weights drawn uniformly from `[0.5, 1.5)`.
    pub random_weights: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            rows: 500,
            seed: 42,
            random_weights: false,
        }
    }
}

fn sample_standard_normal(rng: &mut StdRng) -> f64 {
    let u1 = (1.0_f64 - rng.random::<f64>()).max(f64::MIN_POSITIVE);
    let u2 = rng.random::<f64>();
    (-2.0_f64 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

fn design_with_intercept(rng: &mut StdRng, rows: usize, cols: usize) -> Mat<f64> {
    let mut design = Mat::<f64>::zeros(rows, cols);
    for i in 0..rows {
        design[(i, 0)] = 1.0;
        for j in 1..cols {
            design[(i, j)] = sample_standard_normal(rng);
        }
    }
    design
}

/// Draw a [`MarginalInput`] from the model at `parameters`.
///
/// # Errors
///
/// Returns `MarginalError` if a coefficient group is empty or `log_sigma`
/// does not give a usable sigma.
pub fn simulate_marginal_two_part(
    parameters: &TwoPartParameters,
    options: SimulationOptions,
) -> Result<MarginalInput, MarginalError> {
    let k1 = parameters.zero_coefficients.len();
    let k2 = parameters.mean_coefficients.len();
    if k1 == 0 || k2 == 0 {
        return Err(MarginalError::DimensionMismatch {
            what: if k1 == 0 {
                "zero coefficients"
            } else {
                "mean coefficients"
            },
            expected: 1,
            found: 0,
        });
    }
    let sigma = parameters.sigma()?;

    let mut rng = StdRng::seed_from_u64(options.seed);
    let zero_design = design_with_intercept(&mut rng, options.rows, k1);
    let mean_design = design_with_intercept(&mut rng, options.rows, k2);
    let predictors = linear_predictors(parameters, &zero_design, &mean_design)?;

    let mut outcome = Mat::<f64>::zeros(options.rows, 1);
    for i in 0..options.rows {
        let p0 = predictors.zero[i];
        if rng.random::<f64>() < logistic_stable(p0) {
            // ln logistic(p0) = -softplus(-p0)
            let location = predictors.mean[i] + softplus(-p0) - 0.5 * sigma * sigma;
            outcome[(i, 0)] = sigma.mul_add(sample_standard_normal(&mut rng), location).exp();
        }
    }

    let mut input = MarginalInput::new(zero_design, mean_design, outcome);
    if options.random_weights {
        let mut weights = Mat::<f64>::zeros(options.rows, 1);
        for i in 0..options.rows {
            weights[(i, 0)] = rng.random_range(0.5..1.5);
        }
        input = input.with_sample_weights(weights);
    }
    log::debug!("simulated {} rows with seed {}", options.rows, options.seed);
    Ok(input)
}
