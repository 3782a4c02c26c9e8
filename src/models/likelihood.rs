/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Marginal log-likelihood kernel for the logistic + log-normal two-part model.
//
// Created on: 19 Oct 2026
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Marginal likelihood kernel
//!
//! Evaluates the marginalized two-part log-likelihood (Smith et al., 2014)
//! from precomputed linear predictors:
//!
//! ```text
//! ll = sum_i  -w_i softplus(p0_i)
//!    + sum_{y_i > 0} w_i [ p0_i - ln y_i - ln(2 pi)/2 - ln sigma - r_i^2 / (2 sigma^2) ]
//! r_i = ln y_i + p0_i - softplus(p0_i) + sigma^2 / 2 - v_i
//! ```
//!
//! `v` models `ln E[y]` over all rows, so the positive part is a log-normal
//! with location `v - ln logistic(p0) - sigma^2 / 2`.
//!
//! A row with zero weight contributes exactly zero, even where its own term
//! is not finite.
//!
//! Rows can be split into contiguous chunks evaluated on scoped threads;
//! chunk totals are reduced in chunk order so results are reproducible for a
//! given [`EvaluationOptions`].

use std::f64::consts::TAU;
use std::ops::Range;

use faer::Mat;

use super::linear_predictor::LinearPredictors;
use super::types::{DomainError, MarginalError};
use crate::input::validate_weights;
use crate::preprocess::{OutcomeSplit, split_outcome};

/// Evaluation settings.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationOptions {
    /// Worker threads for one evaluation (`0` and `1` both mean serial).
    pub threads: usize,
    /// Smallest chunk handed to a worker thread.
    pub min_rows_per_thread: usize,
    /// Skip zero-weight rows without evaluating their terms. The result is
    /// the same either way.
    pub skip_zero_weights: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            min_rows_per_thread: 2_048,
            skip_zero_weights: false,
        }
    }
}

impl EvaluationOptions {
    #[must_use]
    pub fn parallel(threads: usize) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }

    fn chunk_size(self, rows: usize) -> usize {
        let threads = self.threads.max(1);
        let floor = self.min_rows_per_thread.max(1);
        if threads == 1 || rows < 2 * floor {
            return rows.max(1);
        }
        rows.div_ceil(threads).max(floor)
    }
}

/// Numerically stable `ln(1 + exp(t))`.
#[must_use]
pub fn softplus(t: f64) -> f64 {
    if t > 0.0 {
        t + (-t).exp().ln_1p()
    } else {
        t.exp().ln_1p()
    }
}

/// Stable logistic transform.
#[must_use]
pub fn logistic_stable(value: f64) -> f64 {
    if value >= 0.0 {
        let z = (-value).exp();
        1.0 / (1.0 + z)
    } else {
        let z = value.exp();
        z / (1.0 + z)
    }
}

/// `sigma = exp(log_sigma)`.
///
/// # Errors
///
/// - `Domain(NonFiniteInput)` if `log_sigma` is NaN or infinite.
/// - `Domain(NonPositiveSigma)` if `exp(log_sigma)` underflows to zero.
/// - `NonFiniteTotal` if `exp(log_sigma)` overflows.
pub fn sigma_from_log(log_sigma: f64) -> Result<f64, MarginalError> {
    if !log_sigma.is_finite() {
        return Err(DomainError::NonFiniteInput { what: "log_sigma" }.into());
    }
    let sigma = log_sigma.exp();
    if sigma <= 0.0 {
        log::warn!("sigma underflows to zero for log_sigma = {log_sigma}");
        return Err(DomainError::NonPositiveSigma { log_sigma }.into());
    }
    if !sigma.is_finite() {
        log::warn!("sigma overflows for log_sigma = {log_sigma}");
        return Err(MarginalError::NonFiniteTotal { stage: "sigma" });
    }
    Ok(sigma)
}

/// `weight * term`; a zero weight gives exactly `0.0` whatever `term` is.
fn weighted(weight: f64, term: f64) -> f64 {
    if weight == 0.0 { 0.0 } else { weight * term }
}

/// Derivatives of the log-likelihood with respect to the per-row predictors.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorScores {
    /// `d ll / d p0_i`.
    pub zero: Vec<f64>,
    /// `d ll / d v_i`.
    pub mean: Vec<f64>,
    /// `d ll / d log_sigma`.
    pub log_sigma: f64,
}

/// Per-row arithmetic shared by the total, the contributions, and the scores.
#[derive(Debug, Clone, Copy)]
struct RowKernel {
    log_sigma: f64,
    sigma_sq: f64,
}

impl RowKernel {
    fn new(log_sigma: f64) -> Result<Self, MarginalError> {
        let sigma = sigma_from_log(log_sigma)?;
        Ok(Self {
            log_sigma,
            sigma_sq: sigma * sigma,
        })
    }

    fn residual(self, p0: f64, v: f64, log_y: f64) -> f64 {
        log_y + p0 - softplus(p0) + 0.5 * self.sigma_sq - v
    }

    fn zero_term(p0: f64) -> f64 {
        -softplus(p0)
    }

    fn positive_term(self, p0: f64, v: f64, log_y: f64) -> f64 {
        let r = self.residual(p0, v, log_y);
        p0 - log_y - 0.5 * TAU.ln() - self.log_sigma - r * r / (2.0 * self.sigma_sq)
    }
}

/// Borrowed view of everything one evaluation reads.
struct Evaluation<'a> {
    kernel: RowKernel,
    zero: &'a [f64],
    mean: &'a [f64],
    split: &'a OutcomeSplit,
    weights: Option<&'a Mat<f64>>,
    skip_zero_weights: bool,
}

impl Evaluation<'_> {
    fn weight(&self, row: usize) -> f64 {
        self.weights.map_or(1.0, |weights| weights[(row, 0)])
    }

    fn skips(&self, weight: f64) -> bool {
        self.skip_zero_weights && weight == 0.0
    }

    /// Log-likelihood of rows `rows`, whose positive entries are
    /// `split.positive_rows[positives]`.
    fn chunk_total(
        &self,
        rows: Range<usize>,
        positives: Range<usize>,
    ) -> Result<f64, MarginalError> {
        let mut total = 0.0;
        for row in rows {
            let weight = self.weight(row);
            if self.skips(weight) {
                continue;
            }
            let term = weighted(weight, RowKernel::zero_term(self.zero[row]));
            if !term.is_finite() {
                log::warn!("non-finite zero-part term at row {row}");
                return Err(MarginalError::NumericInstability {
                    stage: "zero-part term",
                    row,
                });
            }
            total += term;
        }

        for idx in positives {
            let row = self.split.positive_rows[idx];
            let weight = self.weight(row);
            if self.skips(weight) {
                continue;
            }
            let term = weighted(
                weight,
                self.kernel
                    .positive_term(self.zero[row], self.mean[row], self.split.log_outcomes[idx]),
            );
            if !term.is_finite() {
                log::warn!("non-finite positive-part term at row {row}");
                return Err(MarginalError::NumericInstability {
                    stage: "positive-part term",
                    row,
                });
            }
            total += term;
        }
        Ok(total)
    }

    fn positives_in(&self, rows: &Range<usize>) -> Range<usize> {
        let positive_rows = &self.split.positive_rows;
        let start = positive_rows.partition_point(|&row| row < rows.start);
        let end = positive_rows.partition_point(|&row| row < rows.end);
        start..end
    }

    fn total(&self, options: EvaluationOptions) -> Result<f64, MarginalError> {
        let rows = self.zero.len();
        let chunk_size = options.chunk_size(rows);
        let chunks: Vec<Range<usize>> = (0..rows)
            .step_by(chunk_size)
            .map(|start| start..(start + chunk_size).min(rows))
            .collect();
        log::debug!(
            "evaluating {rows} rows ({} positive) in {} chunk(s)",
            self.split.n_positive(),
            chunks.len().max(1)
        );

        if chunks.len() <= 1 {
            return self.chunk_total(0..rows, 0..self.split.n_positive());
        }

        let partials = std::thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .iter()
                .map(|chunk| {
                    let positives = self.positives_in(chunk);
                    let chunk = chunk.clone();
                    scope.spawn(move || self.chunk_total(chunk, positives))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect::<Vec<_>>()
        });

        let mut total = 0.0;
        for partial in partials {
            total += partial?;
        }
        Ok(total)
    }
}

fn check_inputs(
    predictors: &LinearPredictors,
    outcome: &Mat<f64>,
    weights: Option<&Mat<f64>>,
) -> Result<(), MarginalError> {
    if predictors.mean.len() != predictors.zero.len() {
        return Err(MarginalError::DimensionMismatch {
            what: "mean predictor length",
            expected: predictors.zero.len(),
            found: predictors.mean.len(),
        });
    }
    if outcome.ncols() != 1 {
        return Err(MarginalError::DimensionMismatch {
            what: "outcome columns",
            expected: 1,
            found: outcome.ncols(),
        });
    }
    if outcome.nrows() != predictors.zero.len() {
        return Err(MarginalError::DimensionMismatch {
            what: "outcome rows",
            expected: predictors.zero.len(),
            found: outcome.nrows(),
        });
    }
    if let Some(weights) = weights {
        validate_weights(weights, predictors.zero.len())?;
    }
    Ok(())
}

/// Negative marginal log-likelihood from precomputed linear predictors.
///
/// `weights = None` means unit weights.
///
/// # Errors
///
/// - `DimensionMismatch` for inconsistent lengths.
/// - `Domain` for negative or non-finite outcomes or weights, and unusable
///   `log_sigma`.
/// - `NumericInstability` / `NonFiniteTotal` if a term or the total is not finite.
pub fn negative_log_likelihood_from_predictors(
    predictors: &LinearPredictors,
    outcome: &Mat<f64>,
    weights: Option<&Mat<f64>>,
    log_sigma: f64,
    options: EvaluationOptions,
) -> Result<f64, MarginalError> {
    check_inputs(predictors, outcome, weights)?;
    let kernel = RowKernel::new(log_sigma)?;
    let split = split_outcome(outcome)?;
    let evaluation = Evaluation {
        kernel,
        zero: &predictors.zero,
        mean: &predictors.mean,
        split: &split,
        weights,
        skip_zero_weights: options.skip_zero_weights,
    };
    let total = evaluation.total(options)?;
    if !total.is_finite() {
        log::warn!("negative log-likelihood is not finite");
        return Err(MarginalError::NonFiniteTotal {
            stage: "negative log-likelihood",
        });
    }
    Ok(-total)
}

/// Weighted log-likelihood contribution of every row.
///
/// The contributions sum to the negated evaluator result.
///
/// # Errors
///
/// Same conditions as [`negative_log_likelihood_from_predictors`].
pub fn observation_log_likelihood(
    predictors: &LinearPredictors,
    outcome: &Mat<f64>,
    weights: Option<&Mat<f64>>,
    log_sigma: f64,
) -> Result<Vec<f64>, MarginalError> {
    check_inputs(predictors, outcome, weights)?;
    let kernel = RowKernel::new(log_sigma)?;
    let split = split_outcome(outcome)?;
    let weight = |row: usize| weights.map_or(1.0, |w| w[(row, 0)]);

    let mut contributions: Vec<f64> = predictors
        .zero
        .iter()
        .enumerate()
        .map(|(row, &p0)| weighted(weight(row), RowKernel::zero_term(p0)))
        .collect();
    for (&row, &log_y) in split.positive_rows.iter().zip(&split.log_outcomes) {
        contributions[row] += weighted(
            weight(row),
            kernel.positive_term(predictors.zero[row], predictors.mean[row], log_y),
        );
    }
    if let Some(row) = contributions.iter().position(|value| !value.is_finite()) {
        return Err(MarginalError::NumericInstability {
            stage: "observation contribution",
            row,
        });
    }
    Ok(contributions)
}

/// Derivatives of the weighted log-likelihood with respect to `p0`, `v`, and
/// `log_sigma`.
///
/// # Errors
///
/// Same conditions as [`negative_log_likelihood_from_predictors`].
pub fn predictor_scores(
    predictors: &LinearPredictors,
    outcome: &Mat<f64>,
    weights: Option<&Mat<f64>>,
    log_sigma: f64,
) -> Result<PredictorScores, MarginalError> {
    check_inputs(predictors, outcome, weights)?;
    let kernel = RowKernel::new(log_sigma)?;
    let split = split_outcome(outcome)?;
    let weight = |row: usize| weights.map_or(1.0, |w| w[(row, 0)]);

    let mut zero: Vec<f64> = predictors
        .zero
        .iter()
        .enumerate()
        .map(|(row, &p0)| weighted(weight(row), -logistic_stable(p0)))
        .collect();
    let mut mean = vec![0.0; predictors.mean.len()];
    let mut d_log_sigma = 0.0;

    for (&row, &log_y) in split.positive_rows.iter().zip(&split.log_outcomes) {
        let w = weight(row);
        if w == 0.0 {
            continue;
        }
        let p0 = predictors.zero[row];
        let r = kernel.residual(p0, predictors.mean[row], log_y);
        let scaled = r / kernel.sigma_sq;
        // d r / d p0 = 1 - logistic(p0) = logistic(-p0)
        zero[row] += w * scaled.mul_add(-logistic_stable(-p0), 1.0);
        mean[row] = w * scaled;
        // d r / d log_sigma = sigma^2
        d_log_sigma += w * (r.mul_add(scaled, -r) - 1.0);
    }

    if let Some(row) = zero
        .iter()
        .zip(&mean)
        .position(|(a, b)| !(a.is_finite() && b.is_finite()))
    {
        return Err(MarginalError::NumericInstability {
            stage: "predictor score",
            row,
        });
    }
    if !d_log_sigma.is_finite() {
        return Err(MarginalError::NonFiniteTotal {
            stage: "log_sigma score",
        });
    }
    Ok(PredictorScores {
        zero,
        mean,
        log_sigma: d_log_sigma,
    })
}
