//! Outcome preprocessing: the zero/positive split the evaluator walks, and
//! a per-part summary of the outcome.

use faer::Mat;

use crate::models::types::{DomainError, MarginalError};
use crate::utils::usize_to_f64;

/// Outcome summary split by model part.
///
/// `positive_share` is the empirical Pr(y > 0). The log-scale moments of the
/// positive rows estimate the log-normal location and `sigma` of an
/// intercept-only fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeDiagnostics {
    pub n_rows: usize,
    pub n_zero: usize,
    pub n_positive: usize,
    pub positive_share: f64,
    /// Mean of `ln y` over positive rows; `None` without positive rows.
    pub log_positive_mean: Option<f64>,
    /// Sample standard deviation of `ln y`; needs two positive rows.
    pub log_positive_sd: Option<f64>,
}

/// Summarize an outcome column.
///
/// # Errors
///
/// Returns `MarginalError::Domain` for negative or non-finite outcomes.
pub fn outcome_diagnostics(outcome: &Mat<f64>) -> Result<OutcomeDiagnostics, MarginalError> {
    let split = split_outcome(outcome)?;
    let n_rows = outcome.nrows();
    let n_positive = split.n_positive();
    let positive_share = if n_rows > 0 {
        usize_to_f64(n_positive) / usize_to_f64(n_rows)
    } else {
        0.0
    };

    let log_positive_mean = (n_positive > 0)
        .then(|| split.log_outcomes.iter().sum::<f64>() / usize_to_f64(n_positive));
    let log_positive_sd = log_positive_mean.filter(|_| n_positive > 1).map(|mean| {
        let ss: f64 = split
            .log_outcomes
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum();
        (ss / usize_to_f64(n_positive - 1)).sqrt()
    });

    Ok(OutcomeDiagnostics {
        n_rows,
        n_zero: n_rows - n_positive,
        n_positive,
        positive_share,
        log_positive_mean,
        log_positive_sd,
    })
}

/// Positive-part rows of an outcome column, with their log outcomes.
///
/// Built once per evaluation so the positive accumulation walks a dense
/// index list instead of branching on every row.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeSplit {
    /// Row indices with `y > 0`, ascending.
    pub positive_rows: Vec<usize>,
    /// `ln(y)` for each entry of `positive_rows`.
    pub log_outcomes: Vec<f64>,
}

impl OutcomeSplit {
    #[must_use]
    pub fn n_positive(&self) -> usize {
        self.positive_rows.len()
    }
}

/// Split an outcome column into its positive rows.
///
/// # Errors
///
/// Returns `MarginalError::Domain` for negative or non-finite outcomes.
pub fn split_outcome(outcome: &Mat<f64>) -> Result<OutcomeSplit, MarginalError> {
    let mut positive_rows = Vec::new();
    let mut log_outcomes = Vec::new();
    for row in 0..outcome.nrows() {
        let value = outcome[(row, 0)];
        if !value.is_finite() {
            return Err(DomainError::NonFiniteInput { what: "outcome" }.into());
        }
        if value < 0.0 {
            log::warn!("rejecting negative outcome {value} at row {row}");
            return Err(DomainError::NegativeOutcome { row, value }.into());
        }
        if value > 0.0 {
            positive_rows.push(row);
            log_outcomes.push(value.ln());
        }
    }
    Ok(OutcomeSplit {
        positive_rows,
        log_outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn diagnostics_summarize_both_parts() {
        let e = std::f64::consts::E;
        let outcome = Mat::from_fn(5, 1, |i, _| [0.0, 1.0, 0.0, e * e * e, 0.0][i]);
        let diagnostics = outcome_diagnostics(&outcome).expect("valid outcome");
        assert_eq!(diagnostics.n_rows, 5);
        assert_eq!(diagnostics.n_zero, 3);
        assert_eq!(diagnostics.n_positive, 2);
        assert_relative_eq!(diagnostics.positive_share, 0.4);
        assert_relative_eq!(
            diagnostics.log_positive_mean.expect("positive rows"),
            1.5,
            max_relative = 1e-12
        );
        // ln y = {0, 3}: sample sd = 3 / sqrt(2)
        assert_relative_eq!(
            diagnostics.log_positive_sd.expect("two positive rows"),
            3.0 / 2.0_f64.sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn diagnostics_without_enough_positive_rows() {
        let all_zero = outcome_diagnostics(&Mat::<f64>::zeros(3, 1)).expect("valid outcome");
        assert_eq!(all_zero.log_positive_mean, None);
        assert_eq!(all_zero.log_positive_sd, None);

        let one = Mat::from_fn(3, 1, |i, _| if i == 1 { 2.0 } else { 0.0 });
        let single = outcome_diagnostics(&one).expect("valid outcome");
        assert_relative_eq!(single.log_positive_mean.expect("one positive row"), 2.0_f64.ln());
        assert_eq!(single.log_positive_sd, None);
    }

    #[test]
    fn diagnostics_reject_out_of_domain_outcomes() {
        let nan = Mat::from_fn(2, 1, |i, _| if i == 0 { f64::NAN } else { 1.0 });
        assert_eq!(
            outcome_diagnostics(&nan).expect_err("non-finite outcome"),
            MarginalError::Domain(DomainError::NonFiniteInput { what: "outcome" })
        );
        let negative = Mat::from_fn(2, 1, |i, _| if i == 1 { -2.0 } else { 1.0 });
        assert!(matches!(
            outcome_diagnostics(&negative),
            Err(MarginalError::Domain(DomainError::NegativeOutcome { row: 1, .. }))
        ));
    }

    #[test]
    fn split_collects_positive_rows_in_order() {
        let outcome = Mat::from_fn(4, 1, |i, _| [1.0, 0.0, std::f64::consts::E, 0.0][i]);
        let split = split_outcome(&outcome).expect("valid outcome");
        assert_eq!(split.positive_rows, vec![0, 2]);
        assert_relative_eq!(split.log_outcomes[0], 0.0);
        assert_relative_eq!(split.log_outcomes[1], 1.0);
        assert_eq!(split.n_positive(), 2);
    }

    #[test]
    fn split_rejects_negative_outcome() {
        let outcome = Mat::from_fn(3, 1, |i, _| if i == 2 { -0.1 } else { 1.0 });
        let err = split_outcome(&outcome).expect_err("negative outcome");
        assert_eq!(
            err,
            MarginalError::Domain(DomainError::NegativeOutcome { row: 2, value: -0.1 })
        );
    }

    #[test]
    fn split_of_all_zero_outcome_is_empty() {
        let outcome = Mat::<f64>::zeros(3, 1);
        let split = split_outcome(&outcome).expect("valid outcome");
        assert!(split.positive_rows.is_empty());
    }
}
