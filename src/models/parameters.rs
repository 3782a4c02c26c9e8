//! # Parameters
//!
//! Two representations of the model parameters:
//! - [`ParameterVector`]: a flat list of `(name, value)` pairs tagged
//!   `zero_*`, `mean_*`, and `log_sigma`, as handed over by an optimizer.
//! - [`TwoPartParameters`]: the structured record the evaluator works on.
//!
//! [`ParameterVector::partition`] is the only place names are inspected.

use faer::Mat;

use super::linear_predictor::linear_predictors;
use super::likelihood::{logistic_stable, sigma_from_log, softplus};
use super::types::{MarginalError, ParameterGroup};
use crate::utils::vec_to_column;

pub const ZERO_PREFIX: &str = "zero_";
pub const MEAN_PREFIX: &str = "mean_";
pub const LOG_SIGMA: &str = "log_sigma";

/// One tagged entry of a [`ParameterVector`].
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParameter {
    pub name: String,
    pub value: f64,
}

/// Ordered, name-tagged parameter list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterVector {
    entries: Vec<NamedParameter>,
}

/// Structured parameters of the marginal two-part model.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoPartParameters {
    /// Logistic coefficients, aligned with the zero design columns.
    pub zero_coefficients: Vec<f64>,
    /// Marginal-mean coefficients, aligned with the mean design columns.
    pub mean_coefficients: Vec<f64>,
    /// Log of the log-normal dispersion.
    pub log_sigma: f64,
}

/// Marginal two-part predictions.
#[derive(Debug, Clone)]
pub struct MarginalPrediction {
    /// Pr(y > 0) = logistic(Z·alpha).
    pub prob_positive: Mat<f64>,
    /// E[y] = exp(X·beta).
    pub marginal_mean: Mat<f64>,
    /// E[y | y > 0] = E[y] / Pr(y > 0).
    pub positive_mean: Mat<f64>,
}

fn classify(name: &str) -> Option<ParameterGroup> {
    if name == LOG_SIGMA {
        Some(ParameterGroup::LogSigma)
    } else if name.starts_with(ZERO_PREFIX) {
        Some(ParameterGroup::Zero)
    } else if name.starts_with(MEAN_PREFIX) {
        Some(ParameterGroup::Mean)
    } else {
        None
    }
}

impl ParameterVector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.entries.push(NamedParameter {
            name: name.into(),
            value,
        });
    }

    /// Build `zero_<col>`, `mean_<col>`, `log_sigma` entries from column labels.
    ///
    /// # Errors
    ///
    /// Returns `MarginalError::DimensionMismatch` if a label list does not
    /// match its coefficient group.
    pub fn from_parts<S: AsRef<str>>(
        zero_columns: &[S],
        mean_columns: &[S],
        parameters: &TwoPartParameters,
    ) -> Result<Self, MarginalError> {
        if zero_columns.len() != parameters.zero_coefficients.len() {
            return Err(MarginalError::DimensionMismatch {
                what: "zero column labels",
                expected: parameters.zero_coefficients.len(),
                found: zero_columns.len(),
            });
        }
        if mean_columns.len() != parameters.mean_coefficients.len() {
            return Err(MarginalError::DimensionMismatch {
                what: "mean column labels",
                expected: parameters.mean_coefficients.len(),
                found: mean_columns.len(),
            });
        }
        let mut vector = Self::new();
        for (label, value) in zero_columns.iter().zip(&parameters.zero_coefficients) {
            vector.push(format!("{ZERO_PREFIX}{}", label.as_ref()), *value);
        }
        for (label, value) in mean_columns.iter().zip(&parameters.mean_coefficients) {
            vector.push(format!("{MEAN_PREFIX}{}", label.as_ref()), *value);
        }
        vector.push(LOG_SIGMA, parameters.log_sigma);
        Ok(vector)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[NamedParameter] {
        &self.entries
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Flat values in entry order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|entry| entry.value).collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value)
    }

    /// Split into zero-part coefficients, mean-part coefficients, and `log_sigma`.
    ///
    /// Relative order within each group is preserved.
    ///
    /// # Errors
    ///
    /// - `UnrecognizedParameterName` for names outside the three tags.
    /// - `MissingParameterGroup` if either coefficient group is empty or
    ///   `log_sigma` does not appear exactly once.
    pub fn partition(&self) -> Result<TwoPartParameters, MarginalError> {
        let mut zero_coefficients = Vec::new();
        let mut mean_coefficients = Vec::new();
        let mut log_sigma_values = Vec::with_capacity(1);

        for entry in &self.entries {
            match classify(&entry.name) {
                Some(ParameterGroup::Zero) => zero_coefficients.push(entry.value),
                Some(ParameterGroup::Mean) => mean_coefficients.push(entry.value),
                Some(ParameterGroup::LogSigma) => log_sigma_values.push(entry.value),
                None => {
                    return Err(MarginalError::UnrecognizedParameterName(entry.name.clone()));
                }
            }
        }

        if zero_coefficients.is_empty() {
            return Err(MarginalError::MissingParameterGroup {
                group: ParameterGroup::Zero,
                found: 0,
            });
        }
        if mean_coefficients.is_empty() {
            return Err(MarginalError::MissingParameterGroup {
                group: ParameterGroup::Mean,
                found: 0,
            });
        }
        let &[log_sigma] = log_sigma_values.as_slice() else {
            return Err(MarginalError::MissingParameterGroup {
                group: ParameterGroup::LogSigma,
                found: log_sigma_values.len(),
            });
        };

        Ok(TwoPartParameters {
            zero_coefficients,
            mean_coefficients,
            log_sigma,
        })
    }

    /// Replace values group by group, keeping names and order.
    ///
    /// Used to return gradients in the caller's parameter layout.
    ///
    /// # Errors
    ///
    /// Returns `MarginalError` if `self` does not partition or the group
    /// sizes differ from `parameters`.
    pub fn with_values(&self, parameters: &TwoPartParameters) -> Result<Self, MarginalError> {
        let layout = self.partition()?;
        if layout.zero_coefficients.len() != parameters.zero_coefficients.len() {
            return Err(MarginalError::DimensionMismatch {
                what: "zero coefficients",
                expected: layout.zero_coefficients.len(),
                found: parameters.zero_coefficients.len(),
            });
        }
        if layout.mean_coefficients.len() != parameters.mean_coefficients.len() {
            return Err(MarginalError::DimensionMismatch {
                what: "mean coefficients",
                expected: layout.mean_coefficients.len(),
                found: parameters.mean_coefficients.len(),
            });
        }

        let mut zero = parameters.zero_coefficients.iter();
        let mut mean = parameters.mean_coefficients.iter();
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                let value = match classify(&entry.name) {
                    Some(ParameterGroup::Zero) => zero.next().copied(),
                    Some(ParameterGroup::Mean) => mean.next().copied(),
                    Some(ParameterGroup::LogSigma) => Some(parameters.log_sigma),
                    None => None,
                };
                NamedParameter {
                    name: entry.name.clone(),
                    value: value.unwrap_or(entry.value),
                }
            })
            .collect();
        Ok(Self { entries })
    }
}

impl FromIterator<(String, f64)> for ParameterVector {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| NamedParameter { name, value })
                .collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, f64)> for ParameterVector {
    fn from_iter<T: IntoIterator<Item = (&'a str, f64)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(name, value)| (name.to_owned(), value))
            .collect()
    }
}

impl TwoPartParameters {
    #[must_use]
    pub const fn new(
        zero_coefficients: Vec<f64>,
        mean_coefficients: Vec<f64>,
        log_sigma: f64,
    ) -> Self {
        Self {
            zero_coefficients,
            mean_coefficients,
            log_sigma,
        }
    }

    /// `sigma = exp(log_sigma)`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`sigma_from_log`].
    pub fn sigma(&self) -> Result<f64, MarginalError> {
        sigma_from_log(self.log_sigma)
    }

    /// Total number of free parameters, `k1 + k2 + 1`.
    #[must_use]
    pub fn n_parameters(&self) -> usize {
        self.zero_coefficients.len() + self.mean_coefficients.len() + 1
    }

    /// Flat values in `zero, mean, log_sigma` order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n_parameters());
        out.extend_from_slice(&self.zero_coefficients);
        out.extend_from_slice(&self.mean_coefficients);
        out.push(self.log_sigma);
        out
    }

    /// Tagged vector with positional labels (`zero_0`, `mean_0`, ...).
    #[must_use]
    pub fn to_parameter_vector(&self) -> ParameterVector {
        let mut vector = ParameterVector::new();
        for (j, value) in self.zero_coefficients.iter().enumerate() {
            vector.push(format!("{ZERO_PREFIX}{j}"), *value);
        }
        for (j, value) in self.mean_coefficients.iter().enumerate() {
            vector.push(format!("{MEAN_PREFIX}{j}"), *value);
        }
        vector.push(LOG_SIGMA, self.log_sigma);
        vector
    }

    /// Predict the zero probability and the marginal and conditional means.
    ///
    /// # Errors
    ///
    /// Returns `MarginalError::DimensionMismatch` if the designs do not match
    /// the coefficient groups.
    pub fn predict(
        &self,
        zero_design: &Mat<f64>,
        mean_design: &Mat<f64>,
    ) -> Result<MarginalPrediction, MarginalError> {
        let predictors = linear_predictors(self, zero_design, mean_design)?;
        let prob: Vec<f64> = predictors.zero.iter().map(|&p0| logistic_stable(p0)).collect();
        let mean: Vec<f64> = predictors.mean.iter().map(|&v| v.exp()).collect();
        // E[y | y > 0] = exp(v - ln logistic(p0)) = exp(v + softplus(-p0))
        let positive: Vec<f64> = predictors
            .zero
            .iter()
            .zip(&predictors.mean)
            .map(|(&p0, &v)| (v + softplus(-p0)).exp())
            .collect();
        Ok(MarginalPrediction {
            prob_positive: vec_to_column(&prob),
            marginal_mean: vec_to_column(&mean),
            positive_mean: vec_to_column(&positive),
        })
    }
}
