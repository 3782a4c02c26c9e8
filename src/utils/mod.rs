/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Shared numeric utilities for the marginal two-part likelihood.
//
// Created on: 19 Oct 2026
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities
//!
//! Shared helpers for finiteness checks, index conversions, and working with
//! single-column faer matrices.

use faer::Mat;
use num_traits::ToPrimitive;

/// Convert a row count to `f64` without a lossy `as` cast.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    value.to_f64().unwrap_or(f64::MAX)
}

#[must_use]
pub fn matrix_is_finite(matrix: &Mat<f64>) -> bool {
    for i in 0..matrix.nrows() {
        for j in 0..matrix.ncols() {
            if !matrix[(i, j)].is_finite() {
                return false;
            }
        }
    }
    true
}

/// First row of a single-column matrix whose value fails `predicate`.
#[must_use]
pub fn first_row_where(column: &Mat<f64>, predicate: impl Fn(f64) -> bool) -> Option<usize> {
    (0..column.nrows()).find(|&i| predicate(column[(i, 0)]))
}

#[must_use]
pub fn column_to_vec(column: &Mat<f64>) -> Vec<f64> {
    (0..column.nrows()).map(|i| column[(i, 0)]).collect()
}

#[must_use]
pub fn vec_to_column(values: &[f64]) -> Mat<f64> {
    Mat::from_fn(values.len(), 1, |i, _| values[i])
}

#[must_use]
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    let mut max = 0.0;
    for (lhs, rhs) in a.iter().zip(b) {
        let diff = (lhs - rhs).abs();
        if diff > max {
            max = diff;
        }
    }
    max
}
