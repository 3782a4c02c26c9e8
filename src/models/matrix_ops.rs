//! Row gathering and explicit matrix-vector products over `faer::Mat` storage.

use faer::Mat;

/// Copy `rows` of `matrix`, in the given order, into a new matrix.
///
/// Works for designs and for `n x 1` outcome or weight columns alike.
#[must_use]
pub fn gather_rows(matrix: &Mat<f64>, rows: &[usize]) -> Mat<f64> {
    let mut out = Mat::<f64>::zeros(rows.len(), matrix.ncols());
    for (target, &source) in rows.iter().enumerate() {
        for j in 0..matrix.ncols() {
            out[(target, j)] = matrix[(source, j)];
        }
    }
    out
}

/// Row-major matrix-vector product `matrix · coefficients`.
///
/// Callers check `matrix.ncols() == coefficients.len()`.
#[must_use]
pub fn mat_vec(matrix: &Mat<f64>, coefficients: &[f64]) -> Vec<f64> {
    (0..matrix.nrows())
        .map(|i| {
            let mut acc = 0.0;
            for (j, coef) in coefficients.iter().enumerate() {
                acc = matrix[(i, j)].mul_add(*coef, acc);
            }
            acc
        })
        .collect()
}

/// Transposed product `matrixᵀ · values`, accumulated row by row.
///
/// Callers check `matrix.nrows() == values.len()`.
#[must_use]
pub fn transpose_mat_vec(matrix: &Mat<f64>, values: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; matrix.ncols()];
    for (i, value) in values.iter().enumerate() {
        for (j, slot) in out.iter_mut().enumerate() {
            *slot = matrix[(i, j)].mul_add(*value, *slot);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mat_vec_matches_hand_computed_products() {
        let matrix = Mat::from_fn(2, 3, |i, j| if i == 0 { 1.0 } else { [2.0, -1.0, 0.5][j] });
        let out = mat_vec(&matrix, &[1.0, 2.0, 4.0]);
        assert_relative_eq!(out[0], 7.0);
        assert_relative_eq!(out[1], 2.0);
    }

    #[test]
    fn transpose_mat_vec_matches_hand_computed_products() {
        let matrix = Mat::from_fn(3, 2, |i, j| if j == 0 { 1.0 } else { [0.0, 1.0, 2.0][i] });
        let out = transpose_mat_vec(&matrix, &[1.0, -1.0, 3.0]);
        assert_relative_eq!(out[0], 3.0);
        assert_relative_eq!(out[1], 5.0);
    }

    #[test]
    fn gather_rows_keeps_requested_order() {
        let matrix = Mat::from_fn(4, 2, |i, j| if j == 0 { 1.0 } else { [0.0, 1.0, 2.0, 3.0][i] });
        let picked = gather_rows(&matrix, &[3, 1, 3]);
        assert_eq!(picked.nrows(), 3);
        assert_eq!(picked.ncols(), 2);
        assert_relative_eq!(picked[(0, 1)], 3.0);
        assert_relative_eq!(picked[(1, 1)], 1.0);
        assert_relative_eq!(picked[(2, 1)], 3.0);

        let column = Mat::from_fn(4, 1, |i, _| [5.0, 6.0, 7.0, 8.0][i]);
        let values = gather_rows(&column, &[2, 0]);
        assert_relative_eq!(values[(0, 0)], 7.0);
        assert_relative_eq!(values[(1, 0)], 5.0);
        assert_eq!(gather_rows(&column, &[]).nrows(), 0);
    }
}
