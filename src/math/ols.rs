//! Least squares solver.
//!
//! The models here only ever solve tiny regressions without an intercept:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD so tall design matrices (many observations, one column) solve
//!   robustly. Nalgebra's `QR::solve` is meant for square systems.
//! - A regressor with no energy (all zeros) has no defined slope; callers get
//!   a zero coefficient rather than an error.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Slope of `y` on a single regressor `x`, no intercept.
///
/// Returns `Some(0.0)` when `x` is identically zero, `None` when the inputs
/// differ in length or the solve fails.
pub fn regress_through_origin(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    if x.iter().all(|v| *v == 0.0) {
        return Some(0.0);
    }

    let design = DMatrix::from_column_slice(x.len(), 1, x);
    let target = DVector::from_column_slice(y);
    solve_least_squares(&design, &target).map(|beta| beta[0])
}
