//! Closed-form 2x2 helpers for the sub-pixel solve.
//!
//! The normal-equations matrix of a Lucas-Kanade step is symmetric, so every
//! helper takes its three distinct entries `(a11, a12, a22)`.

/// Determinant of the symmetric matrix `[[a11, a12], [a12, a22]]`.
#[inline]
pub fn det_sym_2x2(a11: f64, a12: f64, a22: f64) -> f64 {
    a11 * a22 - a12 * a12
}

/// Solves `[[a11, a12], [a12, a22]] · x = b` through the explicit inverse.
///
/// Returns `None` when `|det|` is below `f64::EPSILON`.
pub fn solve_sym_2x2(a11: f64, a12: f64, a22: f64, b1: f64, b2: f64) -> Option<(f64, f64)> {
    let det = det_sym_2x2(a11, a12, a22);
    if !det.is_finite() || det.abs() < f64::EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let x1 = (a22 * b1 - a12 * b2) * inv_det;
    let x2 = (a11 * b2 - a12 * b1) * inv_det;
    Some((x1, x2))
}

/// Eigenvalues of `[[a11, a12], [a12, a22]]` as `(min, max)`.
pub fn eig_sym_2x2(a11: f64, a12: f64, a22: f64) -> (f64, f64) {
    let half_trace = 0.5 * (a11 + a22);
    let half_diff = 0.5 * (a11 - a22);
    let radius = half_diff.hypot(a12);
    (half_trace - radius, half_trace + radius)
}
