//! One Lucas-Kanade step around an integer displacement.
//!
//! Image 1 is the reference template: with gradients `g = (gx, gy)` taken from
//! image 1 and the residual `b = T − T2` between the template and the image 2
//! patch at the integer displacement, the correction `δ` minimizes
//! `Σ (g·δ − b)²`, i.e. it solves the normal equations `(AᵗA)·δ = Aᵗb`.

use crate::image::gradient::GradientField;
use crate::image::ImageView;
use crate::search::block::Displacement;
use crate::util::math::{det_sym_2x2, eig_sym_2x2, solve_sym_2x2};
use crate::util::FlowResult;

/// Minimum `|λmin| / |λmax|` of `AᵗA` for the correction to be applied.
pub const MIN_EIGEN_RATIO: f64 = 1e-4;

/// Why a correction was or was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefineOutcome {
    /// The correction was applied.
    Applied,
    /// `|det(AᵗA)|` fell below machine epsilon.
    Singular,
    /// The eigenvalue ratio was at or below [`MIN_EIGEN_RATIO`] (aperture problem).
    IllConditioned,
}

/// Fractional correction for one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Refinement {
    /// Horizontal correction; exactly zero unless applied.
    pub dx: f64,
    /// Vertical correction; exactly zero unless applied.
    pub dy: f64,
    /// Determinant of the normal-equations matrix.
    pub det: f64,
    /// `|λmin| / |λmax|`, or 0 for a zero matrix.
    pub eigen_ratio: f64,
    /// Whether `(dx, dy)` was kept.
    pub outcome: RefineOutcome,
}

impl Refinement {
    fn rejected(det: f64, eigen_ratio: f64, outcome: RefineOutcome) -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            det,
            eigen_ratio,
            outcome,
        }
    }

    /// Returns `true` if the correction was applied.
    pub fn is_applied(&self) -> bool {
        self.outcome == RefineOutcome::Applied
    }

    /// Returns the refined displacement `(vx, vy)`.
    pub fn apply(&self, v: Displacement) -> (f64, f64) {
        (v.dx as f64 + self.dx, v.dy as f64 + self.dy)
    }
}

/// Refines the integer displacement `v` of the patch centered at `(cx, cy)`.
///
/// `first`, `second` and `grads` are in padded coordinates and `grads` must be
/// the gradient field of `first`. Degenerate geometry is not an error: the
/// returned refinement simply carries a zero correction.
pub fn refine_subpixel(
    first: ImageView<'_, f32>,
    second: ImageView<'_, f32>,
    grads: &GradientField,
    cx: usize,
    cy: usize,
    patch_r: usize,
    v: Displacement,
) -> FlowResult<Refinement> {
    let template = first.patch(cx, cy, patch_r)?;
    let shifted = second.patch(
        cx.wrapping_add_signed(v.dx),
        cy.wrapping_add_signed(v.dy),
        patch_r,
    )?;
    let gx = grads.gx().view().patch(cx, cy, patch_r)?;
    let gy = grads.gy().view().patch(cx, cy, patch_r)?;

    let (mut a11, mut a12, mut a22) = (0.0f64, 0.0f64, 0.0f64);
    let (mut b1, mut b2) = (0.0f64, 0.0f64);
    let rows = template.rows().zip(shifted.rows()).zip(gx.rows().zip(gy.rows()));
    for ((t_row, s_row), (gx_row, gy_row)) in rows {
        for (((&t, &s), &gxv), &gyv) in t_row.iter().zip(s_row).zip(gx_row).zip(gy_row) {
            let (gxv, gyv) = (f64::from(gxv), f64::from(gyv));
            let b = -(f64::from(s) - f64::from(t));
            a11 += gxv * gxv;
            a12 += gxv * gyv;
            a22 += gyv * gyv;
            b1 += gxv * b;
            b2 += gyv * b;
        }
    }

    let det = det_sym_2x2(a11, a12, a22);
    let Some((dx, dy)) = solve_sym_2x2(a11, a12, a22, b1, b2) else {
        return Ok(Refinement::rejected(det, 0.0, RefineOutcome::Singular));
    };

    let (lo, hi) = eig_sym_2x2(a11, a12, a22);
    let eigen_ratio = if hi.abs() > 0.0 {
        lo.abs() / hi.abs()
    } else {
        0.0
    };
    if eigen_ratio <= MIN_EIGEN_RATIO || !dx.is_finite() || !dy.is_finite() {
        return Ok(Refinement::rejected(
            det,
            eigen_ratio,
            RefineOutcome::IllConditioned,
        ));
    }

    Ok(Refinement {
        dx,
        dy,
        det,
        eigen_ratio,
        outcome: RefineOutcome::Applied,
    })
}
