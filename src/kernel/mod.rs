//! Sliding-window primitives behind the squared-distance search.
//!
//! The block matcher expands `‖T − W‖² = ΣT² + ΣW² − 2·(T·W)` over every
//! placement of a template `T` inside a search window. [`sliding_sum_of_squares`]
//! provides the `ΣW²` term as a box filter over squared intensities, and a
//! [`CorrelationKernel`] provides the `T·W` term (a "valid" 2D correlation,
//! i.e. convolution with the template rotated by 180°).
//!
//! Outputs are row-major grids of placements with shape
//! `(win_w - tpl_w + 1) x (win_h - tpl_h + 1)`; placement `(0, 0)` puts the
//! template's top-left corner on the window's top-left corner.

use crate::image::ImageView;
use crate::util::{FlowError, FlowResult};

pub mod scalar;
#[cfg(feature = "simd")]
pub mod simd;

#[cfg(not(feature = "simd"))]
pub(crate) use scalar::ScalarKernel as DefaultKernel;
#[cfg(feature = "simd")]
pub(crate) use simd::SimdKernel as DefaultKernel;

/// Computes `T·W` for every valid placement of a template inside a window.
pub trait CorrelationKernel {
    /// Writes one dot product per placement into `out` in row-major order.
    ///
    /// `out` must hold exactly as many entries as there are placements.
    fn correlate_valid(
        window: ImageView<'_, f32>,
        template: ImageView<'_, f32>,
        out: &mut [f64],
    ) -> FlowResult<()>;
}

/// Number of placements `(cols, rows)` of a `tpl_w x tpl_h` template in `window`.
pub fn placement_shape(
    window: ImageView<'_, f32>,
    tpl_w: usize,
    tpl_h: usize,
) -> FlowResult<(usize, usize)> {
    let (win_w, win_h) = window.shape();
    if tpl_w == 0 || tpl_h == 0 {
        return Err(FlowError::InvalidDimensions {
            width: tpl_w,
            height: tpl_h,
        });
    }
    if tpl_w > win_w || tpl_h > win_h {
        return Err(FlowError::RoiOutOfBounds {
            x: 0,
            y: 0,
            width: tpl_w,
            height: tpl_h,
            img_width: win_w,
            img_height: win_h,
        });
    }
    Ok((win_w - tpl_w + 1, win_h - tpl_h + 1))
}

/// Box sum of squared intensities over every `patch_w x patch_h` placement.
///
/// Uses an `f64` integral image of `I²`, so each placement costs four lookups
/// regardless of the patch size.
pub fn sliding_sum_of_squares(
    window: ImageView<'_, f32>,
    patch_w: usize,
    patch_h: usize,
) -> FlowResult<Vec<f64>> {
    let (cols, rows) = placement_shape(window, patch_w, patch_h)?;
    let mut integral = Vec::new();
    let mut out = vec![0.0f64; cols * rows];
    sliding_sum_of_squares_into(window, patch_w, patch_h, &mut integral, &mut out)?;
    Ok(out)
}

/// Allocation-free form of [`sliding_sum_of_squares`].
///
/// `integral` is resized as needed and can be reused across calls; `out` must
/// hold exactly one entry per placement.
pub fn sliding_sum_of_squares_into(
    window: ImageView<'_, f32>,
    patch_w: usize,
    patch_h: usize,
    integral: &mut Vec<f64>,
    out: &mut [f64],
) -> FlowResult<()> {
    let (cols, rows) = placement_shape(window, patch_w, patch_h)?;
    if out.len() != cols * rows {
        return Err(FlowError::BufferTooSmall {
            needed: cols * rows,
            got: out.len(),
        });
    }
    let (win_w, win_h) = window.shape();
    let stride = win_w + 1;

    integral.clear();
    integral.resize(stride * (win_h + 1), 0.0);
    for (y, row) in window.rows().enumerate() {
        let mut running = 0.0f64;
        for (x, &v) in row.iter().enumerate() {
            let v = f64::from(v);
            running += v * v;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + running;
        }
    }

    for (y, out_row) in out.chunks_exact_mut(cols).enumerate() {
        let top = y * stride;
        let bottom = (y + patch_h) * stride;
        for (x, slot) in out_row.iter_mut().enumerate() {
            *slot = integral[bottom + x + patch_w] - integral[bottom + x]
                - integral[top + x + patch_w]
                + integral[top + x];
        }
    }
    Ok(())
}
