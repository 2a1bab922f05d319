//! SIMD correlation kernel using the `wide` crate.
//!
//! The inner template row loop is vectorized four samples at a time in
//! `f64x4`, with a scalar tail for widths that are not a multiple of four.

use crate::image::ImageView;
use crate::kernel::{placement_shape, CorrelationKernel};
use crate::util::{FlowError, FlowResult};
use wide::f64x4;

const LANES: usize = 4;

#[inline]
fn load_f32x4_as_f64x4(slice: &[f32]) -> f64x4 {
    f64x4::from([
        f64::from(slice[0]),
        f64::from(slice[1]),
        f64::from(slice[2]),
        f64::from(slice[3]),
    ])
}

#[inline]
fn hsum(v: f64x4) -> f64 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3]
}

/// `f64x4` correlation kernel.
pub struct SimdKernel;

impl CorrelationKernel for SimdKernel {
    fn correlate_valid(
        window: ImageView<'_, f32>,
        template: ImageView<'_, f32>,
        out: &mut [f64],
    ) -> FlowResult<()> {
        let (tpl_w, tpl_h) = template.shape();
        let (cols, rows) = placement_shape(window, tpl_w, tpl_h)?;
        if out.len() != cols * rows {
            return Err(FlowError::BufferTooSmall {
                needed: cols * rows,
                got: out.len(),
            });
        }

        let simd_end = tpl_w / LANES * LANES;
        for (y, out_row) in out.chunks_exact_mut(cols).enumerate() {
            for (x, slot) in out_row.iter_mut().enumerate() {
                let mut acc = f64x4::ZERO;
                let mut tail = 0.0f64;
                for (tpl_row, win_row) in template.rows().zip(window.rows().skip(y)) {
                    let win_row = &win_row[x..x + tpl_w];
                    let mut tx = 0;
                    while tx < simd_end {
                        acc += load_f32x4_as_f64x4(&tpl_row[tx..])
                            * load_f32x4_as_f64x4(&win_row[tx..]);
                        tx += LANES;
                    }
                    while tx < tpl_w {
                        tail += f64::from(tpl_row[tx]) * f64::from(win_row[tx]);
                        tx += 1;
                    }
                }
                *slot = hsum(acc) + tail;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SimdKernel;
    use crate::image::ImageView;
    use crate::kernel::scalar::ScalarKernel;
    use crate::kernel::CorrelationKernel;

    #[test]
    fn simd_matches_scalar_with_tail() {
        let (win_w, win_h) = (13, 9);
        let data: Vec<f32> = (0..win_w * win_h)
            .map(|i| ((i * 37 + 11) % 97) as f32 * 0.5)
            .collect();
        let window = ImageView::from_slice(&data, win_w, win_h).unwrap();
        let tpl_data: Vec<f32> = (0..7 * 5).map(|i| ((i * 13) % 17) as f32).collect();
        let template = ImageView::from_slice(&tpl_data, 7, 5).unwrap();

        let mut scalar = vec![0.0; 7 * 5];
        let mut simd = vec![0.0; 7 * 5];
        ScalarKernel::correlate_valid(window, template, &mut scalar).unwrap();
        SimdKernel::correlate_valid(window, template, &mut simd).unwrap();
        for (a, b) in scalar.iter().zip(&simd) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
