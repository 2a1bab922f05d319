//! Scalar reference correlation kernel.

use crate::image::ImageView;
use crate::kernel::{placement_shape, CorrelationKernel};
use crate::util::{FlowError, FlowResult};

/// Straightforward per-placement dot product with `f64` accumulation.
pub struct ScalarKernel;

impl CorrelationKernel for ScalarKernel {
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

        for (y, out_row) in out.chunks_exact_mut(cols).enumerate() {
            for (x, slot) in out_row.iter_mut().enumerate() {
                let mut dot = 0.0f64;
                for (tpl_row, win_row) in template.rows().zip(window.rows().skip(y)) {
                    for (&t, &w) in tpl_row.iter().zip(&win_row[x..x + tpl_w]) {
                        dot += f64::from(t) * f64::from(w);
                    }
                }
                *slot = dot;
            }
        }
        Ok(())
    }
}
