//! Central-difference intensity gradients.

use crate::image::{ImageView, OwnedImage};
use crate::util::FlowResult;

/// Horizontal and vertical gradients of one image, same shape as the source.
///
/// Interior samples use `(I[k+1] - I[k-1]) / 2`; the outermost rows and
/// columns fall back to one-sided differences.
#[derive(Clone, Debug)]
pub struct GradientField {
    gx: OwnedImage,
    gy: OwnedImage,
}

impl GradientField {
    /// Computes both gradients over the full extent of `image`.
    pub fn central(image: ImageView<'_, f32>) -> FlowResult<Self> {
        let (width, height) = image.shape();
        let src = OwnedImage::from_view(image)?;
        let src = src.data();
        let mut gx = OwnedImage::zeros(width, height)?;
        let mut gy = OwnedImage::zeros(width, height)?;

        {
            let gx = gx.data_mut();
            for y in 0..height {
                let row = &src[y * width..(y + 1) * width];
                for x in 0..width {
                    gx[y * width + x] = diff(row, x);
                }
            }
        }
        {
            let gy = gy.data_mut();
            let mut column = vec![0.0f32; height];
            for x in 0..width {
                for (y, value) in column.iter_mut().enumerate() {
                    *value = src[y * width + x];
                }
                for y in 0..height {
                    gy[y * width + x] = diff(&column, y);
                }
            }
        }

        Ok(Self { gx, gy })
    }

    /// Returns the horizontal gradient (positive when intensity grows rightward).
    pub fn gx(&self) -> &OwnedImage {
        &self.gx
    }

    /// Returns the vertical gradient (positive when intensity grows downward).
    pub fn gy(&self) -> &OwnedImage {
        &self.gy
    }
}

#[inline]
fn diff(line: &[f32], k: usize) -> f32 {
    let n = line.len();
    if n < 2 {
        return 0.0;
    }
    if k == 0 {
        line[1] - line[0]
    } else if k + 1 == n {
        line[n - 1] - line[n - 2]
    } else {
        0.5 * (line[k + 1] - line[k - 1])
    }
}
