//! Pre-smoothing applied to both inputs before matching.
//!
//! The flow pipeline only depends on the [`Smoother`] trait; the bundled
//! [`GaussianSmoother`] is a separable Gaussian with replicated borders.

use crate::image::{ImageView, OwnedImage};
use crate::util::{FlowError, FlowResult};

/// Blur operator consumed by the flow pipeline as `smooth(image, sigma)`.
pub trait Smoother: Sync {
    /// Returns a blurred copy of `image` with isotropic standard deviation `sigma`.
    fn smooth(&self, image: ImageView<'_, f32>, sigma: f32) -> FlowResult<OwnedImage>;
}

/// Separable Gaussian blur with kernel radius `ceil(3 * sigma)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GaussianSmoother;

impl Smoother for GaussianSmoother {
    fn smooth(&self, image: ImageView<'_, f32>, sigma: f32) -> FlowResult<OwnedImage> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(FlowError::InvalidConfig("sigma must be finite and >= 0"));
        }
        if sigma == 0.0 {
            return OwnedImage::from_view(image);
        }

        let kernel = gaussian_kernel_1d(sigma);
        let radius = (kernel.len() / 2) as isize;
        let (width, height) = image.shape();

        let mut tmp = OwnedImage::zeros(width, height)?;
        {
            let tmp = tmp.data_mut();
            for (y, row) in image.rows().enumerate() {
                for x in 0..width {
                    let mut acc = 0.0f32;
                    for (k, &w) in kernel.iter().enumerate() {
                        let xx = clamp_index(x as isize + k as isize - radius, width);
                        acc += row[xx] * w;
                    }
                    tmp[y * width + x] = acc;
                }
            }
        }

        let mut out = OwnedImage::zeros(width, height)?;
        {
            let src = tmp.data();
            let dst = out.data_mut();
            for y in 0..height {
                for x in 0..width {
                    let mut acc = 0.0f32;
                    for (k, &w) in kernel.iter().enumerate() {
                        let yy = clamp_index(y as isize + k as isize - radius, height);
                        acc += src[yy * width + x] * w;
                    }
                    dst[y * width + x] = acc;
                }
            }
        }
        Ok(out)
    }
}

/// Normalized 1D Gaussian taps for `sigma > 0`.
pub(crate) fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil().max(1.0) as isize;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    for tap in &mut taps {
        *tap /= sum;
    }
    taps
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}
