//! Patch moments for the matching energy and the reliability score.

use crate::image::ImageView;

/// First and second moments of a patch, accumulated in `f64`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchStats {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl PatchStats {
    /// Accumulates the moments of every sample in `patch`.
    pub fn from_view(patch: ImageView<'_, f32>) -> Self {
        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for row in patch.rows() {
            for &value in row {
                let v = f64::from(value);
                sum += v;
                sum_sq += v * v;
            }
        }
        Self {
            count: patch.width() * patch.height(),
            sum,
            sum_sq,
        }
    }

    /// Returns the number of samples.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns `Σx²`.
    pub fn sum_sq(&self) -> f64 {
        self.sum_sq
    }

    /// Returns the mean intensity.
    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    /// Returns `mean(x²) − mean(x)²`, clamped at zero against round-off.
    ///
    /// This is the reliability score: textured patches give sharp matching
    /// minima, flat patches do not.
    pub fn variance(&self) -> f64 {
        let n = self.count as f64;
        let mean = self.sum / n;
        (self.sum_sq / n - mean * mean).max(0.0)
    }
}
