//! Post-processing of the raw per-pixel estimates.

use crate::flow::{FlowField, PixelFlow};
use crate::image::OwnedImage;
use crate::util::{FlowError, FlowResult};

/// Counters reported after post-processing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostStats {
    /// Pixels whose flow was zeroed by the reliability threshold.
    pub suppressed: usize,
}

/// Builds the final field from row-major per-pixel estimates.
///
/// Shapes the three grids to exactly `width x height`, divides reliability by
/// `max(max_reliability, f32::EPSILON)` so it lies in `[0, 1]`, then zeroes
/// both flow components wherever normalized reliability is below `thr`.
pub(crate) fn finalize(
    pixels: &[PixelFlow],
    width: usize,
    height: usize,
    thr: f32,
) -> FlowResult<(FlowField, PostStats)> {
    if pixels.len() != width * height {
        return Err(FlowError::BufferTooSmall {
            needed: width * height,
            got: pixels.len(),
        });
    }

    let max_rel = pixels
        .iter()
        .map(|p| p.reliability)
        .fold(0.0f32, f32::max)
        .max(f32::EPSILON);

    let mut stats = PostStats::default();
    let mut vx = Vec::with_capacity(pixels.len());
    let mut vy = Vec::with_capacity(pixels.len());
    let mut reliability = Vec::with_capacity(pixels.len());
    for p in pixels {
        let rel = (p.reliability / max_rel).clamp(0.0, 1.0);
        if rel < thr {
            vx.push(0.0);
            vy.push(0.0);
            stats.suppressed += 1;
        } else {
            vx.push(p.vx);
            vy.push(p.vy);
        }
        reliability.push(rel);
    }

    let field = FlowField {
        vx: OwnedImage::new(vx, width, height)?,
        vy: OwnedImage::new(vy, width, height)?,
        reliability: OwnedImage::new(reliability, width, height)?,
    };
    Ok((field, stats))
}
