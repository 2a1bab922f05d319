//! Zero padding so every interior pixel owns a full search window.

use crate::image::{ImageView, OwnedImage};
use crate::util::{FlowError, FlowResult};

/// Returns `image` surrounded by `margin` zero-valued pixels on every side.
pub fn pad_zero(image: ImageView<'_, f32>, margin: usize) -> FlowResult<OwnedImage> {
    let (width, height) = image.shape();
    let overflow = FlowError::InvalidDimensions { width, height };
    let border = margin.checked_mul(2).ok_or_else(|| overflow.clone())?;
    let padded_width = width.checked_add(border).ok_or_else(|| overflow.clone())?;
    let padded_height = height.checked_add(border).ok_or(overflow)?;

    let mut out = OwnedImage::zeros(padded_width, padded_height)?;
    let dst = out.data_mut();
    for (y, row) in image.rows().enumerate() {
        let start = (y + margin) * padded_width + margin;
        dst[start..start + width].copy_from_slice(row);
    }
    Ok(out)
}

/// Pads both images of a pair by the same margin.
///
/// Fails with [`FlowError::DimensionMismatch`] if the shapes differ.
pub fn pad_pair(
    first: ImageView<'_, f32>,
    second: ImageView<'_, f32>,
    margin: usize,
) -> FlowResult<(OwnedImage, OwnedImage)> {
    ensure_same_shape(first.shape(), second.shape())?;
    Ok((pad_zero(first, margin)?, pad_zero(second, margin)?))
}

pub(crate) fn ensure_same_shape(a: (usize, usize), b: (usize, usize)) -> FlowResult<()> {
    if a != b {
        return Err(FlowError::DimensionMismatch {
            width1: a.0,
            height1: a.1,
            width2: b.0,
            height2: b.1,
        });
    }
    Ok(())
}
