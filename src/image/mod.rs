//! Image views, owned float grids and the preprocessing stages.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices, patches
//! and search windows are zero-copy views into the same backing slice and
//! retain the original stride.

use crate::util::{FlowError, FlowResult};

pub mod gradient;
#[cfg(feature = "image-io")]
pub mod io;
mod owned;
pub mod pad;
pub mod smooth;

pub use owned::OwnedImage;

/// Scalar pixel formats accepted at the API boundary.
///
/// Every format is coerced to `f32` before any processing.
pub trait Pixel: Copy + Send + Sync {
    /// Converts the sample to a floating point intensity.
    fn to_f32(self) -> f32;
}

impl Pixel for u8 {
    #[inline]
    fn to_f32(self) -> f32 {
        f32::from(self)
    }
}

impl Pixel for u16 {
    #[inline]
    fn to_f32(self) -> f32 {
        f32::from(self)
    }
}

impl Pixel for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
}

impl Pixel for f64 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
}

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> FlowResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> FlowResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(FlowError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }

    /// Iterates over all rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + 'a {
        let data = self.data;
        let (width, stride) = (self.width, self.stride);
        // The constructor guarantees `(height - 1) * stride + width <= len`.
        (0..self.height).map(move |y| &data[y * stride..y * stride + width])
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(&self, x: usize, y: usize, width: usize, height: usize) -> FlowResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlowError::InvalidDimensions { width, height });
        }
        let out_of_bounds = FlowError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y * self.stride + x;
        let data = self.data.get(start..).ok_or(FlowError::BufferTooSmall {
            needed: start.saturating_add(1),
            got: self.data.len(),
        })?;
        ImageView::new(data, width, height, self.stride)
    }

    /// Returns the square ROI of side `2 * radius + 1` centered on `(cx, cy)`.
    pub fn patch(&self, cx: usize, cy: usize, radius: usize) -> FlowResult<Self> {
        let side = 2 * radius + 1;
        let (x, y) = match (cx.checked_sub(radius), cy.checked_sub(radius)) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(FlowError::RoiOutOfBounds {
                    x: cx,
                    y: cy,
                    width: side,
                    height: side,
                    img_width: self.width,
                    img_height: self.height,
                })
            }
        };
        self.roi(x, y, side, side)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> FlowResult<usize> {
    if width == 0 || height == 0 {
        return Err(FlowError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(FlowError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(FlowError::InvalidDimensions { width, height })
}
