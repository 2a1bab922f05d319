//! Owned contiguous `f32` grids.

use crate::image::{ImageView, Pixel};
use crate::util::{FlowError, FlowResult};

/// Owned contiguous floating point image buffer (`stride == width`).
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer of exactly `width * height` samples.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> FlowResult<Self> {
        let needed = checked_area(width, height)?;
        if data.len() < needed {
            return Err(FlowError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(FlowError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Allocates a zero-filled image.
    pub fn zeros(width: usize, height: usize) -> FlowResult<Self> {
        let len = checked_area(width, height)?;
        Ok(Self {
            data: vec![0.0; len],
            width,
            height,
        })
    }

    /// Copies a view of any scalar pixel format into a contiguous `f32` grid.
    pub fn from_view<T: Pixel>(view: ImageView<'_, T>) -> FlowResult<Self> {
        let width = view.width();
        let height = view.height();
        let mut data = Vec::with_capacity(checked_area(width, height)?);
        for row in view.rows() {
            data.extend(row.iter().map(|&v| v.to_f32()));
        }
        Self::new(data, width, height)
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

    /// Returns the row-major samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the image and returns its row-major samples.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Returns the sample at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, f32> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

fn checked_area(width: usize, height: usize) -> FlowResult<usize> {
    if width == 0 || height == 0 {
        return Err(FlowError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(FlowError::InvalidDimensions { width, height })
}
