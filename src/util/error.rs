//! Error types for blockflow.

use thiserror::Error;

/// Result alias for blockflow operations.
pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// Errors that can occur when estimating flow.
///
/// Degenerate sub-pixel systems and all-zero reliability fields are handled
/// locally by the pipeline and never surface here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    /// The two input images do not share the same shape.
    #[error("dimension mismatch: {width1}x{height1} vs {width2}x{height2}")]
    DimensionMismatch {
        width1: usize,
        height1: usize,
        width2: usize,
        height2: usize,
    },
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer cannot hold the described image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region of interest falls outside the image.
    #[error("roi ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// Image decoding or encoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
