//! Blockflow estimates dense optical flow between two grayscale images.
//!
//! Each pixel is matched by an exhaustive local search minimizing a squared
//! patch distance (biased toward small displacements), refined to sub-pixel
//! precision with one Lucas-Kanade step, and annotated with a reliability
//! score derived from local texture. Optional features add row parallelism
//! (`rayon`), a SIMD correlation kernel (`simd`), image loading and overlay
//! rendering (`image-io`), and spans/events (`tracing`).
//!
//! ```no_run
//! use blockflow::{compute_flow, FlowConfig, ImageView};
//!
//! # fn main() -> blockflow::FlowResult<()> {
//! let (width, height) = (64, 48);
//! let frame0 = vec![0u8; width * height];
//! let frame1 = vec![0u8; width * height];
//! let field = compute_flow(
//!     ImageView::from_slice(&frame0, width, height)?,
//!     ImageView::from_slice(&frame1, width, height)?,
//!     &FlowConfig::new(3, 4),
//! )?;
//! assert_eq!(field.width(), width);
//! # Ok(())
//! # }
//! ```

pub mod flow;
pub mod image;
pub mod kernel;
pub mod refine;
pub mod search;
pub mod template;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use flow::{compute_flow, compute_flow_with, FlowConfig, FlowField};
pub use crate::image::gradient::GradientField;
pub use crate::image::smooth::{GaussianSmoother, Smoother};
pub use crate::image::{ImageView, OwnedImage, Pixel};
pub use kernel::sliding_sum_of_squares;
pub use refine::{refine_subpixel, RefineOutcome, Refinement};
pub use search::block::{BlockMatch, BlockMatcher, Displacement, MatchScratch};
pub use search::penalty::PenaltyGrid;
pub use template::PatchStats;
pub use util::{FlowError, FlowResult};
