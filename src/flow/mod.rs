//! Dense flow estimation: the end-to-end pipeline.
//!
//! `compute_flow` runs one forward pass per call:
//!
//! 1. validate the configuration and input shapes;
//! 2. coerce both inputs to `f32` and smooth them;
//! 3. zero-pad both by `patch_r + search_r`;
//! 4. build the gradient field of padded image 1 and the penalty grid;
//! 5. for every pixel: block match, Lucas-Kanade refinement, reliability;
//! 6. normalize reliability and suppress unreliable vectors.
//!
//! Step 5 only reads shared immutable grids and writes its own output cell,
//! so rows are processed independently (in parallel with the `rayon`
//! feature and [`FlowConfig::parallel`]).

mod config;
pub(crate) mod post;

pub use config::{FlowConfig, DEFAULT_DISTANCE_PENALTY, DEFAULT_SIGMA, DEFAULT_THRESHOLD};
pub use post::PostStats;

use crate::image::gradient::GradientField;
use crate::image::pad::{ensure_same_shape, pad_pair};
use crate::image::smooth::{GaussianSmoother, Smoother};
use crate::image::{ImageView, OwnedImage, Pixel};
use crate::refine::refine_subpixel;
use crate::search::block::{BlockMatcher, MatchScratch};
use crate::search::penalty::PenaltyGrid;
use crate::trace::{trace_event, trace_span};
use crate::util::FlowResult;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Dense displacement field aligned with the (unpadded) input images.
///
/// Positive `vx` is rightward motion, positive `vy` is downward motion.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    pub(crate) vx: OwnedImage,
    pub(crate) vy: OwnedImage,
    pub(crate) reliability: OwnedImage,
}

impl FlowField {
    /// Returns the field width in pixels.
    pub fn width(&self) -> usize {
        self.vx.width()
    }

    /// Returns the field height in pixels.
    pub fn height(&self) -> usize {
        self.vx.height()
    }

    /// Horizontal displacement per pixel.
    pub fn vx(&self) -> &OwnedImage {
        &self.vx
    }

    /// Vertical displacement per pixel.
    pub fn vy(&self) -> &OwnedImage {
        &self.vy
    }

    /// Normalized reliability in `[0, 1]` per pixel.
    pub fn reliability(&self) -> &OwnedImage {
        &self.reliability
    }

    /// Returns `(vx, vy, reliability)` at `(x, y)`.
    pub fn at(&self, x: usize, y: usize) -> Option<(f32, f32, f32)> {
        Some((
            self.vx.get(x, y)?,
            self.vy.get(x, y)?,
            self.reliability.get(x, y)?,
        ))
    }

    /// Splits the field into its three grids.
    pub fn into_parts(self) -> (OwnedImage, OwnedImage, OwnedImage) {
        (self.vx, self.vy, self.reliability)
    }
}

/// Raw estimate for one pixel before normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PixelFlow {
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) reliability: f32,
    pub(crate) refined: bool,
}

/// Estimates dense flow from `first` to `second` with Gaussian pre-smoothing.
///
/// Both images must have the same shape; integer formats are converted to
/// `f32`. Fails before any pixel work on shape mismatch or invalid config.
pub fn compute_flow<T: Pixel>(
    first: ImageView<'_, T>,
    second: ImageView<'_, T>,
    cfg: &FlowConfig,
) -> FlowResult<FlowField> {
    compute_flow_with(first, second, cfg, &GaussianSmoother)
}

/// Same as [`compute_flow`] with a caller-provided smoothing operator.
pub fn compute_flow_with<T: Pixel, S: Smoother + ?Sized>(
    first: ImageView<'_, T>,
    second: ImageView<'_, T>,
    cfg: &FlowConfig,
    smoother: &S,
) -> FlowResult<FlowField> {
    ensure_same_shape(first.shape(), second.shape())?;
    cfg.validate()?;

    let (width, height) = first.shape();
    let _span = trace_span!(
        "compute_flow",
        width = width,
        height = height,
        patch_r = cfg.patch_r,
        search_r = cfg.search_r
    )
    .entered();

    let first = OwnedImage::from_view(first)?;
    let second = OwnedImage::from_view(second)?;
    let smooth1 = smoother.smooth(first.view(), cfg.sigma)?;
    let smooth2 = smoother.smooth(second.view(), cfg.sigma)?;

    let margin = cfg.margin();
    let (padded1, padded2) = pad_pair(smooth1.view(), smooth2.view(), margin)?;
    let grads = GradientField::central(padded1.view())?;
    let penalty = PenaltyGrid::new(cfg.search_r, cfg.distance_penalty)?;
    let matcher = BlockMatcher::new(padded1.view(), padded2.view(), cfg.patch_r, &penalty)?;

    let ctx = PixelContext {
        first: padded1.view(),
        second: padded2.view(),
        grads: &grads,
        matcher: &matcher,
        patch_r: cfg.patch_r,
        margin,
        width,
    };

    let rows = {
        let _span = trace_span!("per_pixel", parallel = cfg.parallel).entered();
        estimate_rows(&ctx, height, cfg.parallel)?
    };
    let pixels: Vec<PixelFlow> = rows.into_iter().flatten().collect();
    let refined = pixels.iter().filter(|p| p.refined).count();

    let (field, stats) = post::finalize(&pixels, width, height, cfg.thr)?;
    trace_event!(
        "flow_done",
        pixels = pixels.len(),
        refined = refined,
        suppressed = stats.suppressed
    );
    Ok(field)
}

/// Shared read-only state for the per-pixel loop.
struct PixelContext<'a> {
    first: ImageView<'a, f32>,
    second: ImageView<'a, f32>,
    grads: &'a GradientField,
    matcher: &'a BlockMatcher<'a>,
    patch_r: usize,
    margin: usize,
    width: usize,
}

impl PixelContext<'_> {
    /// Block match, refinement and reliability for output pixel `(x, y)`.
    fn estimate(&self, x: usize, y: usize, scratch: &mut MatchScratch) -> FlowResult<PixelFlow> {
        let (cx, cy) = (x + self.margin, y + self.margin);
        let block = self.matcher.match_at(cx, cy, scratch)?;
        let refinement = refine_subpixel(
            self.first,
            self.second,
            self.grads,
            cx,
            cy,
            self.patch_r,
            block.displacement,
        )?;
        let (vx, vy) = refinement.apply(block.displacement);
        Ok(PixelFlow {
            vx: vx as f32,
            vy: vy as f32,
            reliability: block.template.variance() as f32,
            refined: refinement.is_applied(),
        })
    }

    fn estimate_row(&self, y: usize) -> FlowResult<Vec<PixelFlow>> {
        let mut scratch = self.matcher.scratch();
        (0..self.width)
            .map(|x| self.estimate(x, y, &mut scratch))
            .collect()
    }
}

#[cfg(feature = "rayon")]
fn estimate_rows(
    ctx: &PixelContext<'_>,
    height: usize,
    parallel: bool,
) -> FlowResult<Vec<Vec<PixelFlow>>> {
    if parallel {
        (0..height)
            .into_par_iter()
            .map(|y| ctx.estimate_row(y))
            .collect()
    } else {
        (0..height).map(|y| ctx.estimate_row(y)).collect()
    }
}

#[cfg(not(feature = "rayon"))]
fn estimate_rows(
    ctx: &PixelContext<'_>,
    height: usize,
    _parallel: bool,
) -> FlowResult<Vec<Vec<PixelFlow>>> {
    (0..height).map(|y| ctx.estimate_row(y)).collect()
}
