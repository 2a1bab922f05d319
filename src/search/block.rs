//! Exhaustive local block matching.

use crate::image::ImageView;
use crate::kernel::{placement_shape, sliding_sum_of_squares_into, CorrelationKernel, DefaultKernel};
use crate::search::penalty::PenaltyGrid;
use crate::template::PatchStats;
use crate::util::{FlowError, FlowResult};

/// Added to every squared distance before the penalty is applied, so exact
/// zero-distance matches still order by distance from the window center.
pub const TIE_EPSILON: f64 = 1e-6;

/// Relative floor under which `ΣT² + ΣW² − 2·T·W` is treated as exactly zero.
const ROUNDOFF_REL_TOL: f64 = 1e-9;

/// Integer displacement of a patch from image 1 to image 2, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Displacement {
    /// Horizontal offset, positive to the right.
    pub dx: isize,
    /// Vertical offset, positive downward.
    pub dy: isize,
}

/// Result of the integer search at one pixel.
#[derive(Clone, Copy, Debug)]
pub struct BlockMatch {
    /// Best integer displacement.
    pub displacement: Displacement,
    /// Squared distance at the selected displacement (before penalty).
    pub distance: f64,
    /// Moments of the template patch from image 1.
    pub template: PatchStats,
}

/// Per-worker buffers reused by [`BlockMatcher::match_at`].
///
/// One scratch serves any number of calls on the same matcher; create one per
/// row or per thread with [`BlockMatcher::scratch`].
#[derive(Clone, Debug, Default)]
pub struct MatchScratch {
    sum_w2: Vec<f64>,
    dots: Vec<f64>,
    integral: Vec<f64>,
}

/// Matches template patches of one padded image against search windows of another.
///
/// Both images must already be padded by at least `search_r + patch_r` so that
/// every pixel of the original extent has a complete window.
pub struct BlockMatcher<'a> {
    first: ImageView<'a, f32>,
    second: ImageView<'a, f32>,
    patch_r: usize,
    search_r: usize,
    penalty: &'a PenaltyGrid,
}

impl<'a> BlockMatcher<'a> {
    /// Creates a matcher over two equally sized padded images.
    pub fn new(
        first: ImageView<'a, f32>,
        second: ImageView<'a, f32>,
        patch_r: usize,
        penalty: &'a PenaltyGrid,
    ) -> FlowResult<Self> {
        crate::image::pad::ensure_same_shape(first.shape(), second.shape())?;
        Ok(Self {
            first,
            second,
            patch_r,
            search_r: penalty.search_r(),
            penalty,
        })
    }

    /// Allocates scratch buffers sized for this matcher's search window.
    pub fn scratch(&self) -> MatchScratch {
        let placements = self.penalty.as_slice().len();
        let window_side = 2 * (self.patch_r + self.search_r) + 1;
        MatchScratch {
            sum_w2: vec![0.0; placements],
            dots: vec![0.0; placements],
            integral: Vec::with_capacity((window_side + 1) * (window_side + 1)),
        }
    }

    /// Searches the best integer displacement for the patch centered at `(cx, cy)`.
    ///
    /// Coordinates are in padded space. Among equal costs the lowest
    /// row-major placement index wins.
    pub fn match_at(
        &self,
        cx: usize,
        cy: usize,
        scratch: &mut MatchScratch,
    ) -> FlowResult<BlockMatch> {
        let template = self.first.patch(cx, cy, self.patch_r)?;
        let window = self.second.patch(cx, cy, self.patch_r + self.search_r)?;
        let (side_w, side_h) = template.shape();
        let (cols, rows) = placement_shape(window, side_w, side_h)?;
        if cols != self.penalty.side() || rows != self.penalty.side() {
            return Err(FlowError::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let stats = PatchStats::from_view(template);
        let sum_t2 = stats.sum_sq();
        let MatchScratch {
            sum_w2,
            dots,
            integral,
        } = scratch;
        sum_w2.resize(cols * rows, 0.0);
        dots.resize(cols * rows, 0.0);
        sliding_sum_of_squares_into(window, side_w, side_h, integral, sum_w2)?;
        DefaultKernel::correlate_valid(window, template, dots)?;

        let penalty = self.penalty.as_slice();
        let mut best_idx = 0usize;
        let mut best_cost = f64::INFINITY;
        let mut best_dist = 0.0f64;
        for (idx, (&w2, &dot)) in sum_w2.iter().zip(dots.iter()).enumerate() {
            let dist = squared_distance(sum_t2, w2, dot);
            let cost = (dist + TIE_EPSILON) * penalty[idx];
            if cost < best_cost {
                best_cost = cost;
                best_idx = idx;
                best_dist = dist;
            }
        }

        let r = self.search_r as isize;
        Ok(BlockMatch {
            displacement: Displacement {
                dx: (best_idx % cols) as isize - r,
                dy: (best_idx / cols) as isize - r,
            },
            distance: best_dist,
            template: stats,
        })
    }
}

/// `ΣT² + ΣW² − 2·T·W`, snapped to zero when it is within round-off of zero.
#[inline]
fn squared_distance(sum_t2: f64, sum_w2: f64, dot: f64) -> f64 {
    let energy = sum_t2 + sum_w2;
    let dist = energy - 2.0 * dot;
    if dist <= ROUNDOFF_REL_TOL * energy {
        0.0
    } else {
        dist
    }
}
