//! Distance penalty applied to the matching cost.

use crate::util::{FlowError, FlowResult};

/// Multiplicative penalty per candidate displacement.
///
/// The grid has side `2 * search_r + 1` (one entry per placement of the
/// template inside the search window). Entry `(ix, iy)` corresponds to the
/// displacement `(ix - search_r, iy - search_r)` and holds
/// `1 + weight * sqrt(dx² + dy²)`: exactly 1 at the center and strictly
/// increasing with radius.
#[derive(Clone, Debug)]
pub struct PenaltyGrid {
    search_r: usize,
    weight: f64,
    values: Vec<f64>,
}

impl PenaltyGrid {
    /// Builds the grid for a search radius; `weight` must be finite and positive.
    pub fn new(search_r: usize, weight: f64) -> FlowResult<Self> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(FlowError::InvalidConfig(
                "distance_penalty must be finite and > 0",
            ));
        }
        let side = 2 * search_r + 1;
        let r = search_r as f64;
        let mut values = Vec::with_capacity(side * side);
        for iy in 0..side {
            let dy = iy as f64 - r;
            for ix in 0..side {
                let dx = ix as f64 - r;
                values.push(1.0 + weight * dx.hypot(dy));
            }
        }
        Ok(Self {
            search_r,
            weight,
            values,
        })
    }

    /// Returns the side length of the grid.
    pub fn side(&self) -> usize {
        2 * self.search_r + 1
    }

    /// Returns the search radius the grid was built for.
    pub fn search_r(&self) -> usize {
        self.search_r
    }

    /// Returns the radial slope.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns the penalty at grid index `(ix, iy)`.
    pub fn get(&self, ix: usize, iy: usize) -> Option<f64> {
        let side = self.side();
        if ix >= side || iy >= side {
            return None;
        }
        self.values.get(iy * side + ix).copied()
    }

    /// Returns the row-major penalty values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
