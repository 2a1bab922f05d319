//! Configuration for dense flow estimation.

use crate::util::{FlowError, FlowResult};

/// Default pre-smoothing standard deviation.
pub const DEFAULT_SIGMA: f32 = 1.0;
/// Default relative reliability threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.001;
/// Default radial slope of the distance penalty.
pub const DEFAULT_DISTANCE_PENALTY: f64 = 0.01;

/// Parameters for [`compute_flow`](crate::compute_flow).
///
/// `patch_r` and `search_r` have no sensible defaults and are passed to
/// [`FlowConfig::new`]; the remaining fields can be overridden with struct
/// update syntax.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowConfig {
    /// Half-size of the matching patch (side `2 * patch_r + 1`).
    pub patch_r: usize,
    /// Maximum displacement searched along each axis.
    pub search_r: usize,
    /// Gaussian pre-smoothing sigma; 0 disables smoothing.
    pub sigma: f32,
    /// Flow is zeroed where normalized reliability is below this value.
    pub thr: f32,
    /// Slope of the `1 + w * r` distance penalty; must be positive.
    pub distance_penalty: f64,
    /// Process rows in parallel (requires the `rayon` feature).
    pub parallel: bool,
    /// Ask front ends to render the field over image 1.
    ///
    /// The library always returns the field; rendering lives in
    /// `io::render_flow_overlay` behind the `image-io` feature.
    pub visualize: bool,
}

impl FlowConfig {
    /// Creates a configuration with default smoothing, threshold and penalty.
    pub fn new(patch_r: usize, search_r: usize) -> Self {
        Self {
            patch_r,
            search_r,
            sigma: DEFAULT_SIGMA,
            thr: DEFAULT_THRESHOLD,
            distance_penalty: DEFAULT_DISTANCE_PENALTY,
            parallel: false,
            visualize: false,
        }
    }

    /// Margin added on every side of both images.
    pub fn margin(&self) -> usize {
        self.patch_r + self.search_r
    }

    /// Checks every field once, before any pixel is touched.
    pub fn validate(&self) -> FlowResult<()> {
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(FlowError::InvalidConfig("sigma must be finite and >= 0"));
        }
        if !self.thr.is_finite() || self.thr < 0.0 {
            return Err(FlowError::InvalidConfig("thr must be finite and >= 0"));
        }
        if !self.distance_penalty.is_finite() || self.distance_penalty <= 0.0 {
            return Err(FlowError::InvalidConfig(
                "distance_penalty must be finite and > 0",
            ));
        }
        self.patch_r
            .checked_add(self.search_r)
            .and_then(|m| m.checked_mul(4))
            .ok_or(FlowError::InvalidConfig("patch_r + search_r is too large"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FlowConfig;
    use crate::util::FlowError;

    #[test]
    fn new_uses_documented_defaults() {
        let cfg = FlowConfig::new(2, 5);
        assert_eq!(cfg.sigma, 1.0);
        assert_eq!(cfg.thr, 0.001);
        assert_eq!(cfg.margin(), 7);
        assert!(!cfg.parallel);
        assert!(!cfg.visualize);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let bad_sigma = FlowConfig {
            sigma: -1.0,
            ..FlowConfig::new(1, 1)
        };
        assert!(matches!(
            bad_sigma.validate(),
            Err(FlowError::InvalidConfig(_))
        ));

        let bad_thr = FlowConfig {
            thr: f32::NAN,
            ..FlowConfig::new(1, 1)
        };
        assert!(bad_thr.validate().is_err());

        let bad_penalty = FlowConfig {
            distance_penalty: 0.0,
            ..FlowConfig::new(1, 1)
        };
        assert!(bad_penalty.validate().is_err());
    }
}
