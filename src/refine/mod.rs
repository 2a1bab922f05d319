//! Sub-pixel refinement of integer block matches.

pub mod lucas_kanade;

pub use lucas_kanade::{refine_subpixel, RefineOutcome, Refinement, MIN_EIGEN_RATIO};
