//! Template patch statistics.
//!
//! The same single pass over a template patch feeds both the matcher (`ΣT²`)
//! and the reliability score (intensity variance).

mod stats;

pub use stats::PatchStats;
