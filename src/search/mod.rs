//! Integer displacement search.
//!
//! `penalty` holds the radial bias applied to matching costs and `block`
//! runs the exhaustive squared-distance search around each pixel.

pub mod block;
pub mod penalty;
