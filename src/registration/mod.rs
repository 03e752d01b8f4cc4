//! Robust similarity-transform estimation from candidate correspondences.

pub mod ransac;
pub mod similarity;

pub use ransac::*;
pub use similarity::*;
