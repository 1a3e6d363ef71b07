//! Coverage: the dense owner grid and the flood fill that writes it.

pub mod builder;
pub mod grid;


pub use builder::{rebuild_coverage, CoverageOutcome};
pub use grid::{CoverageGrid, UNCOVERED};
