pub mod geometry;
pub mod grid;
pub mod interp;

pub use grid::{filter_grid, generate_grid, segment_grid, GridStep};
pub use interp::LinearInterpolant;

/// Absolute slack applied to band-edge and domain comparisons.
pub const EPSILON: f64 = 1e-9;
