pub mod point;
pub mod sequence;

pub use point::{Point, PointId, ResampleAxis};
pub use sequence::PointSequence;
