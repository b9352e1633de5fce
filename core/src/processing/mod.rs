pub mod distance;
pub mod filter;
pub mod interpolation;
pub mod pipeline;

pub use distance::{resample_by_distance, resample_by_distance_with, DistanceProfile, DistanceStage};
pub use filter::{filter_by_grid, FilterStage};
pub use interpolation::{interpolate, interpolate_with, IdPolicy, InterpolationOptions, InterpolationStage};
pub use pipeline::{EngineOutput, Pipeline, RunStatus};
