//! Resampling core for 3-D survey polylines.
//!
//! Points are interpolated at regular elevation or arc-length intervals, or
//! filtered down to those lying within a tolerance band of a regular
//! elevation grid. Every operation is a pure function over an in-memory
//! [`PointSequence`]; the [`Pipeline`] chains them according to an
//! [`EngineConfig`].

pub mod math;
pub mod prelude;
pub mod processing;
pub mod survey;
pub mod table;
pub mod telemetry;

pub use prelude::{EngineConfig, EngineError, EngineResult, ProcessingStage};
pub use processing::{EngineOutput, Pipeline, RunStatus};
pub use survey::{Point, PointId, PointSequence, ResampleAxis};
