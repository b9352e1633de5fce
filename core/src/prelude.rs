use crate::survey::{PointSequence, ResampleAxis};
use serde::{Deserialize, Serialize};

/// How generated points are identified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IdPolicyKind {
    /// Contiguous integers starting at `start_id`.
    #[default]
    Counter,
    /// `"{idA}-{idB}"` built from the bracketing original points.
    PairLabel,
}

/// Traversal order used before cumulative distance is measured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceOrdering {
    /// Keep the order the points were supplied in.
    #[default]
    PreserveOrder,
    /// Stable sort by horizontal radius `sqrt(x² + y²)` from the origin.
    SortByRadius,
}

/// Which sequence a run hands back to the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExportSelection {
    #[default]
    Filtered,
    Full,
}

/// Configuration shared by every processing stage of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub step: f64,
    pub tolerance: f64,
    pub start_id: i64,
    pub id_policy: IdPolicyKind,
    pub record_source: bool,
    pub interpolation_enabled: bool,
    pub interpolation_axis: ResampleAxis,
    pub interp_step: Option<f64>,
    pub distance_ordering: DistanceOrdering,
    pub sort_output: bool,
    pub sort_merged: bool,
    pub filter_enabled: bool,
    pub export: ExportSelection,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step: 0.1,
            tolerance: 0.0,
            start_id: 5000,
            id_policy: IdPolicyKind::Counter,
            record_source: true,
            interpolation_enabled: false,
            interpolation_axis: ResampleAxis::Elevation,
            interp_step: None,
            distance_ordering: DistanceOrdering::PreserveOrder,
            sort_output: false,
            sort_merged: true,
            filter_enabled: true,
            export: ExportSelection::Filtered,
        }
    }
}

impl EngineConfig {
    /// Checks every parameter before any stage touches the data.
    pub fn validate(&self) -> EngineResult<()> {
        validate_step("step", self.step)?;
        validate_tolerance(self.tolerance)?;
        if self.interpolation_enabled && self.interpolation_axis == ResampleAxis::Distance {
            let interp_step = self.interp_step.ok_or_else(|| {
                EngineError::InvalidParameter(
                    "interp_step is required for distance resampling".into(),
                )
            })?;
            validate_step("interp_step", interp_step)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_step(name: &str, step: f64) -> EngineResult<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(EngineError::InvalidParameter(format!(
            "{} must be > 0 (got {})",
            name, step
        )));
    }
    Ok(())
}

pub(crate) fn validate_tolerance(tolerance: f64) -> EngineResult<()> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(EngineError::InvalidParameter(format!(
            "tolerance must be >= 0 (got {})",
            tolerance
        )));
    }
    Ok(())
}

/// Input payload for a processing stage.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub points: PointSequence,
}

/// Output produced by each stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub points: PointSequence,
    pub metadata: StageMetadata,
}

/// Metadata used for chaining stages and logging.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub generated_count: Option<usize>,
    pub matched_count: Option<usize>,
    pub skipped_segments: Option<usize>,
    pub notes: Vec<String>,
}

/// Common error type for engine execution.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("invalid data on line {line}, column {column}: {value:?}")]
    InvalidData {
        line: usize,
        column: String,
        value: String,
    },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("distance {distance} outside interpolation domain [{min}, {max}]")]
    OutOfRange { distance: f64, min: f64, max: f64 },
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Trait describing the engine's processing stages.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &EngineConfig) -> EngineResult<()>;
    fn execute(&mut self, input: StageInput) -> EngineResult<StageOutput>;
    fn cleanup(&mut self);
}
