use crate::prelude::{
    EngineConfig, EngineResult, ExportSelection, ProcessingStage, StageInput, StageOutput,
};
use crate::processing::distance::DistanceStage;
use crate::processing::filter::FilterStage;
use crate::processing::interpolation::InterpolationStage;
use crate::survey::{PointSequence, ResampleAxis};
use serde::{Deserialize, Serialize};

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Completed,
    /// The selected output has no rows; not an error.
    NoPointsFound,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// Input points plus any resampled points.
    pub full: PointSequence,
    /// Tolerance-band matches, when filtering ran.
    pub filtered: Option<PointSequence>,
    pub generated_count: usize,
    pub status: RunStatus,
    pub notes: Vec<String>,
    export: ExportSelection,
}

impl EngineOutput {
    /// The sequence chosen by `export`; falls back to `full` when no filter ran.
    pub fn selected(&self) -> &PointSequence {
        match (self.export, &self.filtered) {
            (ExportSelection::Filtered, Some(filtered)) => filtered,
            _ => &self.full,
        }
    }
}

fn run_stage<S: ProcessingStage>(
    stage: &mut S,
    config: &EngineConfig,
    points: PointSequence,
) -> EngineResult<StageOutput> {
    stage.initialize(config)?;
    let output = stage.execute(StageInput { points });
    stage.cleanup();
    output
}

/// Single configurable engine: optional resampling followed by optional filtering.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: EngineConfig,
}

impl Pipeline {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn run(&self, points: &PointSequence) -> EngineResult<EngineOutput> {
        let config = &self.config;
        let mut notes = Vec::new();
        let mut generated_count = 0;

        let full = if config.interpolation_enabled {
            match config.interpolation_axis {
                ResampleAxis::Elevation => {
                    let output = run_stage(&mut InterpolationStage::new(), config, points.clone())?;
                    generated_count = output.metadata.generated_count.unwrap_or(0);
                    notes.extend(output.metadata.notes);
                    let mut full = points.clone();
                    full.extend(output.points);
                    full
                }
                ResampleAxis::Distance => {
                    let output = run_stage(&mut DistanceStage::new(), config, points.clone())?;
                    generated_count = output.metadata.generated_count.unwrap_or(0);
                    notes.extend(output.metadata.notes);
                    output.points
                }
            }
        } else {
            points.clone()
        };

        let filtered = if config.filter_enabled {
            let output = run_stage(&mut FilterStage::new(), config, full.clone())?;
            notes.extend(output.metadata.notes);
            Some(output.points)
        } else {
            None
        };

        let mut output = EngineOutput {
            full,
            filtered,
            generated_count,
            status: RunStatus::Completed,
            notes,
            export: config.export,
        };
        if output.selected().is_empty() {
            output.status = RunStatus::NoPointsFound;
        }
        Ok(output)
    }
}
