use crate::math::grid::filter_grid;
use crate::math::EPSILON;
use crate::prelude::{
    validate_tolerance, EngineConfig, EngineError, EngineResult, ProcessingStage, StageInput,
    StageMetadata, StageOutput,
};
use crate::survey::{Point, PointSequence};
use crate::telemetry::log::LogManager;

/// Keeps every point whose elevation lies within `tolerance` of a grid value.
///
/// A point is emitted once per matching target, so bands wider than half the
/// step can repeat it. Rows are ordered by target, then by absolute deviation,
/// then by input order. `grid` is expected in ascending order.
pub fn filter_by_grid(
    points: &PointSequence,
    grid: &[f64],
    tolerance: f64,
) -> EngineResult<PointSequence> {
    validate_tolerance(tolerance)?;
    if grid.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(EngineError::InvalidParameter(
            "grid must be in ascending order".into(),
        ));
    }

    let band = tolerance + EPSILON;
    let mut matches: Vec<(f64, f64, Point)> = Vec::new();
    for point in points.iter() {
        // one slot of slack each side; the band test below decides
        let lo = grid
            .partition_point(|&target| target < point.z - band)
            .saturating_sub(1);
        let hi = (grid.partition_point(|&target| target <= point.z + band) + 1).min(grid.len());
        for &target in &grid[lo..hi] {
            let deviation = point.z - target;
            if deviation.abs() <= band {
                let mut matched = point.clone();
                matched.target_value = Some(target);
                matched.elevation_diff = Some(deviation);
                matches.push((target, deviation.abs(), matched));
            }
        }
    }

    matches.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut filtered = points.empty_like();
    for (_, _, point) in matches {
        filtered.push(point);
    }
    Ok(filtered)
}

/// Stage building the elevation grid from its input and filtering against it.
pub struct FilterStage {
    config: Option<EngineConfig>,
    logger: LogManager,
}

impl FilterStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for FilterStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for FilterStage {
    fn initialize(&mut self, config: &EngineConfig) -> EngineResult<()> {
        config.validate()?;
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> EngineResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| EngineError::Internal("stage not initialized".into()))?;

        let grid = filter_grid(&input.points, config.step)?;
        let filtered = filter_by_grid(&input.points, &grid, config.tolerance)?;
        let matched_count = filtered.len();
        self.logger.record(&format!(
            "FilterStage matched {} rows against {} targets",
            matched_count,
            grid.len()
        ));

        let metadata = StageMetadata {
            matched_count: Some(matched_count),
            notes: vec![format!("step {} tolerance ±{}", config.step, config.tolerance)],
            ..Default::default()
        };

        Ok(StageOutput {
            points: filtered,
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
