use crate::math::grid::MAX_GRID_LEN;
use crate::math::interp::LinearInterpolant;
use crate::prelude::{
    validate_step, DistanceOrdering, EngineConfig, EngineError, EngineResult, ProcessingStage,
    StageInput, StageMetadata, StageOutput,
};
use crate::survey::{Point, PointId, PointSequence, ResampleAxis};
use crate::telemetry::log::LogManager;

/// Piecewise-linear model of a polyline parameterized by cumulative distance.
#[derive(Debug, Clone)]
pub struct DistanceProfile {
    x: LinearInterpolant,
    y: LinearInterpolant,
    z: LinearInterpolant,
}

impl DistanceProfile {
    /// Builds the profile from points whose `distance` has already been assigned.
    pub fn from_measured(points: &PointSequence) -> EngineResult<Self> {
        let distances = points
            .iter()
            .map(|point| {
                point.distance.ok_or_else(|| {
                    EngineError::Internal(format!("point {} has no distance", point.id))
                })
            })
            .collect::<EngineResult<Vec<f64>>>()?;
        let column = |select: fn(&Point) -> f64| points.iter().map(select).collect::<Vec<f64>>();

        Ok(Self {
            x: LinearInterpolant::new(distances.clone(), column(|p| p.x))?,
            y: LinearInterpolant::new(distances.clone(), column(|p| p.y))?,
            z: LinearInterpolant::new(distances, column(|p| p.z))?,
        })
    }

    pub fn domain(&self) -> (f64, f64) {
        self.x.domain()
    }

    /// Coordinates at `distance`; fails with `OutOfRange` outside the measured polyline.
    pub fn at(&self, distance: f64) -> EngineResult<[f64; 3]> {
        Ok([
            self.x.evaluate(distance)?,
            self.y.evaluate(distance)?,
            self.z.evaluate(distance)?,
        ])
    }
}

/// Distances `min, min + step, ...` strictly below `max`.
fn open_range(min: f64, max: f64, step: f64) -> EngineResult<Vec<f64>> {
    if (max - min) / step > MAX_GRID_LEN {
        return Err(EngineError::InvalidParameter(format!(
            "interp_step {} is too small for a polyline of length {}",
            step,
            max - min
        )));
    }
    Ok((0u64..)
        .map(|k| min + k as f64 * step)
        .take_while(|&distance| distance < max)
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceOptions {
    pub step: f64,
    pub ordering: DistanceOrdering,
    /// Re-sort originals and samples together by distance.
    pub sort_merged: bool,
}

impl DistanceOptions {
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let step = config.interp_step.ok_or_else(|| {
            EngineError::InvalidParameter("interp_step is required for distance resampling".into())
        })?;
        Ok(Self {
            step,
            ordering: config.distance_ordering,
            sort_merged: config.sort_merged,
        })
    }
}

/// Originals and samples of one distance resampling run.
#[derive(Debug, Clone)]
pub struct DistanceResample {
    pub merged: PointSequence,
    pub generated_count: usize,
}

/// Samples the polyline every `step` of arc length in file order and merges the samples in.
pub fn resample_by_distance(points: &PointSequence, step: f64) -> EngineResult<PointSequence> {
    let options = DistanceOptions {
        step,
        ordering: DistanceOrdering::PreserveOrder,
        sort_merged: true,
    };
    resample_by_distance_with(points, &options).map(|run| run.merged)
}

pub fn resample_by_distance_with(
    points: &PointSequence,
    options: &DistanceOptions,
) -> EngineResult<DistanceResample> {
    validate_step("interp_step", options.step)?;

    let mut ordered = points.clone();
    if options.ordering == DistanceOrdering::SortByRadius {
        ordered.sort_by_radius();
    }
    let mut merged = ordered.with_cumulative_distance();
    if merged.is_empty() {
        return Ok(DistanceResample {
            merged,
            generated_count: 0,
        });
    }

    let profile = DistanceProfile::from_measured(&merged)?;
    let (min, max) = profile.domain();
    let samples = open_range(min, max, options.step)?;

    let mut generated = Vec::with_capacity(samples.len());
    for (index, distance) in samples.into_iter().enumerate() {
        let [x, y, z] = profile.at(distance)?;
        let mut point = Point::new(PointId::Label(format!("INT_{}", index)), x, y, z);
        point.distance = Some(distance);
        point.target_value = Some(distance);
        generated.push(point);
    }

    let generated_count = generated.len();
    for point in generated {
        merged.push(point);
    }
    if options.sort_merged {
        merged.sort_by_axis(ResampleAxis::Distance);
    }

    Ok(DistanceResample {
        merged,
        generated_count,
    })
}

/// Stage wrapping arc-length resampling.
pub struct DistanceStage {
    options: Option<DistanceOptions>,
    logger: LogManager,
}

impl DistanceStage {
    pub fn new() -> Self {
        Self {
            options: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for DistanceStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for DistanceStage {
    fn initialize(&mut self, config: &EngineConfig) -> EngineResult<()> {
        let options = DistanceOptions::from_config(config)?;
        validate_step("interp_step", options.step)?;
        self.options = Some(options);
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> EngineResult<StageOutput> {
        let options = self
            .options
            .as_ref()
            .ok_or_else(|| EngineError::Internal("stage not initialized".into()))?;

        let run = resample_by_distance_with(&input.points, options)?;
        self.logger.record(&format!(
            "DistanceStage generated {} points every {}",
            run.generated_count, options.step
        ));

        let metadata = StageMetadata {
            generated_count: Some(run.generated_count),
            notes: vec![format!("ordering {:?}", options.ordering)],
            ..Default::default()
        };

        Ok(StageOutput {
            points: run.merged,
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.options = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(seq: &PointSequence) -> Vec<String> {
        seq.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn samples_stop_short_of_the_last_distance() {
        let input = PointSequence::new(vec![
            Point::new(1, 0.0, 0.0, 0.0),
            Point::new(2, 0.0, 0.0, 2.0),
        ]);
        let merged = resample_by_distance(&input, 0.5).unwrap();
        assert_eq!(ids(&merged), vec!["1", "INT_0", "INT_1", "INT_2", "INT_3", "2"]);
        let zs: Vec<f64> = merged.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![0.0, 0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn distance_is_measured_in_three_dimensions() {
        let input = PointSequence::new(vec![
            Point::new(1, 0.0, 0.0, 0.0),
            Point::new(2, 3.0, 4.0, 0.0),
            Point::new(3, 3.0, 4.0, 12.0),
        ]);
        let merged = resample_by_distance(&input, 5.0).unwrap();
        let sample = merged
            .iter()
            .find(|p| p.id == PointId::Label("INT_2".into()))
            .unwrap();
        assert_eq!(sample.distance, Some(10.0));
        assert!((sample.x - 3.0).abs() < 1e-12);
        assert!((sample.y - 4.0).abs() < 1e-12);
        assert!((sample.z - 5.0).abs() < 1e-12);
        assert_eq!(merged.len(), 3 + 4);
    }

    #[test]
    fn ordering_strategy_changes_the_measured_length() {
        let input = PointSequence::new(vec![
            Point::new("A", 0.0, 0.0, 0.0),
            Point::new("B", 10.0, 0.0, 0.0),
            Point::new("C", 5.0, 0.0, 0.0),
        ]);
        let mut options = DistanceOptions {
            step: 1.0,
            ordering: DistanceOrdering::PreserveOrder,
            sort_merged: false,
        };
        let preserved = resample_by_distance_with(&input, &options).unwrap();
        assert_eq!(preserved.generated_count, 15);
        assert_eq!(ids(&preserved.merged)[..3], ["A", "B", "C"]);

        options.ordering = DistanceOrdering::SortByRadius;
        let by_radius = resample_by_distance_with(&input, &options).unwrap();
        assert_eq!(by_radius.generated_count, 10);
        assert_eq!(ids(&by_radius.merged)[..3], ["A", "C", "B"]);
    }

    #[test]
    fn querying_past_the_polyline_is_out_of_range() {
        let measured = PointSequence::new(vec![
            Point::new(1, 0.0, 0.0, 0.0),
            Point::new(2, 1.0, 0.0, 0.0),
        ])
        .with_cumulative_distance();
        let profile = DistanceProfile::from_measured(&measured).unwrap();
        assert!(matches!(
            profile.at(1.5),
            Err(EngineError::OutOfRange { .. })
        ));
        assert_eq!(profile.at(0.5).unwrap(), [0.5, 0.0, 0.0]);
    }

    #[test]
    fn short_inputs_produce_no_samples() {
        let empty = resample_by_distance(&PointSequence::default(), 1.0).unwrap();
        assert!(empty.is_empty());
        let single = resample_by_distance(
            &PointSequence::new(vec![Point::new(1, 1.0, 1.0, 1.0)]),
            1.0,
        )
        .unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single.points()[0].distance, Some(0.0));
    }

    #[test]
    fn invalid_step_is_rejected() {
        assert!(matches!(
            resample_by_distance(&PointSequence::default(), 0.0),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn stage_needs_interp_step() {
        let mut stage = DistanceStage::new();
        assert!(stage.initialize(&EngineConfig::default()).is_err());
        let config = EngineConfig {
            interp_step: Some(1.0),
            ..Default::default()
        };
        stage.initialize(&config).unwrap();
        let output = stage
            .execute(StageInput {
                points: PointSequence::new(vec![
                    Point::new(1, 0.0, 0.0, 0.0),
                    Point::new(2, 0.0, 3.0, 0.0),
                ]),
            })
            .unwrap();
        assert_eq!(output.metadata.generated_count, Some(3));
        assert_eq!(output.points.len(), 5);
        stage.cleanup();
    }
}
