use crate::math::grid::{segment_grid, GridStep};
use crate::math::EPSILON;
use crate::prelude::{
    validate_tolerance, EngineConfig, EngineError, EngineResult, IdPolicyKind, ProcessingStage,
    StageInput, StageMetadata, StageOutput,
};
use crate::survey::{Point, PointId, PointSequence, ResampleAxis};
use crate::telemetry::log::LogManager;
use log::debug;

/// Identifier scheme for interpolated points, fixed for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdPolicy {
    /// Contiguous integers in generation order, beginning at `start`.
    Counter { start: i64 },
    /// `"{idA}-{idB}"` from the two points bracketing the sample.
    PairLabel,
}

impl IdPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        match config.id_policy {
            IdPolicyKind::Counter => IdPolicy::Counter {
                start: config.start_id,
            },
            IdPolicyKind::PairLabel => IdPolicy::PairLabel,
        }
    }
}

struct IdAssigner<'a> {
    policy: &'a IdPolicy,
    issued: i64,
}

impl<'a> IdAssigner<'a> {
    fn new(policy: &'a IdPolicy) -> Self {
        Self { policy, issued: 0 }
    }

    fn next(&mut self, from: &Point, to: &Point) -> EngineResult<PointId> {
        match self.policy {
            IdPolicy::Counter { start } => {
                let id = start.checked_add(self.issued).ok_or_else(|| {
                    EngineError::InvalidParameter(format!(
                        "start_id overflows after {} generated points (start {})",
                        self.issued, start
                    ))
                })?;
                self.issued += 1;
                Ok(PointId::Int(id))
            }
            IdPolicy::PairLabel => Ok(PointId::Label(format!("{}-{}", from.id, to.id))),
        }
    }
}

/// Full set of knobs for the segment walk.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationOptions {
    pub step: f64,
    pub tolerance: f64,
    pub id_policy: IdPolicy,
    pub record_source: bool,
    /// Stable re-sort of all generated points by elevation instead of traversal order.
    pub sort_by_elevation: bool,
}

impl InterpolationOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            step: config.step,
            tolerance: config.tolerance,
            id_policy: IdPolicy::from_config(config),
            record_source: config.record_source,
            sort_by_elevation: config.sort_output,
        }
    }
}

/// Result of walking every segment of a polyline.
#[derive(Debug, Clone)]
pub struct SegmentWalk {
    pub points: PointSequence,
    pub skipped_segments: usize,
}

fn admits(z: f64, z_min: f64, z_max: f64, tolerance: f64) -> bool {
    if tolerance == 0.0 {
        z > z_min && z < z_max
    } else {
        z >= z_min - tolerance - EPSILON && z <= z_max + tolerance + EPSILON
    }
}

/// Inserts points at every grid elevation crossed by a segment.
pub fn interpolate(
    points: &PointSequence,
    step: f64,
    tolerance: f64,
    id_policy: IdPolicy,
) -> EngineResult<PointSequence> {
    let options = InterpolationOptions {
        step,
        tolerance,
        id_policy,
        record_source: false,
        sort_by_elevation: false,
    };
    interpolate_with(points, &options)
}

pub fn interpolate_with(
    points: &PointSequence,
    options: &InterpolationOptions,
) -> EngineResult<PointSequence> {
    walk_segments(points, options).map(|walk| walk.points)
}

/// Segment walk that also reports how many degenerate segments were skipped.
pub fn walk_segments(
    points: &PointSequence,
    options: &InterpolationOptions,
) -> EngineResult<SegmentWalk> {
    let step = GridStep::new(options.step)?;
    validate_tolerance(options.tolerance)?;

    let mut ids = IdAssigner::new(&options.id_policy);
    let mut generated = points.empty_like();
    let mut skipped_segments = 0;

    for (index, pair) in points.points().windows(2).enumerate() {
        let (from, to) = (&pair[0], &pair[1]);
        let dz = to.z - from.z;
        if dz == 0.0 {
            debug!(
                "segment {} ({} -> {}) has no elevation change, skipped",
                index, from.id, to.id
            );
            skipped_segments += 1;
            continue;
        }

        let z_min = from.z.min(to.z);
        let z_max = from.z.max(to.z);
        for z in segment_grid(z_min, z_max, &step)? {
            if !admits(z, z_min, z_max, options.tolerance) {
                continue;
            }
            // may leave [0, 1] slightly under tolerance slack
            let ratio = (z - from.z) / dz;
            let mut point = Point::new(
                ids.next(from, to)?,
                from.x + ratio * (to.x - from.x),
                from.y + ratio * (to.y - from.y),
                z,
            );
            point.target_value = Some(z);
            if options.record_source {
                point.source = Some(format!("{}-{}", from.id, to.id));
            }
            generated.push(point);
        }
    }

    if options.sort_by_elevation {
        generated.sort_by_axis(ResampleAxis::Elevation);
    }

    Ok(SegmentWalk {
        points: generated,
        skipped_segments,
    })
}

/// Stage wrapping the elevation segment walk.
pub struct InterpolationStage {
    options: Option<InterpolationOptions>,
    logger: LogManager,
}

impl InterpolationStage {
    pub fn new() -> Self {
        Self {
            options: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for InterpolationStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for InterpolationStage {
    fn initialize(&mut self, config: &EngineConfig) -> EngineResult<()> {
        config.validate()?;
        self.options = Some(InterpolationOptions::from_config(config));
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> EngineResult<StageOutput> {
        let options = self
            .options
            .as_ref()
            .ok_or_else(|| EngineError::Internal("stage not initialized".into()))?;

        if input.points.len() < 2 {
            self.logger
                .caution("InterpolationStage needs at least two points, nothing generated");
        }
        let walk = walk_segments(&input.points, options)?;
        let generated_count = walk.points.len();
        self.logger.record(&format!(
            "InterpolationStage generated {} points ({} flat segments skipped)",
            generated_count, walk.skipped_segments
        ));

        let metadata = StageMetadata {
            generated_count: Some(generated_count),
            skipped_segments: Some(walk.skipped_segments),
            notes: vec![format!("elevation step {}", options.step)],
            ..Default::default()
        };

        Ok(StageOutput {
            points: walk.points,
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

    fn counter() -> IdPolicy {
        IdPolicy::Counter { start: 5000 }
    }

    fn polyline(zs: &[f64]) -> PointSequence {
        zs.iter()
            .enumerate()
            .map(|(idx, &z)| Point::new(idx as i64 + 1, idx as f64 * 2.0, idx as f64 * -1.0, z))
            .collect()
    }

    #[test]
    fn two_point_round_trip() {
        let input = PointSequence::new(vec![
            Point::new(1, 0.0, 0.0, 0.0),
            Point::new(2, 0.0, 0.0, 1.0),
        ]);
        let output = interpolate(&input, 0.25, 0.0, counter()).unwrap();
        let zs: Vec<f64> = output.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![0.25, 0.5, 0.75]);
        assert!(output.iter().all(|p| p.x == 0.0 && p.y == 0.0));
        let ids: Vec<PointId> = output.iter().map(|p| p.id.clone()).collect();
        assert_eq!(
            ids,
            vec![PointId::Int(5000), PointId::Int(5001), PointId::Int(5002)]
        );
        assert!(output.iter().all(|p| p.source.is_none()));
    }

    #[test]
    fn descending_segment_interpolates_planimetry() {
        let input = PointSequence::new(vec![
            Point::new(1, 0.0, 0.0, 1.0),
            Point::new(2, 4.0, 8.0, 0.0),
        ]);
        let output = interpolate(&input, 0.25, 0.0, counter()).unwrap();
        let first = &output.points()[0];
        assert_eq!(first.z, 0.25);
        assert!((first.x - 3.0).abs() < 1e-12);
        assert!((first.y - 6.0).abs() < 1e-12);
    }

    #[test]
    fn flat_segment_yields_nothing() {
        for &step in &[0.01, 0.1, 0.5, 1.0] {
            for &tolerance in &[0.0, 0.05, 2.0] {
                let input = polyline(&[3.0, 3.0]);
                let walk = walk_segments(
                    &input,
                    &InterpolationOptions {
                        step,
                        tolerance,
                        id_policy: counter(),
                        record_source: true,
                        sort_by_elevation: false,
                    },
                )
                .unwrap();
                assert!(walk.points.is_empty());
                assert_eq!(walk.skipped_segments, 1);
            }
        }
    }

    #[test]
    fn short_input_yields_empty_output() {
        assert!(interpolate(&PointSequence::default(), 0.1, 0.0, counter())
            .unwrap()
            .is_empty());
        assert!(interpolate(&polyline(&[1.0]), 0.1, 0.0, counter())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn tolerance_admits_segment_endpoints() {
        let input = polyline(&[0.0, 1.0]);
        let output = interpolate(&input, 0.25, 0.01, counter()).unwrap();
        let zs: Vec<f64> = output.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn pair_labels_and_sources_name_both_ends() {
        let input = PointSequence::new(vec![
            Point::new("A", 0.0, 0.0, 0.0),
            Point::new("B", 1.0, 1.0, 1.0),
        ]);
        let options = InterpolationOptions {
            step: 0.5,
            tolerance: 0.0,
            id_policy: IdPolicy::PairLabel,
            record_source: true,
            sort_by_elevation: false,
        };
        let output = interpolate_with(&input, &options).unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(output.points()[0].id, PointId::Label("A-B".into()));
        assert_eq!(output.points()[0].source.as_deref(), Some("A-B"));
        assert_eq!(output.points()[0].target_value, Some(0.5));
    }

    #[test]
    fn traversal_order_unless_sorted() {
        let input = polyline(&[0.5, 1.0, 0.0]);
        let mut options = InterpolationOptions {
            step: 0.25,
            tolerance: 0.0,
            id_policy: counter(),
            record_source: false,
            sort_by_elevation: false,
        };
        let unsorted = interpolate_with(&input, &options).unwrap();
        let zs: Vec<f64> = unsorted.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![0.75, 0.25, 0.5, 0.75]);

        options.sort_by_elevation = true;
        let sorted = interpolate_with(&input, &options).unwrap();
        let zs: Vec<f64> = sorted.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![0.25, 0.5, 0.75, 0.75]);
        let ids: Vec<String> = sorted.iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["5001", "5002", "5000", "5003"]);
    }

    #[test]
    fn invalid_parameters_abort_before_walking() {
        let input = polyline(&[0.0, 1.0]);
        assert!(matches!(
            interpolate(&input, 0.0, 0.0, counter()),
            Err(EngineError::InvalidParameter(_))
        ));
        assert!(interpolate(&input, 0.1, -1.0, counter()).is_err());
        // parameters are checked even when there is nothing to walk
        assert!(interpolate(&PointSequence::default(), -0.1, 0.0, counter()).is_err());
    }

    #[test]
    fn generated_points_stay_in_segment_span_with_contiguous_ids() {
        let zs = [10.02, 11.37, 11.37, 9.5, 9.51, 12.999, 8.0, 8.25];
        for &step in &[0.05, 0.1, 0.25, 1.0] {
            for &tolerance in &[0.0, 0.01, 0.2] {
                let input = polyline(&zs);
                let output = interpolate(&input, step, tolerance, IdPolicy::Counter { start: 7 })
                    .unwrap();
                for (offset, point) in output.iter().enumerate() {
                    assert_eq!(point.id, PointId::Int(7 + offset as i64));
                }
                // each sample stays inside the band of the segment that produced it
                let sourced = interpolate_with(
                    &input,
                    &InterpolationOptions {
                        step,
                        tolerance,
                        id_policy: counter(),
                        record_source: true,
                        sort_by_elevation: false,
                    },
                )
                .unwrap();
                for point in sourced.iter() {
                    let source = point.source.as_deref().unwrap();
                    let (from_id, to_id) = source.split_once('-').unwrap();
                    let from: usize = from_id.parse().unwrap();
                    let to: usize = to_id.parse().unwrap();
                    assert_eq!(to, from + 1);
                    let (a, b) = (zs[from - 1], zs[to - 1]);
                    assert_ne!(a, b);
                    let lo = a.min(b) - tolerance - 1e-9;
                    let hi = a.max(b) + tolerance + 1e-9;
                    assert!(
                        point.z >= lo && point.z <= hi,
                        "z {} from {} step {} tol {}",
                        point.z,
                        source,
                        step,
                        tolerance
                    );
                    if tolerance == 0.0 {
                        assert!(point.z > a.min(b) && point.z < a.max(b));
                    }
                }
            }
        }
    }

    #[test]
    fn counter_overflow_is_rejected() {
        let input = polyline(&[0.0, 1.0]);
        let result = interpolate(&input, 0.25, 0.0, IdPolicy::Counter { start: i64::MAX });
        assert!(
            matches!(result, Err(EngineError::InvalidParameter(msg)) if msg.contains("start_id"))
        );

        // the last representable ID is still usable
        let output = interpolate(&input, 0.5, 0.0, IdPolicy::Counter { start: i64::MAX }).unwrap();
        assert_eq!(output.points()[0].id, PointId::Int(i64::MAX));
    }

    #[test]
    fn stage_requires_initialization() {
        let mut stage = InterpolationStage::new();
        let result = stage.execute(StageInput {
            points: polyline(&[0.0, 1.0]),
        });
        assert!(matches!(result, Err(EngineError::Internal(_))));
    }

    #[test]
    fn stage_reports_generated_count() {
        let mut stage = InterpolationStage::new();
        let config = EngineConfig {
            step: 0.25,
            ..Default::default()
        };
        stage.initialize(&config).unwrap();
        let output = stage
            .execute(StageInput {
                points: polyline(&[0.0, 1.0, 1.0]),
            })
            .unwrap();
        assert_eq!(output.metadata.generated_count, Some(3));
        assert_eq!(output.metadata.skipped_segments, Some(1));
        assert!(output.points.iter().all(|p| p.source.is_some()));
        stage.cleanup();
    }
}
