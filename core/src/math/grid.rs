use crate::prelude::{validate_step, EngineError, EngineResult};
use crate::survey::PointSequence;

const MIN_GRID_DECIMALS: u32 = 3;
const MAX_GRID_DECIMALS: u32 = 10;
pub(crate) const MAX_GRID_LEN: f64 = 10_000_000.0;
const MAX_GRID_INDEX: f64 = 9.0e15;

/// Rounds `value` to `decimals` fractional digits.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Snaps quotients that are an integer up to floating noise.
fn snap(quotient: f64) -> f64 {
    let nearest = quotient.round();
    if (quotient - nearest).abs() < 1e-9 {
        nearest
    } else {
        quotient
    }
}

/// Digits needed to represent `step`, never fewer than the grid minimum.
///
/// `None` when the step is finer than the coarsest rounding that keeps
/// neighbouring multiples distinct.
fn grid_decimals(step: f64) -> Option<u32> {
    let exact = (0..=MAX_GRID_DECIMALS).find(|&decimals| {
        let scaled = step * 10f64.powi(decimals as i32);
        scaled.round() >= 1.0 && (scaled - scaled.round()).abs() < 1e-6
    });
    match exact {
        Some(decimals) => Some(decimals.max(MIN_GRID_DECIMALS)),
        None if step * 10f64.powi(MAX_GRID_DECIMALS as i32) >= 1.0 - 1e-6 => {
            Some(MAX_GRID_DECIMALS)
        }
        None => None,
    }
}

/// A validated grid spacing together with the precision grid values are rounded to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStep {
    step: f64,
    decimals: u32,
}

impl GridStep {
    pub fn new(step: f64) -> EngineResult<Self> {
        validate_step("step", step)?;
        let decimals = grid_decimals(step).ok_or_else(|| {
            EngineError::InvalidParameter(format!(
                "step {} is finer than the grid resolution of 1e-{}",
                step, MAX_GRID_DECIMALS
            ))
        })?;
        Ok(Self { step, decimals })
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// The `index`-th multiple of the step, rounded.
    pub fn at(&self, index: i64) -> f64 {
        round_to(index as f64 * self.step, self.decimals)
    }

    /// Grid value closest to `value`.
    pub fn nearest(&self, value: f64) -> f64 {
        self.at(snap(value / self.step).round() as i64)
    }

    /// Multiples of the step from `floor(min/step)` to `ceil(max/step)`.
    pub fn covering(&self, min: f64, max: f64) -> EngineResult<Vec<f64>> {
        let lo = snap(min / self.step).floor();
        let hi = snap(max / self.step).ceil();
        self.span(lo, hi)
    }

    /// Multiples of the step from `ceil(min/step)` to `floor(max/step)`.
    pub fn interior(&self, min: f64, max: f64) -> EngineResult<Vec<f64>> {
        let lo = snap(min / self.step).ceil();
        let hi = snap(max / self.step).floor();
        self.span(lo, hi)
    }

    fn span(&self, lo: f64, hi: f64) -> EngineResult<Vec<f64>> {
        if lo > hi {
            return Ok(Vec::new());
        }
        if lo.abs() > MAX_GRID_INDEX || hi.abs() > MAX_GRID_INDEX {
            return Err(EngineError::InvalidParameter(format!(
                "grid index out of range for step {}",
                self.step
            )));
        }
        if hi - lo + 1.0 > MAX_GRID_LEN {
            return Err(EngineError::InvalidParameter(format!(
                "step {} is too small for the data range",
                self.step
            )));
        }
        Ok((lo as i64..=hi as i64).map(|index| self.at(index)).collect())
    }
}

/// Ordered grid values bracketing `[min_value, max_value]`.
pub fn generate_grid(min_value: f64, max_value: f64, step: f64) -> EngineResult<Vec<f64>> {
    let grid = GridStep::new(step)?;
    if !min_value.is_finite() || !max_value.is_finite() {
        return Err(EngineError::InvalidParameter(
            "grid bounds must be finite".into(),
        ));
    }
    if min_value > max_value {
        return Err(EngineError::InvalidParameter(format!(
            "min_value must be <= max_value (got {} > {})",
            min_value, max_value
        )));
    }
    if min_value == max_value {
        return Ok(vec![grid.nearest(min_value)]);
    }
    grid.covering(min_value, max_value)
}

/// Grid values lying inside one segment's span `[z_min, z_max]`.
pub fn segment_grid(z_min: f64, z_max: f64, step: &GridStep) -> EngineResult<Vec<f64>> {
    step.interior(z_min, z_max)
}

/// Target elevations for tolerance filtering of `points`; empty when there are no points.
pub fn filter_grid(points: &PointSequence, step: f64) -> EngineResult<Vec<f64>> {
    match points.elevation_range() {
        Some((lo, hi)) => generate_grid(lo, hi, step),
        None => GridStep::new(step).map(|_| Vec::new()),
    }
}
