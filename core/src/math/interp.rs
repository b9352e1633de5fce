use crate::math::EPSILON;
use crate::prelude::{EngineError, EngineResult};

/// One-dimensional piecewise-linear interpolant over non-decreasing knots.
#[derive(Debug, Clone)]
pub struct LinearInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolant {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> EngineResult<Self> {
        if xs.len() != ys.len() {
            return Err(EngineError::Internal(format!(
                "interpolant knot count mismatch ({} vs {})",
                xs.len(),
                ys.len()
            )));
        }
        if xs.is_empty() {
            return Err(EngineError::Internal("interpolant needs at least one knot".into()));
        }
        if xs.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(EngineError::Internal("interpolant knots must be non-decreasing".into()));
        }
        Ok(Self { xs, ys })
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Value at `x`; querying outside the knot domain is an error, never an extrapolation.
    pub fn evaluate(&self, x: f64) -> EngineResult<f64> {
        let (min, max) = self.domain();
        if !x.is_finite() || x < min - EPSILON || x > max + EPSILON {
            return Err(EngineError::OutOfRange {
                distance: x,
                min,
                max,
            });
        }
        let x = x.clamp(min, max);
        // first knot strictly greater than x
        let upper = self.xs.partition_point(|&knot| knot <= x);
        if upper == 0 {
            return Ok(self.ys[0]);
        }
        if upper == self.xs.len() {
            return Ok(self.ys[upper - 1]);
        }
        let (x0, x1) = (self.xs[upper - 1], self.xs[upper]);
        let (y0, y1) = (self.ys[upper - 1], self.ys[upper]);
        let span = x1 - x0;
        if span == 0.0 {
            return Ok(y0);
        }
        Ok(y0 + (x - x0) / span * (y1 - y0))
    }
}
