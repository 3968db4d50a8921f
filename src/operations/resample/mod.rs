mod weights;

pub use weights::CurveWeights;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, OperationError, Result};
use crate::geometry::ClosedPolyline;
use crate::math::Point2;

/// How target points are distributed along the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SamplingMode {
    /// Equal arc-length spacing.
    Uniform,
    /// Arc length inflated by vertex turning angle, scaled by `alpha`.
    #[default]
    CurvatureWeighted,
}

/// Resamples a closed polyline to exactly `n` points.
///
/// Targets are spaced evenly over `[0, 1)` of the cumulative edge weight
/// (see [`CurveWeights`]), so the last target never wraps back onto the
/// first. Each target is placed by linear interpolation inside the edge
/// whose weight interval contains it.
///
/// Pure and deterministic: the same inputs always give the same points.
#[derive(Debug)]
pub struct Resample<'a> {
    polyline: &'a ClosedPolyline,
    count: usize,
    mode: SamplingMode,
    alpha: f64,
}

impl<'a> Resample<'a> {
    /// Smallest point count a resampled loop may have.
    pub const MIN_POINTS: usize = 3;

    /// Creates a new resampling operation in uniform mode.
    #[must_use]
    pub fn new(polyline: &'a ClosedPolyline, count: usize) -> Self {
        Self {
            polyline,
            count,
            mode: SamplingMode::Uniform,
            alpha: 0.0,
        }
    }

    /// Sets the sampling mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SamplingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the curvature attraction strength (ignored in uniform mode).
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Executes the resampling.
    ///
    /// A single-point loop, or a loop whose edges all have zero weight,
    /// yields `count` copies of its first point.
    ///
    /// # Errors
    ///
    /// - `OperationError::BelowFloor` if `count < 3`
    /// - `OperationError::InvalidInput` if `alpha` is negative or not finite
    /// - `GeometryError::TooFewPoints` for a two-point loop
    pub fn execute(&self) -> Result<ClosedPolyline> {
        let n = self.count;
        if n < Self::MIN_POINTS {
            return Err(OperationError::BelowFloor {
                requested: n,
                floor: Self::MIN_POINTS,
            }
            .into());
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "curvature alpha must be finite and non-negative, got {}",
                self.alpha
            ))
            .into());
        }

        let pts = self.polyline.points();
        let first = pts[0];
        match pts.len() {
            1 => return Ok(repeat_point(first, n)),
            2 => {
                return Err(GeometryError::TooFewPoints {
                    required: ClosedPolyline::MIN_POINTS,
                    actual: 2,
                }
                .into())
            }
            _ => {}
        }

        let Some(weights) = CurveWeights::compute(pts, self.mode, self.alpha) else {
            return Ok(repeat_point(first, n));
        };

        let total = pts.len();
        #[allow(clippy::cast_precision_loss)]
        let step = 1.0 / n as f64;
        #[allow(clippy::cast_precision_loss)]
        let samples = (0..n)
            .map(|k| {
                let (edge, frac) = weights.locate(k as f64 * step);
                let a = pts[edge];
                let b = pts[(edge + 1) % total];
                a + (b - a) * frac
            })
            .collect();

        Ok(ClosedPolyline::from_samples(samples))
    }
}

fn repeat_point(point: Point2, count: usize) -> ClosedPolyline {
    ClosedPolyline::from_samples(vec![point; count])
}
