mod chaikin;

pub use chaikin::ChaikinSmooth;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{ClosedPolyline, PeriodicSpline};
use crate::math::polygon_2d::{dedupe_consecutive, is_explicitly_closed, DUPLICATE_TOLERANCE};

/// Smallest number of distinct points a periodic spline is fitted through.
pub const MIN_FIT_POINTS: usize = 4;

/// Smooth reconstruction applied to a resampled candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FitMode {
    /// Use the resampled polygon directly.
    #[default]
    None,
    /// Periodic cubic smoothing spline, evaluated densely.
    PeriodicSpline,
    /// Corner-cutting smoothing, repeated `iterations` times.
    Chaikin { iterations: usize },
}

/// A smooth closed curve produced from a sparse polygon.
///
/// When fitting was not possible the curve holds the deduplicated input and
/// [`FitCurve::is_smoothed`] is `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitCurve {
    polyline: ClosedPolyline,
    smoothed: bool,
}

impl FitCurve {
    pub(crate) fn smoothed(polyline: ClosedPolyline) -> Self {
        Self {
            polyline,
            smoothed: true,
        }
    }

    fn unchanged(polyline: ClosedPolyline) -> Self {
        Self {
            polyline,
            smoothed: false,
        }
    }

    #[must_use]
    pub fn polyline(&self) -> &ClosedPolyline {
        &self.polyline
    }

    #[must_use]
    pub fn into_polyline(self) -> ClosedPolyline {
        self.polyline
    }

    /// Whether smoothing actually took place.
    #[must_use]
    pub fn is_smoothed(&self) -> bool {
        self.smoothed
    }
}

/// Fits a periodic smoothing spline through a closed polygon and samples it densely.
///
/// Consecutive duplicates (and a closing duplicate) are removed first. With
/// fewer than [`MIN_FIT_POINTS`] distinct points, or when the fit fails
/// numerically, the deduplicated input is returned unchanged.
#[derive(Debug)]
pub struct FitClosedCurve<'a> {
    polyline: &'a ClosedPolyline,
    smoothing: f64,
    dense_count: usize,
}

impl<'a> FitClosedCurve<'a> {
    /// Creates an interpolating fit (`smoothing = 0`) sampled at `dense_count` points.
    #[must_use]
    pub fn new(polyline: &'a ClosedPolyline, dense_count: usize) -> Self {
        Self {
            polyline,
            smoothing: 0.0,
            dense_count,
        }
    }

    /// Sets the residual bound; `0` interpolates every point.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Executes the fit.
    #[must_use]
    pub fn execute(&self) -> FitCurve {
        let mut distinct = dedupe_consecutive(self.polyline.points(), DUPLICATE_TOLERANCE);
        while is_explicitly_closed(&distinct) {
            distinct.pop();
        }

        if distinct.len() < MIN_FIT_POINTS {
            debug!(points = distinct.len(), "too few distinct points to fit");
            return FitCurve::unchanged(ClosedPolyline::from_samples(distinct));
        }
        if self.dense_count < ClosedPolyline::MIN_POINTS {
            warn!(dense_count = self.dense_count, "dense sample count too small; keeping input");
            return FitCurve::unchanged(ClosedPolyline::from_samples(distinct));
        }

        match PeriodicSpline::fit(&distinct, self.smoothing) {
            Ok(spline) => {
                let dense = spline.sample(self.dense_count);
                if dense.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
                    FitCurve::smoothed(ClosedPolyline::from_samples(dense))
                } else {
                    warn!("spline evaluation produced non-finite points; keeping input");
                    FitCurve::unchanged(ClosedPolyline::from_samples(distinct))
                }
            }
            Err(err) => {
                warn!(error = %err, smoothing = self.smoothing, "spline fit failed; keeping input");
                FitCurve::unchanged(ClosedPolyline::from_samples(distinct))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::operations::query::HausdorffDistance;
    use std::f64::consts::PI;

    fn ellipse(n: usize, a: f64, b: f64) -> ClosedPolyline {
        let pts = (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = 2.0 * PI * i as f64 / n as f64;
                Point2::new(a * t.cos(), b * t.sin())
            })
            .collect();
        ClosedPolyline::new(pts).unwrap()
    }

    #[test]
    fn interpolating_fit_reproduces_smooth_curve() {
        let sparse = ellipse(24, 12.0, 8.0);
        let truth = ellipse(2000, 12.0, 8.0);
        let fit = FitClosedCurve::new(&sparse, 1200).execute();
        assert!(fit.is_smoothed());
        assert_eq!(fit.polyline().len(), 1200);

        let h = HausdorffDistance::between(&truth, fit.polyline()).execute();
        assert!(h < 0.05, "h={h}");
        let area_err = (fit.polyline().area() - truth.area()).abs() / truth.area();
        assert!(area_err < 1e-3, "area_err={area_err}");
    }

    #[test]
    fn too_few_distinct_points_returns_input() {
        let tri = ClosedPolyline::from_xy(&[
            (0.0, 0.0),
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 0.0),
            (0.0, 3.0),
        ])
        .unwrap();
        let fit = FitClosedCurve::new(&tri, 100).execute();
        assert!(!fit.is_smoothed());
        assert_eq!(fit.polyline().len(), 3);
    }

    #[test]
    fn failed_fit_returns_deduplicated_input() {
        // A residual bound larger than the point spread cannot be met.
        let square =
            ClosedPolyline::from_xy(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
        let fit = FitClosedCurve::new(&square, 64)
            .with_smoothing(1e6)
            .execute();
        assert!(!fit.is_smoothed());
        assert_eq!(fit.polyline(), &square);
    }

    #[test]
    fn smoothing_keeps_curve_close() {
        let sparse = ellipse(40, 10.0, 6.0);
        let fit = FitClosedCurve::new(&sparse, 400)
            .with_smoothing(0.5)
            .execute();
        assert!(fit.is_smoothed());
        let h = HausdorffDistance::between(&sparse, fit.polyline()).execute();
        // Residual bound 0.5 over 40 points keeps every point within sqrt(0.5).
        assert!(h < 0.5_f64.sqrt() + 0.05, "h={h}");
    }
}
