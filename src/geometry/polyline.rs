use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{closed_perimeter, is_explicitly_closed, polygon_area};
use crate::math::Point2;

/// An ordered loop of points where the last point connects back to the first.
///
/// The closing duplicate is never stored: a trailing point equal to the
/// first is dropped on construction. Area, resampling and fitting are only
/// defined for three or more points; shorter loops are kept as values so
/// callers can detect them with [`ClosedPolyline::is_degenerate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedPolyline {
    points: Vec<Point2>,
}

impl ClosedPolyline {
    /// Minimum number of points for area, resampling and fitting.
    pub const MIN_POINTS: usize = 3;

    /// Creates a closed polyline from its vertices.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::TooFewPoints` if `points` is empty.
    pub fn new(mut points: Vec<Point2>) -> Result<Self> {
        if points.is_empty() {
            return Err(GeometryError::TooFewPoints {
                required: 1,
                actual: 0,
            }
            .into());
        }
        while is_explicitly_closed(&points) {
            points.pop();
        }
        Ok(Self { points })
    }

    /// Wraps generated samples as-is, keeping coincident first and last points.
    ///
    /// Used for resampler output, whose point count must be exact even when
    /// every sample lands on the same location.
    pub(crate) fn from_samples(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Creates a closed polyline from `(x, y)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::TooFewPoints` if `pairs` is empty.
    pub fn from_xy(pairs: &[(f64, f64)]) -> Result<Self> {
        Self::new(pairs.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    /// Returns the vertices, without the closing duplicate.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Consumes the polyline, returning its vertices.
    #[must_use]
    pub fn into_points(self) -> Vec<Point2> {
        self.points
    }

    /// Returns the number of stored vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if there are no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if the loop has fewer than [`Self::MIN_POINTS`] vertices.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < Self::MIN_POINTS
    }

    /// Unsigned enclosed area (shoelace); `0.0` for degenerate loops.
    #[must_use]
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Length of the loop including the closing edge.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        closed_perimeter(&self.points)
    }

    /// Returns the vertices as `(x, y)` pairs.
    #[must_use]
    pub fn to_xy(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.x, p.y)).collect()
    }
}
