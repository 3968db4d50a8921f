use crate::geometry::ClosedPolyline;
use crate::math::Point2;

use super::FitCurve;

/// Smooths a closed polygon by repeated corner cutting.
///
/// Each pass replaces every edge `p0 → p1` by its points at 1/4 and 3/4, so
/// the point count doubles per pass. The result stays inside the convex hull
/// of the input and converges to a quadratic B-spline.
#[derive(Debug)]
pub struct ChaikinSmooth<'a> {
    polyline: &'a ClosedPolyline,
    iterations: usize,
}

impl<'a> ChaikinSmooth<'a> {
    /// Default number of passes.
    pub const DEFAULT_ITERATIONS: usize = 3;

    #[must_use]
    pub fn new(polyline: &'a ClosedPolyline) -> Self {
        Self {
            polyline,
            iterations: Self::DEFAULT_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Executes the smoothing.
    ///
    /// Degenerate loops (fewer than 3 points) and zero iterations return the
    /// input unchanged.
    #[must_use]
    pub fn execute(&self) -> FitCurve {
        if self.polyline.is_degenerate() || self.iterations == 0 {
            return FitCurve::unchanged(self.polyline.clone());
        }

        let mut pts = self.polyline.points().to_vec();
        for _ in 0..self.iterations {
            let n = pts.len();
            let mut next: Vec<Point2> = Vec::with_capacity(n * 2);
            for i in 0..n {
                let p0 = pts[i].coords;
                let p1 = pts[(i + 1) % n].coords;
                next.push(Point2::from(p0 * 0.75 + p1 * 0.25));
                next.push(Point2::from(p0 * 0.25 + p1 * 0.75));
            }
            pts = next;
        }
        FitCurve::smoothed(ClosedPolyline::from_samples(pts))
    }
}
