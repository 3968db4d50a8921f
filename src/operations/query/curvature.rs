use crate::geometry::ClosedPolyline;
use crate::math::{Point2, LENGTH_EPSILON};

/// Computes the discrete turning-angle curvature at each vertex of a closed loop.
///
/// At vertex `i` the incoming edge is `p[i] - p[i-1]` and the outgoing edge
/// is `p[i+1] - p[i]`, with indices wrapping around the loop. The curvature
/// is the angle between them, in `[0, π]`: `0` for a straight continuation
/// and `π` for a full reversal.
#[derive(Debug)]
pub struct Curvature<'a> {
    points: &'a [Point2],
}

impl<'a> Curvature<'a> {
    /// Creates a new `Curvature` query over raw points.
    #[must_use]
    pub fn new(points: &'a [Point2]) -> Self {
        Self { points }
    }

    /// Creates a new `Curvature` query over a closed polyline.
    #[must_use]
    pub fn of(polyline: &'a ClosedPolyline) -> Self {
        Self::new(polyline.points())
    }

    /// Executes the query, returning one angle per vertex.
    ///
    /// Fewer than three points yield all zeros.
    #[must_use]
    pub fn execute(&self) -> Vec<f64> {
        let n = self.points.len();
        if n < 3 {
            return vec![0.0; n];
        }

        (0..n)
            .map(|i| {
                let prev = self.points[(i + n - 1) % n];
                let cur = self.points[i];
                let next = self.points[(i + 1) % n];
                let v1 = cur - prev;
                let v2 = next - cur;
                let cos = v1.dot(&v2) / (v1.norm() * v2.norm() + LENGTH_EPSILON);
                cos.clamp(-1.0, 1.0).acos()
            })
            .collect()
    }
}
