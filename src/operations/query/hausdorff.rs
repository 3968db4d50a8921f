use rayon::prelude::*;

use crate::geometry::ClosedPolyline;
use crate::math::distance_2d::point_to_segments_min_dist;
use crate::math::polygon_2d::close_polyline;
use crate::math::Point2;

/// Number of query points evaluated against all segments per batch.
pub const DEFAULT_BATCH_SIZE: usize = 2048;

/// Computes the symmetric Hausdorff distance between two closed polylines.
///
/// Distances are measured from the vertices of one curve to the nearest
/// *segment* of the other, so the result does not overstate the mismatch
/// when the two curves are sampled at very different densities.
///
/// Vertices are processed in batches of `batch_size`, keeping the working
/// set proportional to one batch rather than to the whole vertex count.
/// Batches may run on different workers; the result does not depend on it.
#[derive(Debug)]
pub struct HausdorffDistance<'a> {
    a: &'a [Point2],
    b: &'a [Point2],
    batch_size: usize,
}

impl<'a> HausdorffDistance<'a> {
    /// Creates a new Hausdorff query over raw point sequences.
    ///
    /// Either sequence may or may not repeat its first point at the end.
    #[must_use]
    pub fn new(a: &'a [Point2], b: &'a [Point2]) -> Self {
        Self {
            a,
            b,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Creates a new Hausdorff query between two closed polylines.
    #[must_use]
    pub fn between(a: &'a ClosedPolyline, b: &'a ClosedPolyline) -> Self {
        Self::new(a.points(), b.points())
    }

    /// Sets the batch size (clamped to at least 1).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Executes the query, returning `max(directed(a→b), directed(b→a))`.
    ///
    /// Returns `NaN` when either sequence is empty.
    #[must_use]
    pub fn execute(&self) -> f64 {
        if self.a.is_empty() || self.b.is_empty() {
            return f64::NAN;
        }
        let ab = directed_hausdorff(self.a, self.b, self.batch_size);
        let ba = directed_hausdorff(self.b, self.a, self.batch_size);
        ab.max(ba)
    }
}

/// Returns the largest distance from a vertex of `from` to the closed edge set of `to`.
///
/// `to` is closed first if it does not already repeat its first point.
/// Returns `NaN` when either sequence is empty.
#[must_use]
pub fn directed_hausdorff(from: &[Point2], to: &[Point2], batch_size: usize) -> f64 {
    if from.is_empty() || to.is_empty() {
        return f64::NAN;
    }
    let segments = close_polyline(to);

    from.par_chunks(batch_size.max(1))
        .map(|batch| {
            batch
                .iter()
                .map(|p| point_to_segments_min_dist(p, &segments))
                .fold(0.0, f64::max)
        })
        .reduce(|| 0.0, f64::max)
}
