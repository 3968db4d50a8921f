use super::{Point2, WEIGHT_FLOOR};

/// Returns the minimum distance from point `p` to the line segment `a`→`b`.
///
/// The projection parameter is clamped to `[0, 1]`, so the nearest point
/// never leaves the segment. A zero-length segment uses a floored
/// denominator, which collapses the result to the distance `|p - a|`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();
    let len_sq = if len_sq > 0.0 { len_sq } else { WEIGHT_FLOOR };

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    let closest = a + d * t;

    (p - closest).norm()
}

/// Returns the minimum distance from `p` to any segment of a closed edge set.
///
/// `closed` must already repeat its first vertex at the end; segment `i`
/// runs from `closed[i]` to `closed[i + 1]`. Returns `f64::INFINITY` when
/// there are no segments.
#[must_use]
pub fn point_to_segments_min_dist(p: &Point2, closed: &[Point2]) -> f64 {
    closed
        .windows(2)
        .map(|w| point_to_segment_dist(p, &w[0], &w[1]))
        .fold(f64::INFINITY, f64::min)
}
