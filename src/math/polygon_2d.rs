use super::{Point2, TOLERANCE};

/// Distance under which two points are treated as the same vertex when
/// closing or deduplicating a polyline.
pub const DUPLICATE_TOLERANCE: f64 = 1e-8;

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. Fewer than three
/// points yield `0.0`.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Computes the unsigned area of a closed polygon.
///
/// Vertex winding is not guaranteed for contour data, so the sign of the
/// shoelace sum is discarded.
#[must_use]
pub fn polygon_area(points: &[Point2]) -> f64 {
    signed_area_2d(points).abs()
}

/// Returns whether the sequence already repeats its first point at the end.
#[must_use]
pub fn is_explicitly_closed(points: &[Point2]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => {
            (*first - *last).norm() <= DUPLICATE_TOLERANCE
        }
        _ => false,
    }
}

/// Returns the sequence with its first point appended, unless it is
/// already explicitly closed (or empty).
#[must_use]
pub fn close_polyline(points: &[Point2]) -> Vec<Point2> {
    let mut closed = points.to_vec();
    if let Some(&first) = points.first() {
        if !is_explicitly_closed(points) {
            closed.push(first);
        }
    }
    closed
}

/// Removes consecutive points closer than `tol` to the last kept point.
#[must_use]
pub fn dedupe_consecutive(points: &[Point2], tol: f64) -> Vec<Point2> {
    let mut kept: Vec<Point2> = Vec::with_capacity(points.len());
    for &pt in points {
        match kept.last() {
            Some(last) if (pt - *last).norm() <= tol => {}
            _ => kept.push(pt),
        }
    }
    kept
}

/// Returns the lengths of the `n` edges of the closed loop, where edge `i`
/// runs from vertex `i` to vertex `(i + 1) % n`.
#[must_use]
pub fn closed_edge_lengths(points: &[Point2]) -> Vec<f64> {
    let n = points.len();
    (0..n)
        .map(|i| (points[(i + 1) % n] - points[i]).norm())
        .collect()
}

/// Returns the perimeter of the closed loop.
#[must_use]
pub fn closed_perimeter(points: &[Point2]) -> f64 {
    closed_edge_lengths(points).iter().sum()
}

/// Returns normalized cumulative chord-length parameters for a closed loop.
///
/// The result has `n + 1` entries: `0.0` for the first vertex, increasing
/// through each vertex, and `1.0` for the return to the first vertex.
/// Returns `None` when the loop has (near) zero perimeter.
#[must_use]
pub fn closed_chord_parameters(points: &[Point2]) -> Option<Vec<f64>> {
    let lengths = closed_edge_lengths(points);
    let total: f64 = lengths.iter().sum();
    if total < TOLERANCE {
        return None;
    }
    let mut params = Vec::with_capacity(lengths.len() + 1);
    let mut acc = 0.0;
    params.push(0.0);
    for len in &lengths {
        acc += len;
        params.push(acc / total);
    }
    Some(params)
}

/// Returns the arithmetic mean of the points.
#[must_use]
pub fn centroid(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    Some(Point2::new(sx / n, sy / n))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn unit_square() -> Vec<Point2> {
        vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]
    }

    #[test]
    fn signed_area_ccw_square() {
        let area = signed_area_2d(&unit_square());
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = unit_square();
        pts.reverse();
        let area = signed_area_2d(&pts);
        assert!((area + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn area_invariant_under_rotation_and_reversal() {
        let base = unit_square();
        for shift in 0..base.len() {
            let mut rotated = base.clone();
            rotated.rotate_left(shift);
            assert!((polygon_area(&rotated) - 1.0).abs() < TOLERANCE);
            rotated.reverse();
            assert!((polygon_area(&rotated) - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn area_degenerate() {
        assert!(polygon_area(&[]).abs() < TOLERANCE);
        assert!(polygon_area(&[p(0.0, 0.0)]).abs() < TOLERANCE);
        assert!(polygon_area(&[p(0.0, 0.0), p(3.0, 4.0)]).abs() < TOLERANCE);
    }

    #[test]
    fn close_appends_first_point_once() {
        let closed = close_polyline(&unit_square());
        assert_eq!(closed.len(), 5);
        assert_eq!(closed[4], closed[0]);

        let again = close_polyline(&closed);
        assert_eq!(again.len(), 5);
    }

    #[test]
    fn close_empty_is_empty() {
        assert!(close_polyline(&[]).is_empty());
    }

    #[test]
    fn dedupe_drops_consecutive_repeats_only() {
        let pts = vec![
            p(0.0, 0.0),
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(1.0, 1e-12),
            p(1.0, 1.0),
            p(0.0, 0.0),
        ];
        let out = dedupe_consecutive(&pts, DUPLICATE_TOLERANCE);
        assert_eq!(out.len(), 4);
        assert_eq!(out[3], p(0.0, 0.0));
    }

    #[test]
    fn chord_parameters_square() {
        let params = closed_chord_parameters(&unit_square()).unwrap();
        let expected = [0.0, 0.25, 0.5, 0.75, 1.0];
        assert_eq!(params.len(), expected.len());
        for (a, b) in params.iter().zip(expected.iter()) {
            assert!((a - b).abs() < TOLERANCE, "{a} != {b}");
        }
    }

    #[test]
    fn chord_parameters_collapsed_loop() {
        assert!(closed_chord_parameters(&[p(2.0, 2.0), p(2.0, 2.0)]).is_none());
    }

    #[test]
    fn perimeter_and_centroid() {
        assert!((closed_perimeter(&unit_square()) - 4.0).abs() < TOLERANCE);
        let c = centroid(&unit_square()).unwrap();
        assert!((c.x - 0.5).abs() < TOLERANCE);
        assert!((c.y - 0.5).abs() < TOLERANCE);
        assert!(centroid(&[]).is_none());
    }
}
