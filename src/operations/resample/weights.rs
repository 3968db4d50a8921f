use crate::math::polygon_2d::closed_edge_lengths;
use crate::math::{Point2, WEIGHT_FLOOR};
use crate::operations::query::Curvature;

use super::SamplingMode;

/// Normalized cumulative edge weights of one closed loop.
///
/// Edge `i` runs from vertex `i` to vertex `(i + 1) % n` and occupies the
/// interval `[cumulative[i], cumulative[i + 1]]` of `[0, 1]`. Only lives for
/// the duration of a single resampling call.
#[derive(Debug, Clone)]
pub struct CurveWeights {
    cumulative: Vec<f64>,
}

impl CurveWeights {
    /// Computes edge weights for the loop.
    ///
    /// - `Uniform`: weight = edge length.
    /// - `CurvatureWeighted`: weight = edge length × (1 + `alpha` × mean
    ///   turning angle of the edge's two endpoints).
    ///
    /// Returns `None` when the total weight collapses to zero.
    #[must_use]
    pub fn compute(points: &[Point2], mode: SamplingMode, alpha: f64) -> Option<Self> {
        let lengths = closed_edge_lengths(points);
        let weights: Vec<f64> = match mode {
            SamplingMode::Uniform => lengths,
            SamplingMode::CurvatureWeighted => {
                let curvature = Curvature::new(points).execute();
                let n = points.len();
                lengths
                    .iter()
                    .enumerate()
                    .map(|(i, len)| {
                        let edge_curv = 0.5 * (curvature[i] + curvature[(i + 1) % n]);
                        len * (1.0 + alpha * edge_curv)
                    })
                    .collect()
            }
        };

        let total: f64 = weights.iter().sum();
        if total.is_nan() || total <= WEIGHT_FLOOR {
            return None;
        }

        let mut cumulative = Vec::with_capacity(weights.len() + 1);
        let mut acc = 0.0;
        cumulative.push(0.0);
        for w in &weights {
            acc += w;
            cumulative.push(acc / total);
        }
        Some(Self { cumulative })
    }

    /// Number of edges covered.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.cumulative.len() - 1
    }

    /// Finds the edge whose interval contains `t` and the fraction of the
    /// way through that edge.
    ///
    /// Zero-weight edges report a fraction of `0.0`.
    #[must_use]
    pub fn locate(&self, t: f64) -> (usize, f64) {
        let last = self.edge_count() - 1;
        let edge = self
            .cumulative
            .partition_point(|&c| c <= t)
            .saturating_sub(1)
            .min(last);
        let start = self.cumulative[edge];
        let width = self.cumulative[edge + 1] - start;
        if width <= WEIGHT_FLOOR {
            (edge, 0.0)
        } else {
            (edge, (t - start) / width)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn uniform_weights_follow_edge_lengths() {
        // Rectangle 3 x 1: edges 3, 1, 3, 1.
        let pts = [p(0.0, 0.0), p(3.0, 0.0), p(3.0, 1.0), p(0.0, 1.0)];
        let w = CurveWeights::compute(&pts, SamplingMode::Uniform, 0.0).unwrap();
        assert_eq!(w.edge_count(), 4);
        // Cumulative: 0, 3/8, 4/8, 7/8, 1.
        let (edge, frac) = w.locate(0.25);
        assert_eq!(edge, 0);
        assert!((frac - 2.0 / 3.0).abs() < 1e-12);
        let (edge, frac) = w.locate(0.45);
        assert_eq!(edge, 1);
        assert!((frac - 0.6).abs() < 1e-12);
    }

    #[test]
    fn zero_alpha_matches_uniform() {
        let pts = [p(0.0, 0.0), p(4.0, 0.0), p(5.0, 3.0), p(1.0, 2.0)];
        let a = CurveWeights::compute(&pts, SamplingMode::Uniform, 0.0).unwrap();
        let b = CurveWeights::compute(&pts, SamplingMode::CurvatureWeighted, 0.0).unwrap();
        for (x, y) in a.cumulative.iter().zip(b.cumulative.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn curvature_inflates_corner_edges() {
        // Three collinear edges along the bottom; the middle one has
        // straight endpoints, the outer ones touch corners.
        let pts = [
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(2.0, 0.0),
            p(3.0, 0.0),
            p(3.0, 3.0),
            p(0.0, 3.0),
        ];
        let w = CurveWeights::compute(&pts, SamplingMode::CurvatureWeighted, 5.0).unwrap();
        let width = |i: usize| w.cumulative[i + 1] - w.cumulative[i];
        assert!(width(0) > 2.0 * width(1));
        assert!(width(2) > 2.0 * width(1));
    }

    #[test]
    fn collapsed_loop_has_no_weights() {
        let pts = [p(1.0, 1.0), p(1.0, 1.0), p(1.0, 1.0)];
        assert!(CurveWeights::compute(&pts, SamplingMode::Uniform, 0.0).is_none());
    }
}
