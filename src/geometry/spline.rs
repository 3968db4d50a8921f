use nalgebra::DMatrix;

use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{centroid, closed_chord_parameters};
use crate::math::{Point2, Vector2};

/// Smallest and largest smoothing weights tried when matching a residual bound.
const LAMBDA_MIN: f64 = 1e-16;
const LAMBDA_MAX: f64 = 1e8;

/// Bisection steps (in log space) when matching a residual bound.
const LAMBDA_ITERATIONS: usize = 100;

/// Relative accuracy at which a residual bound is considered met.
const RESIDUAL_RTOL: f64 = 1e-4;

/// A closed cubic spline with continuous second derivative across the seam.
///
/// Parametrized on `[0, 1)` by normalized cumulative chord length of the
/// fitted points. Stored in value/second-derivative form: on the interval
/// `[u_i, u_{i+1}]` the curve is the cubic determined by `values[i]`,
/// `values[i + 1]`, `second_derivs[i]` and `second_derivs[i + 1]`, with all
/// indices taken modulo the knot count.
#[derive(Debug, Clone)]
pub struct PeriodicSpline {
    /// `n + 1` increasing knots from `0.0` to `1.0`.
    knots: Vec<f64>,
    values: Vec<Point2>,
    second_derivs: Vec<Vector2>,
}

impl PeriodicSpline {
    /// Fits a periodic smoothing spline through a closed point sequence.
    ///
    /// With `smoothing == 0` the spline interpolates every point. With
    /// `smoothing > 0` the spline minimizes its bending energy subject to the
    /// sum of squared distances between the points and their curve positions
    /// being at most `smoothing`.
    ///
    /// The input must not contain consecutive duplicates or the closing
    /// duplicate of the first point.
    ///
    /// # Errors
    ///
    /// - `GeometryError::TooFewPoints` if fewer than 4 points are given
    /// - `GeometryError::Degenerate` if the points have zero perimeter, the
    ///   linear system is singular, or the residual bound can only be met by
    ///   collapsing the curve to a point
    pub fn fit(points: &[Point2], smoothing: f64) -> Result<Self> {
        let n = points.len();
        if n < 4 {
            return Err(GeometryError::TooFewPoints {
                required: 4,
                actual: n,
            }
            .into());
        }
        let knots = closed_chord_parameters(points)
            .ok_or_else(|| GeometryError::Degenerate("closed curve has zero length".to_owned()))?;
        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
        if h.iter().any(|&hi| hi <= 0.0) {
            return Err(GeometryError::Degenerate("repeated knot in spline fit".to_owned()).into());
        }

        let system = SmoothingSystem::new(points, &h);

        if smoothing <= 0.0 {
            let (values, second_derivs) = system.solve(0.0)?;
            return Ok(Self {
                knots,
                values,
                second_derivs,
            });
        }

        let lambda = system.match_residual(points, smoothing)?;
        let (values, second_derivs) = system.solve(lambda)?;
        Ok(Self {
            knots,
            values,
            second_derivs,
        })
    }

    /// Evaluates the curve at parameter `u`, wrapped into `[0, 1)`.
    #[must_use]
    pub fn evaluate(&self, u: f64) -> Point2 {
        let n = self.values.len();
        let u = u.rem_euclid(1.0);
        let i = self
            .knots
            .partition_point(|&k| k <= u)
            .saturating_sub(1)
            .min(n - 1);
        let j = (i + 1) % n;

        let h = self.knots[i + 1] - self.knots[i];
        let a = u - self.knots[i];
        let b = self.knots[i + 1] - u;

        let linear = (self.values[j].coords * a + self.values[i].coords * b) / h;
        let bend = (self.second_derivs[j] * (1.0 + a / h) + self.second_derivs[i] * (1.0 + b / h))
            * (a * b / 6.0);
        Point2::from(linear - bend)
    }

    /// Evaluates `count` points at evenly spaced parameters over one period.
    ///
    /// The seam parameter `1.0` is excluded since it duplicates `0.0`.
    #[must_use]
    pub fn sample(&self, count: usize) -> Vec<Point2> {
        #[allow(clippy::cast_precision_loss)]
        let step = 1.0 / count as f64;
        #[allow(clippy::cast_precision_loss)]
        (0..count).map(|k| self.evaluate(k as f64 * step)).collect()
    }

    /// Returns the fitted curve positions at the input points.
    #[must_use]
    pub fn knot_values(&self) -> &[Point2] {
        &self.values
    }
}

/// The periodic linear system shared by every smoothing weight.
///
/// `r` is the cyclic tridiagonal matrix coupling second derivatives, and
/// `qt` maps values to the jumps in first divided differences. The spline
/// with smoothing weight `lambda` solves
/// `(R + lambda * Qt * Q) gamma = Qt * y` and has values `y - lambda * Q gamma`.
struct SmoothingSystem {
    r: DMatrix<f64>,
    qt: DMatrix<f64>,
    qtq: DMatrix<f64>,
    y: DMatrix<f64>,
    qty: DMatrix<f64>,
}

impl SmoothingSystem {
    fn new(points: &[Point2], h: &[f64]) -> Self {
        let n = points.len();
        let mut r = DMatrix::<f64>::zeros(n, n);
        let mut qt = DMatrix::<f64>::zeros(n, n);
        for i in 0..n {
            let prev = (i + n - 1) % n;
            let next = (i + 1) % n;
            let h_prev = h[prev];
            let h_cur = h[i];

            r[(i, i)] += (h_prev + h_cur) / 3.0;
            r[(i, next)] += h_cur / 6.0;
            r[(i, prev)] += h_prev / 6.0;

            qt[(i, prev)] += 1.0 / h_prev;
            qt[(i, i)] -= 1.0 / h_prev + 1.0 / h_cur;
            qt[(i, next)] += 1.0 / h_cur;
        }
        let y = DMatrix::from_fn(n, 2, |row, col| {
            if col == 0 {
                points[row].x
            } else {
                points[row].y
            }
        });
        let qtq = &qt * qt.transpose();
        let qty = &qt * &y;
        Self {
            r,
            qt,
            qtq,
            y,
            qty,
        }
    }

    fn solve(&self, lambda: f64) -> Result<(Vec<Point2>, Vec<Vector2>)> {
        let lhs = &self.r + &self.qtq * lambda;
        let chol = lhs
            .cholesky()
            .ok_or_else(|| GeometryError::Degenerate("singular spline system".to_owned()))?;
        let gamma = chol.solve(&self.qty);
        let values = &self.y - self.qt.transpose() * &gamma * lambda;

        if values.iter().chain(gamma.iter()).any(|v| !v.is_finite()) {
            return Err(GeometryError::Degenerate("non-finite spline coefficients".to_owned()).into());
        }

        let n = self.y.nrows();
        let points = (0..n)
            .map(|i| Point2::new(values[(i, 0)], values[(i, 1)]))
            .collect();
        let derivs = (0..n)
            .map(|i| Vector2::new(gamma[(i, 0)], gamma[(i, 1)]))
            .collect();
        Ok((points, derivs))
    }

    fn residual(&self, points: &[Point2], lambda: f64) -> Result<f64> {
        let (values, _) = self.solve(lambda)?;
        Ok(points
            .iter()
            .zip(values.iter())
            .map(|(p, v)| (p - v).norm_squared())
            .sum())
    }

    /// Finds the smoothing weight whose residual equals `target`.
    ///
    /// The residual grows monotonically with the weight, from zero
    /// (interpolation) towards the spread of the points about their
    /// centroid (a constant curve). Weights whose system cannot be solved
    /// are treated as too large.
    fn match_residual(&self, points: &[Point2], target: f64) -> Result<f64> {
        let center = centroid(points)
            .ok_or_else(|| GeometryError::Degenerate("empty spline input".to_owned()))?;
        let spread: f64 = points.iter().map(|p| (p - center).norm_squared()).sum();
        if target >= spread {
            return Err(GeometryError::Degenerate(format!(
                "smoothing {target} collapses the curve (point spread {spread})"
            ))
            .into());
        }

        let mut lo = LAMBDA_MIN.ln();
        let mut hi = LAMBDA_MAX.ln();
        let mut best = None;
        for _ in 0..LAMBDA_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            let lambda = mid.exp();
            match self.residual(points, lambda) {
                Ok(res) if (res - target).abs() <= RESIDUAL_RTOL * target => {
                    return Ok(lambda);
                }
                Ok(res) if res < target => {
                    best = Some(lambda);
                    lo = mid;
                }
                Ok(_) | Err(_) => hi = mid,
            }
        }
        best.ok_or_else(|| {
            GeometryError::Degenerate("no smoothing weight meets the residual bound".to_owned())
                .into()
        })
    }
}
