use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::{ClosedPolyline, Contour};
use crate::operations::fit::{ChaikinSmooth, FitClosedCurve, FitCurve, FitMode};
use crate::operations::query::{relative_area_error, HausdorffDistance};
use crate::operations::resample::Resample;

use super::config::{BudgetConfig, SearchPolicy};
use super::result::{BudgetResult, Evaluation, Metrics};

/// A candidate reconstruction of a contour at a given point count.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// The resampled polygon.
    pub resampled: ClosedPolyline,
    /// The smoothed curve, when a fit is configured.
    pub fitted: Option<FitCurve>,
}

impl Reconstruction {
    /// The curve a caller would display: fitted when present, resampled otherwise.
    #[must_use]
    pub fn display(&self) -> &ClosedPolyline {
        self.fitted
            .as_ref()
            .map_or(&self.resampled, FitCurve::polyline)
    }
}

/// Finds the smallest point count that reconstructs a contour within tolerances.
///
/// Candidates are generated by [`Resample`] (and optionally smoothed), then
/// measured against the original by relative area error and Hausdorff
/// distance. Searching policies accept the first passing count in ascending
/// order; single-evaluation policies report their target count together
/// with whether it passed.
///
/// # Example
///
/// ```
/// use contour_budget::geometry::{ClosedPolyline, Contour, ContourId};
/// use contour_budget::operations::budget::{BudgetConfig, BudgetSearch};
///
/// let square = ClosedPolyline::from_xy(&[
///     (0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0),
///     (2.0, 2.0), (1.0, 2.0), (0.0, 2.0), (0.0, 1.0),
/// ]).unwrap();
/// let contour = Contour::new(ContourId::new(0, 0.0), square);
/// let result = BudgetSearch::new(&contour, &BudgetConfig::default()).execute().unwrap();
/// assert!(result.chosen().is_some());
/// ```
#[derive(Debug)]
pub struct BudgetSearch<'a> {
    contour: &'a Contour,
    config: &'a BudgetConfig,
}

impl<'a> BudgetSearch<'a> {
    #[must_use]
    pub fn new(contour: &'a Contour, config: &'a BudgetConfig) -> Self {
        Self { contour, config }
    }

    /// Executes the search.
    ///
    /// An exhausted search is a normal outcome: the result then has no
    /// chosen count.
    ///
    /// # Errors
    ///
    /// - `ConfigError` if the configuration is out of range
    /// - `GeometryError::ZeroArea` if the contour does not enclose a positive area
    /// - `GeometryError::TooFewPoints` if the contour has fewer than 3 points
    pub fn execute(&self) -> Result<BudgetResult> {
        self.config.validate()?;
        self.check_contour()?;

        let id = self.contour.id();
        let original = self.contour.point_count();
        let area = self.contour.area();

        let result = match &self.config.policy {
            SearchPolicy::Exhaustive | SearchPolicy::Candidates(_) => {
                let mut found = None;
                for count in self.scan_counts() {
                    let evaluation = self.evaluate(count)?;
                    let decisive = evaluation.decisive();
                    debug!(
                        slice = id.slice_index,
                        count,
                        area_error = decisive.area_error,
                        hausdorff = decisive.hausdorff,
                        "evaluated candidate"
                    );
                    if self.passes(&evaluation) {
                        found = Some(evaluation);
                        break;
                    }
                }
                match found {
                    Some(evaluation) => BudgetResult::accepted(id, original, area, evaluation),
                    None => BudgetResult::not_found(id, original, area),
                }
            }
            SearchPolicy::Ratio(_) | SearchPolicy::FixedPoints(_) => {
                let count = self.target_count().unwrap_or(self.config.min_points);
                let evaluation = self.evaluate(count)?;
                let passed = self.passes(&evaluation);
                BudgetResult::single(id, original, area, evaluation, passed)
            }
        };

        debug!(
            slice = id.slice_index,
            z = id.z,
            original,
            chosen = ?result.chosen(),
            within_tolerance = result.within_tolerance(),
            "budget search finished"
        );
        Ok(result)
    }

    /// Target count of a single-evaluation policy, `None` for searching policies.
    #[must_use]
    pub fn target_count(&self) -> Option<usize> {
        let floor = self.config.min_points;
        match &self.config.policy {
            SearchPolicy::Ratio(ratio) => {
                #[allow(
                    clippy::cast_precision_loss,
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss
                )]
                let target = (self.contour.point_count() as f64 * ratio).round() as usize;
                Some(target.max(floor))
            }
            SearchPolicy::FixedPoints(n) => Some((*n).max(floor)),
            SearchPolicy::Exhaustive | SearchPolicy::Candidates(_) => None,
        }
    }

    /// Builds the resampled (and optionally smoothed) candidate at `count` points.
    ///
    /// # Errors
    ///
    /// Propagates resampling errors, e.g. `OperationError::BelowFloor`.
    pub fn reconstruct(&self, count: usize) -> Result<Reconstruction> {
        let resampled = Resample::new(self.contour.polyline(), count)
            .with_mode(self.config.mode)
            .with_alpha(self.config.alpha)
            .execute()?;

        let fitted = match self.config.fit {
            FitMode::None => None,
            FitMode::PeriodicSpline => Some(
                FitClosedCurve::new(&resampled, self.config.dense_count)
                    .with_smoothing(self.config.smoothing)
                    .execute(),
            ),
            FitMode::Chaikin { iterations } => Some(
                ChaikinSmooth::new(&resampled)
                    .with_iterations(iterations)
                    .execute(),
            ),
        };
        Ok(Reconstruction { resampled, fitted })
    }

    /// Measures the candidate at `count` points.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::reconstruct`] and the area metric.
    pub fn evaluate(&self, count: usize) -> Result<Evaluation> {
        let candidate = self.reconstruct(count)?;
        let raw = self.measure(&candidate.resampled)?;
        let fitted = match &candidate.fitted {
            Some(fit) => Some(self.measure(fit.polyline())?),
            None => None,
        };
        Ok(Evaluation {
            point_count: count,
            raw,
            fitted,
        })
    }

    fn measure(&self, candidate: &ClosedPolyline) -> Result<Metrics> {
        Ok(Metrics {
            area_error: relative_area_error(self.contour.area(), candidate.points())?,
            hausdorff: HausdorffDistance::between(self.contour.polyline(), candidate).execute(),
        })
    }

    fn passes(&self, evaluation: &Evaluation) -> bool {
        evaluation.passes(self.config.area_tolerance, self.config.distance_tolerance)
    }

    fn check_contour(&self) -> Result<()> {
        let area = self.contour.area();
        if !(area.is_finite() && area > 0.0) {
            return Err(GeometryError::ZeroArea { area }.into());
        }
        let actual = self.contour.point_count();
        if actual < ClosedPolyline::MIN_POINTS {
            return Err(GeometryError::TooFewPoints {
                required: ClosedPolyline::MIN_POINTS,
                actual,
            }
            .into());
        }
        Ok(())
    }

    /// Ascending counts visited by a searching policy.
    fn scan_counts(&self) -> Vec<usize> {
        let floor = self.config.min_points;
        match &self.config.policy {
            SearchPolicy::Exhaustive => {
                (floor..=floor.max(self.contour.point_count())).collect()
            }
            SearchPolicy::Candidates(list) => {
                let mut counts: Vec<usize> = list.iter().map(|&n| n.max(floor)).collect();
                counts.sort_unstable();
                counts.dedup();
                counts
            }
            SearchPolicy::Ratio(_) | SearchPolicy::FixedPoints(_) => Vec::new(),
        }
    }
}
