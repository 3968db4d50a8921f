#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::operations::budget::BudgetResult;

/// Why a contour was left out of a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SkipReason {
    /// Fewer than three stored points once the closing duplicate is dropped.
    TooFewPoints(usize),
    /// Enclosed area below the noise threshold.
    BelowMinArea(f64),
}

/// A contour dropped before searching.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SkippedContour {
    pub slice_index: usize,
    pub z: f64,
    pub reason: SkipReason,
}

/// Aggregate statistics of a batch.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Summary {
    /// Contours whose chosen count satisfies both tolerances.
    pub passed_count: usize,
    /// Contours with no acceptable count, or whose fixed count failed.
    pub failed_count: usize,
    pub skipped_count: usize,
    /// Largest chosen count across all contours.
    pub worst_chosen_point_count: Option<usize>,
    /// Recommended budget for the whole structure: the worst chosen count,
    /// present only when every searched contour passed.
    pub structure_budget: Option<usize>,
    pub total_original_points: usize,
    pub mean_area_error: Option<f64>,
    pub mean_hausdorff: Option<f64>,
    pub mean_fit_area_error: Option<f64>,
    pub mean_fit_hausdorff: Option<f64>,
}

impl Summary {
    /// Aggregates per-contour results.
    #[must_use]
    pub fn from_results(results: &[BudgetResult], skipped_count: usize) -> Self {
        let passed_count = results.iter().filter(|r| r.within_tolerance()).count();
        let failed_count = results.len() - passed_count;
        let worst_chosen_point_count = results.iter().filter_map(BudgetResult::chosen).max();
        let structure_budget = if failed_count == 0 {
            worst_chosen_point_count
        } else {
            None
        };

        let evaluations: Vec<_> = results.iter().filter_map(BudgetResult::evaluation).collect();
        let fitted: Vec<_> = evaluations.iter().filter_map(|e| e.fitted).collect();

        Self {
            passed_count,
            failed_count,
            skipped_count,
            worst_chosen_point_count,
            structure_budget,
            total_original_points: results.iter().map(BudgetResult::original_point_count).sum(),
            mean_area_error: mean(evaluations.iter().map(|e| e.raw.area_error)),
            mean_hausdorff: mean(evaluations.iter().map(|e| e.raw.hausdorff)),
            mean_fit_area_error: mean(fitted.iter().map(|m| m.area_error)),
            mean_fit_hausdorff: mean(fitted.iter().map(|m| m.hausdorff)),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Results of one batch run over a structure, in ascending slice order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultSet {
    structure: String,
    results: Vec<BudgetResult>,
    skipped: Vec<SkippedContour>,
    summary: Summary,
}

impl ResultSet {
    pub(crate) fn new(
        structure: String,
        results: Vec<BudgetResult>,
        skipped: Vec<SkippedContour>,
    ) -> Self {
        let summary = Summary::from_results(&results, skipped.len());
        Self {
            structure,
            results,
            skipped,
            summary,
        }
    }

    #[must_use]
    pub fn structure(&self) -> &str {
        &self.structure
    }

    /// Per-contour results ordered by `(z, slice_index)`.
    #[must_use]
    pub fn results(&self) -> &[BudgetResult] {
        &self.results
    }

    #[must_use]
    pub fn skipped(&self) -> &[SkippedContour] {
        &self.skipped
    }

    #[must_use]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ContourId;
    use crate::operations::budget::{Evaluation, Metrics};

    fn evaluation(point_count: usize, area_error: f64, hausdorff: f64) -> Evaluation {
        Evaluation {
            point_count,
            raw: Metrics {
                area_error,
                hausdorff,
            },
            fitted: None,
        }
    }

    #[test]
    fn structure_budget_requires_all_passing() {
        let id = ContourId::new(0, 0.0);
        let results = vec![
            BudgetResult::accepted(id, 100, 5.0, evaluation(12, 0.002, 0.2)),
            BudgetResult::accepted(id, 80, 5.0, evaluation(20, 0.004, 0.4)),
        ];
        let summary = Summary::from_results(&results, 1);
        assert_eq!(summary.passed_count, 2);
        assert_eq!(summary.failed_count, 0);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.structure_budget, Some(20));
        assert_eq!(summary.total_original_points, 180);
        assert!((summary.mean_area_error.unwrap_or_default() - 0.003).abs() < 1e-12);
        assert!((summary.mean_hausdorff.unwrap_or_default() - 0.3).abs() < 1e-12);
        assert!(summary.mean_fit_area_error.is_none());

        let mut with_failure = results;
        with_failure.push(BudgetResult::not_found(id, 60, 5.0));
        let summary = Summary::from_results(&with_failure, 0);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.worst_chosen_point_count, Some(20));
        assert_eq!(summary.structure_budget, None);
    }

    #[test]
    fn empty_results() {
        let summary = Summary::from_results(&[], 0);
        assert_eq!(summary, Summary::default());
    }
}
