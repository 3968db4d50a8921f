#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::ContourId;

/// Fidelity of one reconstruction against the original contour.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metrics {
    /// `|area(candidate) - area(original)| / area(original)`.
    pub area_error: f64,
    /// Symmetric Hausdorff distance in millimeters.
    pub hausdorff: f64,
}

impl Metrics {
    /// Returns `true` if both metrics are within their tolerances.
    ///
    /// `NaN` metrics never pass.
    #[must_use]
    pub fn within(&self, area_tolerance: f64, distance_tolerance: f64) -> bool {
        self.area_error <= area_tolerance && self.hausdorff <= distance_tolerance
    }
}

/// Metrics measured for a single candidate point count.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Evaluation {
    pub point_count: usize,
    /// Metrics of the resampled polygon.
    pub raw: Metrics,
    /// Metrics of the smoothed curve, when a fit is configured.
    pub fitted: Option<Metrics>,
}

impl Evaluation {
    /// The metrics acceptance is decided on: fitted when present, raw otherwise.
    #[must_use]
    pub fn decisive(&self) -> Metrics {
        self.fitted.unwrap_or(self.raw)
    }

    #[must_use]
    pub fn passes(&self, area_tolerance: f64, distance_tolerance: f64) -> bool {
        self.decisive().within(area_tolerance, distance_tolerance)
    }
}

/// Outcome of a budget search for one contour.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BudgetResult {
    contour: ContourId,
    original_point_count: usize,
    original_area: f64,
    evaluation: Option<Evaluation>,
    within_tolerance: bool,
}

impl BudgetResult {
    pub(crate) fn accepted(
        contour: ContourId,
        original_point_count: usize,
        original_area: f64,
        evaluation: Evaluation,
    ) -> Self {
        Self {
            contour,
            original_point_count,
            original_area,
            evaluation: Some(evaluation),
            within_tolerance: true,
        }
    }

    pub(crate) fn not_found(
        contour: ContourId,
        original_point_count: usize,
        original_area: f64,
    ) -> Self {
        Self {
            contour,
            original_point_count,
            original_area,
            evaluation: None,
            within_tolerance: false,
        }
    }

    pub(crate) fn single(
        contour: ContourId,
        original_point_count: usize,
        original_area: f64,
        evaluation: Evaluation,
        within_tolerance: bool,
    ) -> Self {
        Self {
            contour,
            original_point_count,
            original_area,
            evaluation: Some(evaluation),
            within_tolerance,
        }
    }

    #[must_use]
    pub fn contour(&self) -> ContourId {
        self.contour
    }

    #[must_use]
    pub fn original_point_count(&self) -> usize {
        self.original_point_count
    }

    #[must_use]
    pub fn original_area(&self) -> f64 {
        self.original_area
    }

    /// The chosen point count, or `None` when no acceptable budget was found.
    #[must_use]
    pub fn chosen(&self) -> Option<usize> {
        self.evaluation.map(|e| e.point_count)
    }

    /// Metrics at the chosen count.
    #[must_use]
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Whether the chosen count satisfies both tolerances.
    #[must_use]
    pub fn within_tolerance(&self) -> bool {
        self.within_tolerance
    }

    /// Chosen count as a fraction of the original count.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reduction_ratio(&self) -> Option<f64> {
        let chosen = self.chosen()?;
        (self.original_point_count > 0)
            .then(|| chosen as f64 / self.original_point_count as f64)
    }
}
