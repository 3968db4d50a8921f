#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::operations::fit::FitMode;
use crate::operations::resample::{Resample, SamplingMode};

/// Upper bound on Chaikin passes; each pass doubles the point count.
pub const MAX_CHAIKIN_ITERATIONS: usize = 10;

/// How the point count of a contour is chosen.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SearchPolicy {
    /// Scan every count from the floor up to the original count.
    #[default]
    Exhaustive,
    /// Single evaluation at `max(floor, round(original × ratio))`.
    Ratio(f64),
    /// Single evaluation at `max(floor, n)`.
    FixedPoints(usize),
    /// Scan the listed counts in ascending order.
    Candidates(Vec<usize>),
}

impl SearchPolicy {
    /// Returns `true` for policies that look for the first passing count.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        matches!(self, Self::Exhaustive | Self::Candidates(_))
    }
}

/// Parameters of a point-budget search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BudgetConfig {
    /// Resampling strategy for candidates.
    pub mode: SamplingMode,
    /// Curvature attraction strength (curvature-weighted mode only).
    pub alpha: f64,
    /// Maximum accepted relative area error.
    pub area_tolerance: f64,
    /// Maximum accepted Hausdorff distance in millimeters.
    pub distance_tolerance: f64,
    /// Smallest point count ever evaluated.
    pub min_points: usize,
    pub policy: SearchPolicy,
    /// Smoothing applied to each candidate before measuring.
    pub fit: FitMode,
    /// Residual bound for the periodic spline; `0` interpolates.
    pub smoothing: f64,
    /// Number of samples taken from a fitted spline.
    pub dense_count: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            mode: SamplingMode::CurvatureWeighted,
            alpha: 5.0,
            area_tolerance: 0.005,
            distance_tolerance: 0.5,
            min_points: Resample::MIN_POINTS,
            policy: SearchPolicy::Exhaustive,
            fit: FitMode::None,
            smoothing: 0.2,
            dense_count: 1200,
        }
    }
}

impl BudgetConfig {
    #[must_use]
    pub fn with_mode(mut self, mode: SamplingMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets both acceptance tolerances.
    #[must_use]
    pub fn with_tolerances(mut self, area_tolerance: f64, distance_tolerance: f64) -> Self {
        self.area_tolerance = area_tolerance;
        self.distance_tolerance = distance_tolerance;
        self
    }

    #[must_use]
    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SearchPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }

    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    #[must_use]
    pub fn with_dense_count(mut self, dense_count: usize) -> Self {
        self.dense_count = dense_count;
        self
    }

    /// Checks every parameter against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` for a numeric parameter outside its
    /// range and `ConfigError::Invalid` for an empty or malformed candidate list.
    pub fn validate(&self) -> Result<()> {
        check_range("alpha", self.alpha, 0.0, f64::INFINITY)?;
        check_range("area_tolerance", self.area_tolerance, 0.0, f64::INFINITY)?;
        check_range("distance_tolerance", self.distance_tolerance, 0.0, f64::INFINITY)?;
        check_range("smoothing", self.smoothing, 0.0, f64::INFINITY)?;
        check_count("min_points", self.min_points, Resample::MIN_POINTS, usize::MAX)?;
        check_count("dense_count", self.dense_count, Resample::MIN_POINTS, usize::MAX)?;

        match &self.policy {
            SearchPolicy::Exhaustive => {}
            SearchPolicy::Ratio(ratio) => {
                if !(ratio.is_finite() && *ratio > 0.0 && *ratio <= 1.0) {
                    return Err(ConfigError::OutOfRange {
                        parameter: "ratio",
                        value: *ratio,
                        min: 0.0,
                        max: 1.0,
                    }
                    .into());
                }
            }
            SearchPolicy::FixedPoints(n) => {
                check_count("fixed_points", *n, Resample::MIN_POINTS, usize::MAX)?;
            }
            SearchPolicy::Candidates(list) => {
                if list.is_empty() {
                    return Err(ConfigError::Invalid("candidate list is empty".into()).into());
                }
                if let Some(n) = list.iter().find(|&&n| n < Resample::MIN_POINTS) {
                    return Err(ConfigError::Invalid(format!(
                        "candidate point count {n} is below the floor of {}",
                        Resample::MIN_POINTS
                    ))
                    .into());
                }
            }
        }

        if let FitMode::Chaikin { iterations } = self.fit {
            check_count("chaikin_iterations", iterations, 0, MAX_CHAIKIN_ITERATIONS)?;
        }
        Ok(())
    }
}

fn check_range(parameter: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            parameter,
            value,
            min,
            max,
        }
        .into())
    }
}

#[allow(clippy::cast_precision_loss)]
fn check_count(parameter: &'static str, value: usize, min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            parameter,
            value: value as f64,
            min: min as f64,
            max: max as f64,
        }
        .into())
    }
}
