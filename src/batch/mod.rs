mod export;
mod result_set;
mod select;
mod source;

pub use export::{largest_per_slice, ContourExporter, ExportCurve, ExportMode, MIN_EXPORT_AREA};
pub use result_set::{ResultSet, SkipReason, SkippedContour, Summary};
pub use select::{select_by_area_quantiles, DEFAULT_AREA_QUANTILES};
pub use source::{ContourRecord, ContourSource, InMemorySource};

use export::largest_per_slice_by;

use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};
use crate::geometry::{ClosedPolyline, Contour};
use crate::operations::budget::{BudgetConfig, BudgetResult, BudgetSearch, SearchPolicy};
use crate::operations::fit::FitClosedCurve;

/// Options of a batch run that do not affect the per-contour search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BatchOptions {
    /// Contours enclosing at most this area (mm²) are skipped as noise.
    pub min_area: f64,
    /// Search contours on the rayon thread pool.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            min_area: 1e-3,
            parallel: true,
        }
    }
}

impl BatchOptions {
    /// Checks that `min_area` is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.min_area.is_finite() && self.min_area >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                parameter: "min_area",
                value: self.min_area,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into())
        }
    }
}

/// Runs budget searches over every contour of one structure.
///
/// Loads the structure's contours from a [`ContourSource`], runs a
/// [`BudgetSearch`] per contour and aggregates the outcomes into a
/// [`ResultSet`].
///
/// A contour that is degenerate or below the area threshold is skipped and
/// recorded; a contour without an acceptable budget is a normal result.
/// Only configuration errors and unreadable source data abort the run.
#[derive(Debug)]
pub struct ContourBatch<'a, S: ContourSource + ?Sized> {
    source: &'a S,
    structure: String,
    config: BudgetConfig,
    options: BatchOptions,
}

impl<'a, S: ContourSource + ?Sized> ContourBatch<'a, S> {
    /// Creates a batch over `structure` with default search parameters.
    #[must_use]
    pub fn new(source: &'a S, structure: &str) -> Self {
        Self {
            source,
            structure: structure.to_owned(),
            config: BudgetConfig::default(),
            options: BatchOptions::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: BudgetConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    /// Executes the batch.
    ///
    /// # Errors
    ///
    /// - `ConfigError` if the search configuration or the options are out of range
    /// - `SourceError` if the structure is unknown or unreadable
    pub fn execute(&self) -> Result<ResultSet> {
        self.config.validate()?;
        self.options.validate()?;
        let (contours, skipped) = self.load()?;
        let results = self.search_all(&contours, &self.config)?;
        let set = ResultSet::new(self.structure.clone(), results, skipped);
        log_summary(&set);
        Ok(set)
    }

    /// Runs the batch once per reduction ratio.
    ///
    /// Contours are loaded once and shared between runs; each returned set
    /// pairs with the ratio at the same position.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute`], plus `ConfigError::OutOfRange` for a ratio
    /// outside `(0, 1]`.
    pub fn ratio_sweep(&self, ratios: &[f64]) -> Result<Vec<(f64, ResultSet)>> {
        self.options.validate()?;
        let configs = ratios
            .iter()
            .map(|&ratio| {
                let config = self.config.clone().with_policy(SearchPolicy::Ratio(ratio));
                config.validate().map(|()| (ratio, config))
            })
            .collect::<Result<Vec<_>>>()?;

        let (contours, skipped) = self.load()?;
        let mut sweep = Vec::with_capacity(configs.len());
        for (ratio, config) in configs {
            let results = self.search_all(&contours, &config)?;
            let set = ResultSet::new(self.structure.clone(), results, skipped.clone());
            info!(
                structure = %self.structure,
                ratio,
                mean_area_error = ?set.summary().mean_area_error,
                mean_hausdorff = ?set.summary().mean_hausdorff,
                "ratio evaluated"
            );
            sweep.push((ratio, set));
        }
        Ok(sweep)
    }

    /// Builds one reconstructed curve per slice for export.
    ///
    /// Searching policies export at the chosen count and skip contours
    /// without one. Reconstructions with fewer than 3 points or an area of at
    /// most [`MIN_EXPORT_AREA`] are dropped. Among the surviving curves, only
    /// the one whose contour has the most points is kept on each slice.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute`].
    pub fn export_curves(&self, mode: ExportMode) -> Result<Vec<ExportCurve>> {
        self.config.validate()?;
        self.options.validate()?;
        let (contours, _) = self.load()?;

        let mut survivors = Vec::with_capacity(contours.len());
        for contour in &contours {
            let search = BudgetSearch::new(contour, &self.config);
            let count = match search.target_count() {
                Some(count) => count,
                None => match search.execute()?.chosen() {
                    Some(count) => count,
                    None => {
                        debug!(
                            slice = contour.id().slice_index,
                            z = contour.id().z,
                            "no acceptable budget; contour not exported"
                        );
                        continue;
                    }
                },
            };

            let candidate = search.reconstruct(count)?;
            if candidate.resampled.is_degenerate() || candidate.resampled.area() <= MIN_EXPORT_AREA
            {
                debug!(
                    slice = contour.id().slice_index,
                    z = contour.id().z,
                    count,
                    "reconstruction collapsed; contour not exported"
                );
                continue;
            }

            let curve: ClosedPolyline = match mode {
                ExportMode::Raw => candidate.resampled,
                ExportMode::FitDense => match candidate.fitted {
                    Some(fit) => fit.into_polyline(),
                    None => FitClosedCurve::new(&candidate.resampled, self.config.dense_count)
                        .with_smoothing(self.config.smoothing)
                        .execute()
                        .into_polyline(),
                },
            };
            survivors.push((
                contour.point_count(),
                ExportCurve {
                    structure: self.structure.clone(),
                    z: contour.id().z,
                    points: curve.to_xy(),
                },
            ));
        }

        let kept = largest_per_slice_by(survivors, |(point_count, curve)| (curve.z, *point_count));
        Ok(kept.into_iter().map(|(_, curve)| curve).collect())
    }

    /// Builds the export curves and hands them to `exporter`.
    ///
    /// Returns the number of curves exported.
    ///
    /// # Errors
    ///
    /// Same as [`Self::export_curves`], plus any error from the exporter.
    pub fn export_to<E: ContourExporter + ?Sized>(
        &self,
        mode: ExportMode,
        exporter: &mut E,
    ) -> Result<usize> {
        let curves = self.export_curves(mode)?;
        exporter.export(&curves)?;
        info!(structure = %self.structure, curves = curves.len(), "curves exported");
        Ok(curves.len())
    }

    /// Picks representative slices by area quantile among the usable contours.
    ///
    /// # Errors
    ///
    /// Same as [`select_by_area_quantiles`] and the source, plus
    /// `ConfigError::OutOfRange` for invalid options.
    pub fn representative_slices(&self, quantiles: &[f64]) -> Result<Vec<Contour>> {
        self.options.validate()?;
        let (contours, _) = self.load()?;
        let picks = select_by_area_quantiles(&contours, quantiles)?;
        Ok(picks.into_iter().cloned().collect())
    }

    /// Loads the structure's contours, setting aside unusable ones.
    fn load(&self) -> Result<(Vec<Contour>, Vec<SkippedContour>)> {
        let records = self.source.contours(&self.structure)?;
        let mut contours = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();

        for record in &records {
            let reason = if record.points.is_empty() {
                Some(SkipReason::TooFewPoints(0))
            } else {
                let contour = record.to_contour()?;
                if contour.polyline().is_degenerate() {
                    Some(SkipReason::TooFewPoints(contour.point_count()))
                } else if below_min_area(contour.area(), self.options.min_area) {
                    Some(SkipReason::BelowMinArea(contour.area()))
                } else {
                    contours.push(contour);
                    None
                }
            };
            if let Some(reason) = reason {
                warn!(
                    structure = %self.structure,
                    slice = record.slice_index,
                    z = record.z,
                    ?reason,
                    "skipping contour"
                );
                skipped.push(SkippedContour {
                    slice_index: record.slice_index,
                    z: record.z,
                    reason,
                });
            }
        }
        debug!(
            structure = %self.structure,
            usable = contours.len(),
            skipped = skipped.len(),
            "contours loaded"
        );
        Ok((contours, skipped))
    }

    fn search_all(&self, contours: &[Contour], config: &BudgetConfig) -> Result<Vec<BudgetResult>> {
        let search = |contour: &Contour| BudgetSearch::new(contour, config).execute();
        let mut results = if self.options.parallel {
            contours.par_iter().map(search).collect::<Result<Vec<_>>>()?
        } else {
            contours.iter().map(search).collect::<Result<Vec<_>>>()?
        };
        results.sort_by(|a, b| {
            let (a, b) = (a.contour(), b.contour());
            a.z.total_cmp(&b.z).then(a.slice_index.cmp(&b.slice_index))
        });
        Ok(results)
    }
}

/// A contour is kept only when it encloses strictly more than `min_area` and
/// a positive area; `NaN` never qualifies.
fn below_min_area(area: f64, min_area: f64) -> bool {
    area.is_nan() || area <= 0.0 || area <= min_area
}

fn log_summary(set: &ResultSet) {
    let summary = set.summary();
    info!(
        structure = %set.structure(),
        passed = summary.passed_count,
        failed = summary.failed_count,
        skipped = summary.skipped_count,
        worst = ?summary.worst_chosen_point_count,
        structure_budget = ?summary.structure_budget,
        "budget search complete"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ContourError, SourceError};
    use crate::operations::budget::FitMode;
    use crate::operations::resample::SamplingMode;
    use std::f64::consts::PI;

    fn ellipse(slice_index: usize, z: f64, n: usize, a: f64, b: f64) -> ContourRecord {
        let points = (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = 2.0 * PI * i as f64 / n as f64;
                (a * t.cos(), b * t.sin())
            })
            .collect();
        ContourRecord::new(slice_index, z, points)
    }

    fn source() -> InMemorySource {
        InMemorySource::new().with_structure(
            "Bladder",
            vec![
                ellipse(2, 6.0, 120, 20.0, 14.0),
                ellipse(0, 0.0, 80, 10.0, 7.0),
                ellipse(1, 3.0, 100, 15.0, 11.0),
                // Speck below the area threshold.
                ellipse(3, 9.0, 12, 0.01, 0.01),
                // Two points only.
                ContourRecord::new(4, 12.0, vec![(0.0, 0.0), (1.0, 1.0)]),
            ],
        )
    }

    #[test]
    fn execute_orders_and_summarizes() {
        let source = source();
        let set = ContourBatch::new(&source, "bladder").execute().unwrap();
        let zs: Vec<f64> = set.results().iter().map(|r| r.contour().z).collect();
        assert_eq!(zs, vec![0.0, 3.0, 6.0]);

        let summary = set.summary();
        assert_eq!(summary.skipped_count, 2);
        assert_eq!(summary.passed_count + summary.failed_count, 3);
        assert_eq!(summary.total_original_points, 300);
        assert!(matches!(set.skipped()[0].reason, SkipReason::BelowMinArea(_)));
        assert!(matches!(set.skipped()[1].reason, SkipReason::TooFewPoints(2)));
    }

    #[test]
    fn parallel_matches_sequential() {
        let source = source();
        let parallel = ContourBatch::new(&source, "Bladder").execute().unwrap();
        let sequential = ContourBatch::new(&source, "Bladder")
            .with_options(BatchOptions {
                parallel: false,
                ..BatchOptions::default()
            })
            .execute()
            .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn generous_tolerances_give_structure_budget() {
        let source = source();
        let set = ContourBatch::new(&source, "Bladder")
            .with_config(BudgetConfig::default().with_tolerances(1e9, 1e9))
            .execute()
            .unwrap();
        assert_eq!(set.summary().passed_count, 3);
        assert_eq!(set.summary().structure_budget, Some(3));
    }

    #[test]
    fn unmet_tolerance_does_not_abort() {
        let source = source();
        let set = ContourBatch::new(&source, "Bladder")
            .with_config(
                BudgetConfig::default()
                    .with_tolerances(0.0, 0.0)
                    .with_policy(SearchPolicy::Candidates(vec![8, 16])),
            )
            .execute()
            .unwrap();
        assert_eq!(set.results().len(), 3);
        assert_eq!(set.summary().failed_count, 3);
        assert_eq!(set.summary().structure_budget, None);
    }

    #[test]
    fn flat_contour_is_skipped_without_area_floor() {
        let source = InMemorySource::new().with_structure(
            "Bladder",
            vec![
                ContourRecord::new(
                    0,
                    0.0,
                    vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)],
                ),
                ContourRecord::new(1, 3.0, vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            ],
        );
        let batch = ContourBatch::new(&source, "Bladder").with_options(BatchOptions {
            min_area: 0.0,
            ..BatchOptions::default()
        });

        let set = batch.execute().unwrap();
        assert_eq!(set.results().len(), 1);
        assert_eq!(set.skipped().len(), 1);
        assert_eq!(set.skipped()[0].slice_index, 1);
        assert!(matches!(
            set.skipped()[0].reason,
            SkipReason::BelowMinArea(area) if area.abs() < 1e-12
        ));

        assert_eq!(batch.ratio_sweep(&[0.5]).unwrap()[0].1.results().len(), 1);
        let curves = batch
            .with_config(BudgetConfig::default().with_policy(SearchPolicy::FixedPoints(4)))
            .export_curves(ExportMode::Raw)
            .unwrap();
        assert_eq!(curves.len(), 1);
    }

    #[test]
    fn skip_reports_stored_point_count() {
        let source = InMemorySource::new().with_structure(
            "Bladder",
            vec![ContourRecord::new(
                0,
                0.0,
                vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)],
            )],
        );
        let set = ContourBatch::new(&source, "Bladder").execute().unwrap();
        assert!(set.results().is_empty());
        assert!(matches!(set.skipped()[0].reason, SkipReason::TooFewPoints(2)));
    }

    #[test]
    fn contour_at_area_floor_is_skipped() {
        let source = InMemorySource::new().with_structure(
            "Bladder",
            vec![ContourRecord::new(
                0,
                0.0,
                vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
            )],
        );
        let set = ContourBatch::new(&source, "Bladder")
            .with_options(BatchOptions {
                min_area: 1.0,
                ..BatchOptions::default()
            })
            .execute()
            .unwrap();
        assert!(set.results().is_empty());
        assert!(matches!(set.skipped()[0].reason, SkipReason::BelowMinArea(_)));
    }

    #[test]
    fn invalid_area_floor_is_rejected() {
        let source = source();
        for min_area in [f64::NAN, -1.0, f64::INFINITY] {
            let batch = ContourBatch::new(&source, "Bladder").with_options(BatchOptions {
                min_area,
                ..BatchOptions::default()
            });
            let errors = [
                batch.execute().map(|_| ()).unwrap_err(),
                batch.ratio_sweep(&[0.5]).map(|_| ()).unwrap_err(),
                batch.export_curves(ExportMode::Raw).map(|_| ()).unwrap_err(),
                batch.representative_slices(&[0.5]).map(|_| ()).unwrap_err(),
            ];
            for err in errors {
                assert!(
                    matches!(
                        err,
                        ContourError::Config(ConfigError::OutOfRange {
                            parameter: "min_area",
                            ..
                        })
                    ),
                    "min_area = {min_area}: {err:?}"
                );
            }
        }
    }

    #[test]
    fn unknown_structure_aborts() {
        let source = source();
        let err = ContourBatch::new(&source, "Rectum").execute().unwrap_err();
        assert!(matches!(
            err,
            ContourError::Source(SourceError::StructureNotFound(_))
        ));
    }

    #[test]
    fn ratio_sweep_improves_with_more_points() {
        let source = source();
        let sweep = ContourBatch::new(&source, "Bladder")
            .ratio_sweep(&[0.05, 0.2, 0.5])
            .unwrap();
        assert_eq!(sweep.len(), 3);
        let errors: Vec<f64> = sweep
            .iter()
            .map(|(_, set)| set.summary().mean_hausdorff.unwrap())
            .collect();
        assert!(errors[0] > errors[1] && errors[1] > errors[2], "{errors:?}");
        assert_eq!(sweep[1].1.results()[0].chosen(), Some(16));
    }

    #[test]
    fn ratio_sweep_rejects_bad_ratio() {
        let source = source();
        assert!(ContourBatch::new(&source, "Bladder")
            .ratio_sweep(&[0.5, 2.0])
            .is_err());
    }

    #[test]
    fn export_keeps_one_curve_per_slice() {
        let mut records = source().contours("Bladder").unwrap();
        // Smaller companion loop on the same slice as the first ellipse.
        records.push(ellipse(5, 0.0, 30, 2.0, 2.0));
        let source = InMemorySource::new().with_structure("Bladder", records);

        let batch = ContourBatch::new(&source, "Bladder")
            .with_config(BudgetConfig::default().with_policy(SearchPolicy::FixedPoints(24)));
        let raw = batch.export_curves(ExportMode::Raw).unwrap();
        assert_eq!(raw.len(), 3);
        assert!(raw.iter().all(|c| c.points.len() == 24 && c.structure == "Bladder"));
        assert!((raw[0].z - 0.0).abs() < 1e-12);

        let mut sink: Vec<ExportCurve> = Vec::new();
        let exported = batch
            .with_config(
                BudgetConfig::default()
                    .with_policy(SearchPolicy::FixedPoints(24))
                    .with_dense_count(300),
            )
            .export_to(ExportMode::FitDense, &mut sink)
            .unwrap();
        assert_eq!(exported, 3);
        assert!(sink.iter().all(|c| c.points.len() == 300));
    }

    #[test]
    fn export_skips_slices_without_budget() {
        let source = source();
        let curves = ContourBatch::new(&source, "Bladder")
            .with_config(
                BudgetConfig::default()
                    .with_tolerances(0.0, 0.0)
                    .with_policy(SearchPolicy::Candidates(vec![8])),
            )
            .export_curves(ExportMode::Raw)
            .unwrap();
        assert!(curves.is_empty());
    }

    #[test]
    fn export_falls_back_to_smaller_contour_on_slice() {
        // 2 x 2 square with its edge midpoints: four uniform samples land on
        // the corners and reproduce it exactly.
        let square = ContourRecord::new(
            5,
            0.0,
            vec![
                (0.0, 0.0),
                (1.0, 0.0),
                (2.0, 0.0),
                (2.0, 1.0),
                (2.0, 2.0),
                (1.0, 2.0),
                (0.0, 2.0),
                (0.0, 1.0),
            ],
        );
        let source = InMemorySource::new().with_structure(
            "Bladder",
            vec![ellipse(0, 0.0, 80, 10.0, 7.0), square],
        );

        let curves = ContourBatch::new(&source, "Bladder")
            .with_config(
                BudgetConfig::default()
                    .with_mode(SamplingMode::Uniform)
                    .with_tolerances(1e-9, 1e-9)
                    .with_policy(SearchPolicy::Candidates(vec![4])),
            )
            .export_curves(ExportMode::Raw)
            .unwrap();
        assert_eq!(curves.len(), 1);
        assert!(curves[0].z.abs() < 1e-12);
        assert_eq!(curves[0].points.len(), 4);
        assert!(curves[0].points.iter().all(|&(x, y)| x.abs().max(y.abs()) <= 2.0 + 1e-9));
    }

    #[test]
    fn export_uses_configured_fit() {
        let source = source();
        let curves = ContourBatch::new(&source, "Bladder")
            .with_config(
                BudgetConfig::default()
                    .with_policy(SearchPolicy::FixedPoints(10))
                    .with_fit(FitMode::Chaikin { iterations: 2 }),
            )
            .export_curves(ExportMode::FitDense)
            .unwrap();
        assert!(curves.iter().all(|c| c.points.len() == 40));
    }

    #[test]
    fn representative_slices_by_area() {
        let source = source();
        let picks = ContourBatch::new(&source, "Bladder")
            .representative_slices(&[0.0, 1.0])
            .unwrap();
        let slices: Vec<usize> = picks.iter().map(|c| c.id().slice_index).collect();
        assert_eq!(slices, vec![0, 2]);
    }
}
