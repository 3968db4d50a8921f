//! Point-budget report for a synthetic structure.
//!
//! Usage:
//! ```text
//! cargo run --example budget_report                 # exhaustive search
//! cargo run --example budget_report -- sweep        # ratio sweep
//! cargo run --example budget_report -- candidates   # 16/32/48/64/128/256 list
//! ```

use std::f64::consts::PI;

use contour_budget::batch::{
    ContourBatch, ContourRecord, ExportCurve, ExportMode, InMemorySource, ResultSet,
    DEFAULT_AREA_QUANTILES,
};
use contour_budget::operations::budget::{BudgetConfig, FitMode, SearchPolicy};
use contour_budget::Result;

const STRUCTURE: &str = "Bladder";
const SWEEP_RATIOS: [f64; 6] = [0.05, 0.1, 0.2, 0.3, 0.5, 0.75];
const CANDIDATES: [usize; 6] = [16, 32, 48, 64, 128, 256];

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for contour_budget.
    // Override with RUST_LOG env var (e.g. RUST_LOG=contour_budget=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("contour_budget=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let source = InMemorySource::new().with_structure(STRUCTURE, synthetic_slices());
    let mode = std::env::args().nth(1).unwrap_or_default();

    match mode.as_str() {
        "sweep" => {
            let batch = ContourBatch::new(&source, STRUCTURE)
                .with_config(BudgetConfig::default().with_fit(FitMode::PeriodicSpline));
            println!(
                "{:>6}  {:>12}  {:>12}  {:>12}  {:>12}",
                "ratio", "area_err", "hausdorff", "fit_area", "fit_haus"
            );
            for (ratio, set) in batch.ratio_sweep(&SWEEP_RATIOS)? {
                let s = set.summary();
                println!(
                    "{ratio:>6.2}  {:>12}  {:>12}  {:>12}  {:>12}",
                    fmt_opt(s.mean_area_error),
                    fmt_opt(s.mean_hausdorff),
                    fmt_opt(s.mean_fit_area_error),
                    fmt_opt(s.mean_fit_hausdorff),
                );
            }
        }
        "candidates" => {
            let config = BudgetConfig::default()
                .with_policy(SearchPolicy::Candidates(CANDIDATES.to_vec()))
                .with_fit(FitMode::Chaikin { iterations: 3 });
            let set = ContourBatch::new(&source, STRUCTURE)
                .with_config(config)
                .execute()?;
            print_table(&set);
        }
        _ => {
            let batch = ContourBatch::new(&source, STRUCTURE);
            let set = batch.execute()?;
            print_table(&set);

            let mut curves: Vec<ExportCurve> = Vec::new();
            let exported = batch.export_to(ExportMode::FitDense, &mut curves)?;
            println!("\nexported {exported} smoothed slices");

            for contour in batch.representative_slices(&DEFAULT_AREA_QUANTILES)? {
                println!(
                    "representative slice {} (z = {:.1} mm, area = {:.1} mm²)",
                    contour.id().slice_index,
                    contour.id().z,
                    contour.area()
                );
            }
        }
    }
    Ok(())
}

fn print_table(set: &ResultSet) {
    println!("structure: {}", set.structure());
    println!(
        "{:>5}  {:>7}  {:>8}  {:>7}  {:>10}  {:>10}  {:>4}",
        "slice", "z", "original", "chosen", "area_err", "hausdorff", "ok"
    );
    for result in set.results() {
        let id = result.contour();
        let decisive = result.evaluation().map(|e| e.decisive());
        println!(
            "{:>5}  {:>7.1}  {:>8}  {:>7}  {:>10}  {:>10}  {:>4}",
            id.slice_index,
            id.z,
            result.original_point_count(),
            result.chosen().map_or_else(|| "none".to_owned(), |n| n.to_string()),
            fmt_opt(decisive.map(|m| m.area_error)),
            fmt_opt(decisive.map(|m| m.hausdorff)),
            if result.within_tolerance() { "yes" } else { "no" },
        );
    }

    let summary = set.summary();
    println!(
        "\npassed {}, failed {}, skipped {}",
        summary.passed_count, summary.failed_count, summary.skipped_count
    );
    println!(
        "worst chosen: {}, structure budget: {}, original points: {}",
        summary
            .worst_chosen_point_count
            .map_or_else(|| "none".to_owned(), |n| n.to_string()),
        summary
            .structure_budget
            .map_or_else(|| "none (some slices failed)".to_owned(), |n| n.to_string()),
        summary.total_original_points
    );
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v:.4}"))
}

/// A bladder-like stack: lobed loops whose size swells and shrinks with z,
/// plus one noise speck that the batch skips.
fn synthetic_slices() -> Vec<ContourRecord> {
    let mut records: Vec<ContourRecord> = (0..12_usize)
        .map(|slice| {
            #[allow(clippy::cast_precision_loss)]
            let s = slice as f64 / 11.0;
            let scale = 8.0 + 22.0 * (PI * s).sin();
            let n = 90 + 15 * slice;
            let points = (0..n)
                .map(|i| {
                    #[allow(clippy::cast_precision_loss)]
                    let t = 2.0 * PI * i as f64 / n as f64;
                    let r = scale * (1.0 + 0.12 * (3.0 * t + s).cos() + 0.05 * (7.0 * t).sin());
                    (r * t.cos() + 1.5 * s, 0.8 * r * t.sin())
                })
                .collect();
            #[allow(clippy::cast_precision_loss)]
            let z = -30.0 + 3.0 * slice as f64;
            ContourRecord::new(slice, z, points)
        })
        .collect();

    records.push(ContourRecord::new(
        12,
        6.0,
        vec![(0.0, 0.0), (0.01, 0.0), (0.0, 0.01)],
    ));
    records
}
