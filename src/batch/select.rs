use crate::error::{ConfigError, Result};
use crate::geometry::Contour;

/// Quantiles picking a small, a medium and a large slice.
pub const DEFAULT_AREA_QUANTILES: [f64; 3] = [0.1, 0.6, 0.8];

/// Picks, for each quantile, the contour whose area is closest to that
/// quantile of the area distribution.
///
/// Quantiles interpolate linearly between order statistics. The same contour
/// may be picked for several quantiles. An empty input yields an empty list.
///
/// # Errors
///
/// Returns `ConfigError::OutOfRange` if a quantile lies outside `[0, 1]`.
pub fn select_by_area_quantiles<'a>(
    contours: &'a [Contour],
    quantiles: &[f64],
) -> Result<Vec<&'a Contour>> {
    if let Some(&q) = quantiles.iter().find(|q| !(0.0..=1.0).contains(*q)) {
        return Err(ConfigError::OutOfRange {
            parameter: "quantile",
            value: q,
            min: 0.0,
            max: 1.0,
        }
        .into());
    }
    if contours.is_empty() {
        return Ok(Vec::new());
    }

    let mut areas: Vec<f64> = contours.iter().map(Contour::area).collect();
    areas.sort_by(f64::total_cmp);

    let picks = quantiles
        .iter()
        .filter_map(|&q| {
            let target = interpolate_quantile(&areas, q);
            contours
                .iter()
                .min_by(|a, b| (a.area() - target).abs().total_cmp(&(b.area() - target).abs()))
        })
        .collect();
    Ok(picks)
}

/// Linear-interpolation quantile of non-empty, ascending `sorted`.
fn interpolate_quantile(sorted: &[f64], q: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let pos = q * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    #[allow(clippy::cast_precision_loss)]
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{ClosedPolyline, ContourId};

    fn square(slice_index: usize, side: f64) -> Contour {
        let poly = ClosedPolyline::from_xy(&[(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)])
            .unwrap();
        Contour::new(ContourId::new(slice_index, 0.0), poly)
    }

    #[test]
    fn quantile_interpolates() {
        let sorted = [1.0, 2.0, 4.0, 8.0, 16.0];
        assert!((interpolate_quantile(&sorted, 0.0) - 1.0).abs() < 1e-12);
        assert!((interpolate_quantile(&sorted, 1.0) - 16.0).abs() < 1e-12);
        // Position 0.6 * 4 = 2.4 -> 4 + 0.4 * 4.
        assert!((interpolate_quantile(&sorted, 0.6) - 5.6).abs() < 1e-12);
    }

    #[test]
    fn picks_small_medium_large() {
        // Areas 1, 4, 9, ..., 100.
        let contours: Vec<Contour> = (1..=10_u32)
            .zip(1_usize..)
            .map(|(side, slice)| square(slice, f64::from(side)))
            .collect();
        let picks = select_by_area_quantiles(&contours, &DEFAULT_AREA_QUANTILES).unwrap();
        let slices: Vec<usize> = picks.iter().map(|c| c.id().slice_index).collect();
        // Targets: 0.9 -> 1 + 0.9 * 3 = 3.7, 5.4 -> 36 + 0.4 * 13 = 41.2,
        // 7.2 -> 64 + 0.2 * 17 = 67.4.
        assert_eq!(slices, vec![2, 6, 8]);
    }

    #[test]
    fn empty_input_gives_no_picks() {
        assert!(select_by_area_quantiles(&[], &[0.5]).unwrap().is_empty());
    }

    #[test]
    fn rejects_out_of_range_quantile() {
        let contours = vec![square(0, 1.0)];
        assert!(select_by_area_quantiles(&contours, &[1.5]).is_err());
        assert!(select_by_area_quantiles(&contours, &[f64::NAN]).is_err());
    }
}
