use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::polygon_area;
use crate::math::Point2;

/// Returns `|area(candidate) - reference_area| / reference_area`.
///
/// # Errors
///
/// Returns `GeometryError::ZeroArea` if `reference_area` is not a positive
/// finite number. Degenerate contours must be filtered out before this point.
pub fn relative_area_error(reference_area: f64, candidate: &[Point2]) -> Result<f64> {
    if !(reference_area.is_finite() && reference_area > 0.0) {
        return Err(GeometryError::ZeroArea {
            area: reference_area,
        }
        .into());
    }
    Ok((polygon_area(candidate) - reference_area).abs() / reference_area)
}
