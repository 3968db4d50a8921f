use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Contour;

/// Smallest area a reconstructed curve must enclose to be exported.
pub const MIN_EXPORT_AREA: f64 = 1e-9;

/// Resolution used to decide whether two contours share a slice.
const Z_RESOLUTION: f64 = 1e-6;

/// Which reconstruction is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExportMode {
    /// The resampled points themselves.
    #[default]
    Raw,
    /// The smooth curve through the resampled points, sampled densely.
    FitDense,
}

/// One reconstructed slice, ready for serialization or rendering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportCurve {
    pub structure: String,
    pub z: f64,
    pub points: Vec<(f64, f64)>,
}

/// Consumes reconstructed curves, e.g. by writing a structure-set file.
pub trait ContourExporter {
    /// Accepts the curves of one structure, in ascending z.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn export(&mut self, curves: &[ExportCurve]) -> Result<()>;
}

impl ContourExporter for Vec<ExportCurve> {
    fn export(&mut self, curves: &[ExportCurve]) -> Result<()> {
        self.extend_from_slice(curves);
        Ok(())
    }
}

/// Keeps only the contour with the most points on each slice elevation.
///
/// Elevations are compared after rounding to 1e-6 mm; ties keep the first
/// contour seen. The result is ordered by ascending z.
#[must_use]
pub fn largest_per_slice(contours: Vec<Contour>) -> Vec<Contour> {
    largest_per_slice_by(contours, |contour| (contour.id().z, contour.point_count()))
}

/// Per-slice reduction over any item, given its `(z, point_count)`.
pub(crate) fn largest_per_slice_by<T>(
    items: Vec<T>,
    key: impl Fn(&T) -> (f64, usize),
) -> Vec<T> {
    let mut by_slice: BTreeMap<i64, (usize, T)> = BTreeMap::new();
    for item in items {
        let (z, point_count) = key(&item);
        #[allow(clippy::cast_possible_truncation)]
        let slice = (z / Z_RESOLUTION).round() as i64;
        match by_slice.get(&slice) {
            Some((kept, _)) if *kept >= point_count => {}
            _ => {
                by_slice.insert(slice, (point_count, item));
            }
        }
    }
    by_slice.into_values().map(|(_, item)| item).collect()
}
