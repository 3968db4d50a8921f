#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ClosedPolyline;

/// Identity of the imaging slice a contour was drawn on.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContourId {
    /// Position of the contour in its source sequence.
    pub slice_index: usize,
    /// Slice elevation in millimeters.
    pub z: f64,
}

impl ContourId {
    /// Creates a new contour identity.
    #[must_use]
    pub fn new(slice_index: usize, z: f64) -> Self {
        Self { slice_index, z }
    }
}

/// A closed boundary on one slice, with its unsigned area cached.
#[derive(Debug, Clone)]
pub struct Contour {
    id: ContourId,
    polyline: ClosedPolyline,
    area: f64,
}

impl Contour {
    /// Creates a contour, computing its area from the polyline.
    #[must_use]
    pub fn new(id: ContourId, polyline: ClosedPolyline) -> Self {
        let area = polyline.area();
        Self { id, polyline, area }
    }

    #[must_use]
    pub fn id(&self) -> ContourId {
        self.id
    }

    #[must_use]
    pub fn polyline(&self) -> &ClosedPolyline {
        &self.polyline
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Number of points in the original contour.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.polyline.len()
    }
}
