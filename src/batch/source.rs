use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SourceError};
use crate::geometry::{ClosedPolyline, Contour, ContourId};

/// One closed contour as delivered by a source, before validation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContourRecord {
    pub slice_index: usize,
    /// Slice elevation in millimeters.
    pub z: f64,
    /// Boundary points in millimeters, in drawing order.
    pub points: Vec<(f64, f64)>,
}

impl ContourRecord {
    #[must_use]
    pub fn new(slice_index: usize, z: f64, points: Vec<(f64, f64)>) -> Self {
        Self {
            slice_index,
            z,
            points,
        }
    }

    /// Converts the record into a [`Contour`].
    ///
    /// # Errors
    ///
    /// - `SourceError::Unreadable` if `z` or any coordinate is not finite
    /// - `GeometryError::TooFewPoints` if the record has no points
    pub fn to_contour(&self) -> Result<Contour> {
        let finite = self.z.is_finite()
            && self
                .points
                .iter()
                .all(|(x, y)| x.is_finite() && y.is_finite());
        if !finite {
            return Err(SourceError::Unreadable(format!(
                "slice {} (z = {}) has non-finite coordinates",
                self.slice_index, self.z
            ))
            .into());
        }
        let polyline = ClosedPolyline::from_xy(&self.points)?;
        Ok(Contour::new(ContourId::new(self.slice_index, self.z), polyline))
    }
}

/// Supplies the contours of a named structure.
///
/// Implementations wrap whatever storage holds the structure set; the
/// analysis never sees the underlying format.
pub trait ContourSource {
    /// Returns every contour of `structure`, one record per closed loop.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::StructureNotFound` for an unknown structure and
    /// `SourceError::Unreadable` when the stored data cannot be decoded.
    fn contours(&self, structure: &str) -> Result<Vec<ContourRecord>>;
}

/// A [`ContourSource`] backed by in-memory records.
///
/// Structure names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    structures: BTreeMap<String, (String, Vec<ContourRecord>)>,
}

impl InMemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a structure, replacing any structure with the same name.
    #[must_use]
    pub fn with_structure(mut self, name: &str, records: Vec<ContourRecord>) -> Self {
        self.insert(name, records);
        self
    }

    pub fn insert(&mut self, name: &str, records: Vec<ContourRecord>) {
        self.structures
            .insert(name.to_lowercase(), (name.to_owned(), records));
    }

    /// Structure names as they were inserted, in case-insensitive order.
    #[must_use]
    pub fn structure_names(&self) -> Vec<&str> {
        self.structures
            .values()
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl ContourSource for InMemorySource {
    fn contours(&self, structure: &str) -> Result<Vec<ContourRecord>> {
        self.structures
            .get(&structure.to_lowercase())
            .map(|(_, records)| records.clone())
            .ok_or_else(|| SourceError::StructureNotFound(structure.to_owned()).into())
    }
}
