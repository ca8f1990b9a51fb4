use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointSetError {
    #[error("Point index {index} out of bounds for a set of {len} points")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// An ordered, immutable collection of points in 3D space.
///
/// This struct is the geometric input boundary of the library: an upstream
/// molecule-model collaborator extracts Cartesian coordinates (e.g. the atoms
/// of a nanocrystal core) into a `PointSet`, and the selection workflow reads
/// candidate positions out of it by index. The order of the points is
/// significant (candidate indices refer to positions in this sequence) and
/// the set is never mutated during a selection call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointSet {
    points: Vec<Point3<f64>>,
}

impl PointSet {
    /// Creates a point set from a sequence of 3D points.
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Creates a point set from raw `[x, y, z]` coordinate rows.
    pub fn from_rows(rows: &[[f64; 3]]) -> Self {
        Self {
            points: rows
                .iter()
                .map(|&[x, y, z]| Point3::new(x, y, z))
                .collect(),
        }
    }

    /// Returns the number of points in the set.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the set contains no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the point at `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&Point3<f64>> {
        self.points.get(index)
    }

    /// Iterates over the points in order.
    pub fn iter(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.points.iter()
    }

    /// Extracts the positions of the given indices, preserving their order.
    ///
    /// # Arguments
    ///
    /// * `indices` - Indices into this point set, typically the candidate
    ///   anchor sites of a selection call.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::IndexOutOfBounds`] for the first index that
    /// does not refer to a point in the set.
    pub fn positions(&self, indices: &[usize]) -> Result<Vec<Point3<f64>>, PointSetError> {
        indices
            .iter()
            .map(|&index| {
                self.points
                    .get(index)
                    .copied()
                    .ok_or(PointSetError::IndexOutOfBounds {
                        index,
                        len: self.points.len(),
                    })
            })
            .collect()
    }
}

impl From<Vec<Point3<f64>>> for PointSet {
    fn from(points: Vec<Point3<f64>>) -> Self {
        Self::new(points)
    }
}
