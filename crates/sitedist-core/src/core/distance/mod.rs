//! Symmetric pairwise distance matrices.
//!
//! A [`DistanceMatrix`] is derived fresh from a point set (or accepted
//! pre-computed from a caller) for every selection call. The constructors
//! enforce the invariants the engine relies on: the matrix is square,
//! symmetric, and free of negative entries. The diagonal is zero by
//! construction and ignored by the engine, which masks it with a sentinel
//! before selection.

pub mod edge;

use nalgebra::{DMatrix, Point3};
use thiserror::Error;

const SYMMETRY_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DistanceError {
    #[error("Distance matrix must be square; got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Distance matrix is asymmetric at ({row}, {col}): {forward} != {backward}")]
    Asymmetric {
        row: usize,
        col: usize,
        forward: f64,
        backward: f64,
    },

    #[error("Distance matrix has negative entry {value} at ({row}, {col})")]
    NegativeEntry { row: usize, col: usize, value: f64 },

    #[error("Cannot build a distance matrix over an empty point set")]
    Empty,

    #[error("Row index {index} out of bounds for a {len}x{len} distance matrix")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Proximity graph is disconnected: no edge path between points {from} and {to}")]
    Disconnected { from: usize, to: usize },
}

/// A symmetric matrix of non-negative pairwise distances.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    inner: DMatrix<f64>,
}

impl DistanceMatrix {
    /// Builds the Euclidean pairwise distance matrix over `points`.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::Empty`] if `points` is empty.
    pub fn euclidean(points: &[Point3<f64>]) -> Result<Self, DistanceError> {
        if points.is_empty() {
            return Err(DistanceError::Empty);
        }
        let n = points.len();
        let inner = DMatrix::from_fn(n, n, |i, j| (points[i] - points[j]).norm());
        Ok(Self { inner })
    }

    /// Wraps a pre-computed distance matrix, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is empty, not square, asymmetric beyond
    /// a small tolerance, or contains a negative entry.
    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self, DistanceError> {
        if matrix.is_empty() {
            return Err(DistanceError::Empty);
        }
        if matrix.nrows() != matrix.ncols() {
            return Err(DistanceError::NotSquare {
                rows: matrix.nrows(),
                cols: matrix.ncols(),
            });
        }
        let n = matrix.nrows();
        for row in 0..n {
            for col in row..n {
                let forward = matrix[(row, col)];
                let backward = matrix[(col, row)];
                if (forward - backward).abs() > SYMMETRY_TOLERANCE {
                    return Err(DistanceError::Asymmetric {
                        row,
                        col,
                        forward,
                        backward,
                    });
                }
                if forward < 0.0 {
                    return Err(DistanceError::NegativeEntry {
                        row,
                        col,
                        value: forward,
                    });
                }
            }
        }
        Ok(Self { inner: matrix })
    }

    /// Returns the number of points the matrix spans.
    pub fn len(&self) -> usize {
        self.inner.nrows()
    }

    /// Returns `true` if the matrix spans no points.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the distance between points `row` and `col`.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.inner[(row, col)]
    }

    /// Extracts the sub-matrix restricted to `indices`, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::IndexOutOfBounds`] for the first index outside
    /// the matrix, and [`DistanceError::Empty`] if `indices` is empty.
    pub fn restrict(&self, indices: &[usize]) -> Result<Self, DistanceError> {
        if indices.is_empty() {
            return Err(DistanceError::Empty);
        }
        let len = self.len();
        for &index in indices {
            if index >= len {
                return Err(DistanceError::IndexOutOfBounds { index, len });
            }
        }
        let inner = self.inner.select_rows(indices).select_columns(indices);
        Ok(Self { inner })
    }

    pub(crate) fn into_inner(self) -> DMatrix<f64> {
        self.inner
    }

    pub(crate) fn inner(&self) -> &DMatrix<f64> {
        &self.inner
    }
}
