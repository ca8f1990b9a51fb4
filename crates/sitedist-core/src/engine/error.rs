use thiserror::Error;

use crate::core::distance::DistanceError;
use crate::core::models::point_set::PointSetError;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Fraction must satisfy 0.0 < fraction <= 1.0; got {0}")]
    FractionOutOfRange(f64),

    #[error("Randomness must lie within [0.0, 1.0]; got {0}")]
    RandomnessOutOfRange(f64),

    #[error("Cluster sizes must be strictly positive; got 0 at position {position}")]
    ZeroClusterSize { position: usize },

    #[error("Cluster size cycle is empty")]
    EmptyClusterSizes,

    #[error("Unknown distribution mode '{0}'; accepted values: 'uniform', 'cluster', 'random'")]
    UnknownMode(String),

    #[error("No candidate indices were supplied")]
    NoCandidates,

    #[error("Start row {start} out of bounds for a {n}x{n} distance matrix")]
    StartOutOfBounds { start: usize, n: usize },

    #[error("Anchor index error: {source}")]
    Anchor {
        #[from]
        source: PointSetError,
    },

    #[error("Distance matrix error: {source}")]
    Distance {
        #[from]
        source: DistanceError,
    },
}
