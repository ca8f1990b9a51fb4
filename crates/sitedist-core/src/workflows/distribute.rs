use rand::seq::SliceRandom;
use rand::{Rng, thread_rng};
use tracing::{debug, instrument};

use crate::core::distance::DistanceMatrix;
use crate::core::distance::edge::{DEFAULT_NEIGHBOR_SCALE, edge_distance_matrix};
use crate::core::models::point_set::PointSet;
use crate::engine::config::{DistributionConfig, Mode};
use crate::engine::error::SelectionError;
use crate::engine::selection::{Operation, SelectionWalk};
use crate::engine::weights;

/// The geometry a distribution call reads distances from.
#[derive(Debug, Clone, Copy)]
pub enum DistanceSource<'a> {
    /// Cartesian coordinates; the metric (Euclidean, or edge-following when
    /// `follow_edge` is set) is computed over the candidate subset.
    Points(&'a PointSet),
    /// A pre-computed symmetric distance matrix over the full point set. The
    /// metric is taken as given; `follow_edge` has no effect.
    Matrix(&'a DistanceMatrix),
}

/// Selects a distribution of anchor indices with the default weight and RNG.
///
/// Convenience wrapper around [`run_with`] using the negative-exponential
/// distance weight and the thread-local random source.
pub fn run(
    source: DistanceSource,
    anchors: &[usize],
    config: &DistributionConfig,
) -> Result<Vec<usize>, SelectionError> {
    run_with(
        source,
        anchors,
        config,
        weights::negative_exponential,
        &mut thread_rng(),
    )
}

/// Selects an ordered subset of `anchors` of length
/// `max(1, round(fraction * anchors.len()))`.
///
/// # Arguments
///
/// * `source` - Point coordinates or a pre-computed distance matrix.
/// * `anchors` - Unique indices of the candidate sites in `source`.
/// * `config` - Mode, fraction, and the mode-specific knobs.
/// * `weight` - Monotonic transform applied elementwise to distances before
///   aggregation.
/// * `rng` - Random source for the `random` mode and stochastic overrides.
///
/// # Return
///
/// Returns the selected indices, drawn from `anchors`, in selection order.
/// A `fraction` of 1.0 returns every candidate: an order-preserved
/// independent copy for the deterministic modes, a fresh permutation for
/// `random`.
///
/// # Errors
///
/// Returns a [`SelectionError`] for out-of-range parameters, an empty or
/// out-of-bounds candidate list, or a failed metric construction. All
/// validation happens before any distance is computed.
#[instrument(
    skip_all,
    name = "distribution_workflow",
    fields(mode = %config.mode, anchors = anchors.len())
)]
pub fn run_with<F, R>(
    source: DistanceSource,
    anchors: &[usize],
    config: &DistributionConfig,
    weight: F,
    rng: &mut R,
) -> Result<Vec<usize>, SelectionError>
where
    F: Fn(f64) -> f64,
    R: Rng,
{
    config.validate()?;
    if anchors.is_empty() {
        return Err(SelectionError::NoCandidates);
    }

    let n = anchors.len();
    let stop = ((config.fraction * n as f64).round() as usize).max(1);

    let operation = match config.mode {
        Mode::Random => {
            let mut selected = anchors.to_vec();
            selected.shuffle(rng);
            selected.truncate(stop);
            return Ok(selected);
        }
        Mode::Uniform => Operation::Min,
        Mode::Cluster => Operation::Max,
    };

    if config.fraction == 1.0 {
        return Ok(anchors.to_vec());
    }

    let dist = restricted_matrix(&source, anchors, config.follow_edge)?;
    let walk = SelectionWalk::new(
        dist,
        operation,
        config.start,
        &config.cluster_sizes,
        config.randomness,
        weight,
        rng,
    )?;
    let selected: Vec<usize> = walk.take(stop).map(|row| anchors[row]).collect();
    debug!(selected = selected.len(), requested = stop, "greedy selection finished");
    Ok(selected)
}

fn restricted_matrix(
    source: &DistanceSource,
    anchors: &[usize],
    follow_edge: bool,
) -> Result<DistanceMatrix, SelectionError> {
    match source {
        DistanceSource::Points(points) => {
            let xyz = points.positions(anchors)?;
            let dist = if follow_edge {
                edge_distance_matrix(&xyz, DEFAULT_NEIGHBOR_SCALE)?
            } else {
                DistanceMatrix::euclidean(&xyz)?
            };
            Ok(dist)
        }
        DistanceSource::Matrix(matrix) => Ok(matrix.restrict(anchors)?),
    }
}
