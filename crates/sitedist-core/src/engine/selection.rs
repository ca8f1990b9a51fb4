use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::trace;

use super::config::ClusterSizes;
use super::error::SelectionError;
use crate::core::distance::DistanceMatrix;

/// Which extremum of the weighted aggregate a walk chases.
///
/// With the default negative-exponential weight, `Min` selects the site whose
/// summed weights are smallest, i.e. the one farthest from everything already
/// selected, and therefore yields a spread-out (uniform) distribution, while
/// `Max` yields a grouped (cluster) distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Min,
    Max,
}

/// A lazily-advancing greedy selection over a distance matrix.
///
/// The walk owns a private copy of the candidate-restricted distance matrix
/// and two score accumulators:
///
/// - `committed` holds the summed weighted rows of every completed cluster;
///   entries of already-selected rows are masked with `f64::NAN` so they can
///   never be re-selected (the sentinel survives every addition and division).
/// - `growing` holds the summed weighted rows of the in-progress cluster.
///
/// On a cluster boundary `growing` is folded into `committed` and reset, and
/// candidates are scored by `committed` alone; inside a cluster the score is
/// the elementwise ratio `committed / growing`, which rewards sites far from
/// the previous clusters but close to the members of the current one. A
/// schedule of single-site clusters reduces this to the plain running-sum
/// recurrence.
///
/// Weighted rows are materialized on demand, one per yielded index, so
/// truncating the walk after `k` items costs `O(k * n)` weight evaluations
/// rather than `O(n^2)`. The full-matrix sweep happens only when no explicit
/// start row is given and the global weighted row sums are needed.
pub struct SelectionWalk<F, R> {
    dist: DMatrix<f64>,
    weight: F,
    operation: Operation,
    randomness: Option<f64>,
    rng: R,
    committed: DVector<f64>,
    growing: DVector<f64>,
    flags: std::vec::IntoIter<bool>,
    pending_start: Option<usize>,
}

impl<F, R> SelectionWalk<F, R>
where
    F: Fn(f64) -> f64,
    R: Rng,
{
    /// Prepares a walk over `dist`, validating every parameter eagerly.
    ///
    /// # Arguments
    ///
    /// * `dist` - Candidate-restricted distance matrix; consumed and owned by
    ///   the walk for its lifetime.
    /// * `operation` - Extremum to chase; see [`Operation`].
    /// * `start` - Explicit starting row, or `None` to start at the extremum
    ///   of the weighted row sums.
    /// * `cluster_sizes` - Cluster schedule for the remaining picks.
    /// * `randomness` - Per-pick probability of overriding the greedy choice
    ///   with a random still-available row.
    /// * `weight` - Monotonic transform applied elementwise to distances.
    /// * `rng` - Random source; only consulted when `randomness` is set.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionError`] if the matrix is empty, `randomness` falls
    /// outside `[0, 1]`, the cluster schedule contains a zero or is empty, or
    /// `start` is not a valid row.
    pub fn new(
        dist: DistanceMatrix,
        operation: Operation,
        start: Option<usize>,
        cluster_sizes: &ClusterSizes,
        randomness: Option<f64>,
        weight: F,
        rng: R,
    ) -> Result<Self, SelectionError> {
        let n = dist.len();
        if n == 0 {
            return Err(SelectionError::NoCandidates);
        }
        if let Some(randomness) = randomness {
            if !(0.0..=1.0).contains(&randomness) {
                return Err(SelectionError::RandomnessOutOfRange(randomness));
            }
        }
        cluster_sizes.validate()?;
        if let Some(start) = start {
            if start >= n {
                return Err(SelectionError::StartOutOfBounds { start, n });
            }
        }

        let dist = dist.into_inner();
        let start = match start {
            Some(row) => row,
            None => {
                let sums = DVector::from_fn(n, |row, _| {
                    (0..n)
                        .filter(|&col| col != row)
                        .map(|col| weight(dist[(row, col)]))
                        .sum()
                });
                arg_extremum(&sums, operation).unwrap_or(0)
            }
        };

        let committed = weighted_row(&dist, &weight, start);
        let growing = DVector::zeros(n);
        let flags = cluster_sizes.boundary_flags(n - 1).into_iter();

        Ok(Self {
            dist,
            weight,
            operation,
            randomness,
            rng,
            committed,
            growing,
            flags,
            pending_start: Some(start),
        })
    }

    fn score(&self, row: usize, boundary: bool) -> f64 {
        if boundary {
            self.committed[row]
        } else {
            self.committed[row] / self.growing[row]
        }
    }

    fn takes_random_pick(&mut self) -> bool {
        match self.randomness {
            Some(randomness) => self.rng.gen_range(0.0..1.0) < randomness,
            None => false,
        }
    }
}

impl<F, R> Iterator for SelectionWalk<F, R>
where
    F: Fn(f64) -> f64,
    R: Rng,
{
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if let Some(start) = self.pending_start.take() {
            return Some(start);
        }
        let boundary = self.flags.next()?;
        if boundary {
            self.committed += &self.growing;
            self.growing.fill(0.0);
        }

        let n = self.committed.len();
        let pick = if self.takes_random_pick() {
            let available: Vec<usize> = (0..n)
                .filter(|&row| !self.score(row, boundary).is_nan())
                .collect();
            *available.choose(&mut self.rng)?
        } else {
            let mut best: Option<(usize, f64)> = None;
            for row in 0..n {
                let value = self.score(row, boundary);
                if value.is_nan() {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((_, incumbent)) => match self.operation {
                        Operation::Min => value < incumbent,
                        Operation::Max => value > incumbent,
                    },
                };
                if better {
                    best = Some((row, value));
                }
            }
            best?.0
        };

        self.committed[pick] = f64::NAN;
        let row = weighted_row(&self.dist, &self.weight, pick);
        self.growing += &row;
        trace!(pick, boundary, "selected row");
        Some(pick)
    }
}

/// Orders all rows of `dist` by ascending distance from the most central one.
///
/// The starting row is the one with the smallest Euclidean row norm (the
/// site closest, on aggregate, to every other) unless given explicitly. The
/// result is a single cluster growing outward from that site.
pub fn central_cluster_order(
    dist: &DistanceMatrix,
    start: Option<usize>,
) -> Result<Vec<usize>, SelectionError> {
    let n = dist.len();
    if n == 0 {
        return Err(SelectionError::NoCandidates);
    }
    if let Some(start) = start {
        if start >= n {
            return Err(SelectionError::StartOutOfBounds { start, n });
        }
    }
    let start = start.unwrap_or_else(|| {
        let norms: Vec<f64> = (0..n).map(|row| dist.inner().row(row).norm()).collect();
        let mut best = 0;
        for (row, &norm) in norms.iter().enumerate() {
            if norm < norms[best] {
                best = row;
            }
        }
        best
    });

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        dist.value(start, a)
            .partial_cmp(&dist.value(start, b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(order)
}

fn weighted_row<F: Fn(f64) -> f64>(dist: &DMatrix<f64>, weight: &F, row: usize) -> DVector<f64> {
    DVector::from_fn(dist.nrows(), |col, _| {
        if col == row {
            f64::NAN
        } else {
            weight(dist[(row, col)])
        }
    })
}

fn arg_extremum(values: &DVector<f64>, operation: Operation) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, incumbent)) => match operation {
                Operation::Min => value < incumbent,
                Operation::Max => value > incumbent,
            },
        };
        if better {
            best = Some((index, value));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::weights::negative_exponential;
    use nalgebra::Point3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;

    fn line(n: usize) -> DistanceMatrix {
        let points: Vec<_> = (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        DistanceMatrix::euclidean(&points).unwrap()
    }

    // Rectangle of width 1 and height 2; all pairwise distances distinct from
    // the perspective of corner 0.
    fn rectangle() -> DistanceMatrix {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        DistanceMatrix::euclidean(&points).unwrap()
    }

    fn walk(
        dist: DistanceMatrix,
        operation: Operation,
        start: Option<usize>,
        cluster_sizes: ClusterSizes,
    ) -> Vec<usize> {
        SelectionWalk::new(
            dist,
            operation,
            start,
            &cluster_sizes,
            None,
            negative_exponential,
            StdRng::seed_from_u64(0),
        )
        .unwrap()
        .collect()
    }

    #[test]
    fn uniform_walk_moves_to_the_farthest_point_first() {
        let order = walk(rectangle(), Operation::Min, Some(0), ClusterSizes::Fixed(1));
        assert_eq!(order[0], 0);
        // Corner 2 is the diagonal opposite, farther than both neighbours.
        assert_eq!(order[1], 2);
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn cluster_walk_moves_to_the_nearest_point_first() {
        let order = walk(rectangle(), Operation::Max, Some(0), ClusterSizes::Fixed(1));
        assert_eq!(order[0], 0);
        // Corner 1 sits one unit away, the closest remaining site.
        assert_eq!(order[1], 1);
    }

    #[test]
    fn default_start_is_the_most_isolated_row_for_uniform() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(16.0, 0.0, 0.0),
        ];
        let dist = DistanceMatrix::euclidean(&points).unwrap();
        let order = walk(dist, Operation::Min, None, ClusterSizes::Fixed(1));
        assert_eq!(order[0], 2);
    }

    #[test]
    fn default_start_is_the_most_central_row_for_cluster() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(16.0, 0.0, 0.0),
        ];
        let dist = DistanceMatrix::euclidean(&points).unwrap();
        let order = walk(dist, Operation::Max, None, ClusterSizes::Fixed(1));
        assert_eq!(order[0], 1);
    }

    #[test]
    fn paired_clusters_on_a_line_stay_adjacent_and_spread_apart() {
        let order = walk(line(8), Operation::Min, Some(0), ClusterSizes::Fixed(2));
        assert_eq!(order, vec![0, 7, 6, 3, 2, 5, 4, 1]);
    }

    #[test]
    fn every_row_is_yielded_exactly_once() {
        let points = vec![
            Point3::new(0.0, 0.3, 0.0),
            Point3::new(1.1, 0.0, 0.2),
            Point3::new(2.3, 0.7, 0.0),
            Point3::new(0.4, 1.9, 0.5),
            Point3::new(3.1, 2.2, 0.1),
            Point3::new(1.7, 3.0, 0.9),
            Point3::new(4.2, 0.6, 0.3),
            Point3::new(2.9, 4.1, 0.0),
            Point3::new(5.0, 3.3, 0.6),
            Point3::new(0.8, 4.7, 0.4),
        ];
        let dist = DistanceMatrix::euclidean(&points).unwrap();
        let mut order = walk(dist, Operation::Min, None, ClusterSizes::Cycle(vec![1, 3]));
        assert_eq!(order.len(), 10);
        order.sort_unstable();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn full_randomness_still_yields_a_permutation() {
        let order: Vec<usize> = SelectionWalk::new(
            line(6),
            Operation::Min,
            Some(0),
            &ClusterSizes::Fixed(1),
            Some(1.0),
            negative_exponential,
            StdRng::seed_from_u64(7),
        )
        .unwrap()
        .collect();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn zero_randomness_matches_the_greedy_walk() {
        let greedy = walk(line(7), Operation::Min, Some(0), ClusterSizes::Fixed(1));
        let stochastic: Vec<usize> = SelectionWalk::new(
            line(7),
            Operation::Min,
            Some(0),
            &ClusterSizes::Fixed(1),
            Some(0.0),
            negative_exponential,
            StdRng::seed_from_u64(3),
        )
        .unwrap()
        .collect();
        assert_eq!(greedy, stochastic);
    }

    #[test]
    fn out_of_range_randomness_is_rejected() {
        let result = SelectionWalk::new(
            line(4),
            Operation::Min,
            None,
            &ClusterSizes::Fixed(1),
            Some(-0.1),
            negative_exponential,
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(
            result.map(|_| ()),
            Err(SelectionError::RandomnessOutOfRange(r)) if r == -0.1
        ));
    }

    #[test]
    fn out_of_bounds_start_is_rejected() {
        let result = SelectionWalk::new(
            line(4),
            Operation::Min,
            Some(4),
            &ClusterSizes::Fixed(1),
            None,
            negative_exponential,
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(
            result.map(|_| ()),
            Err(SelectionError::StartOutOfBounds { start: 4, n: 4 })
        ));
    }

    #[test]
    fn truncated_walk_only_weights_the_rows_it_visits() {
        let n = 30;
        let stop = 3;
        let calls = Cell::new(0usize);
        let counting_weight = |x: f64| {
            calls.set(calls.get() + 1);
            negative_exponential(x)
        };
        let picked: Vec<usize> = SelectionWalk::new(
            line(n),
            Operation::Min,
            Some(0),
            &ClusterSizes::Fixed(1),
            None,
            counting_weight,
            StdRng::seed_from_u64(0),
        )
        .unwrap()
        .take(stop)
        .collect();
        assert_eq!(picked.len(), stop);
        // One weighted row per yielded index, nowhere near the full n * (n - 1).
        assert!(calls.get() <= stop * (n - 1));
    }

    #[test]
    fn single_row_matrix_yields_its_only_row() {
        let order = walk(line(1), Operation::Min, None, ClusterSizes::Fixed(1));
        assert_eq!(order, vec![0]);
    }

    #[test]
    fn central_cluster_order_grows_outward_from_the_center() {
        let order = central_cluster_order(&line(5), None).unwrap();
        assert_eq!(order, vec![2, 1, 3, 0, 4]);
    }

    #[test]
    fn central_cluster_order_honors_an_explicit_start() {
        let order = central_cluster_order(&line(4), Some(0)).unwrap();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn central_cluster_order_rejects_out_of_bounds_start() {
        assert!(matches!(
            central_cluster_order(&line(4), Some(9)),
            Err(SelectionError::StartOutOfBounds { start: 9, n: 4 })
        ));
    }
}
