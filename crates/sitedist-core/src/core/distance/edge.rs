//! Edge-following distance metric.
//!
//! Ligand anchors on a hollow or faceted core should often be spread along the
//! surface rather than through it. This metric replaces straight-line
//! separation with the length of the shortest path over a proximity graph:
//! two points are joined by an edge when their separation is within
//! [`DEFAULT_NEIGHBOR_SCALE`] times the largest nearest-neighbour distance in
//! the set, and the pairwise distance becomes the Dijkstra path length over
//! those edges.

use itertools::Itertools;
use nalgebra::{DMatrix, Point3};
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use tracing::debug;

use super::{DistanceError, DistanceMatrix};

/// Multiplier applied to the largest nearest-neighbour distance when deciding
/// which point pairs are joined by an edge.
pub const DEFAULT_NEIGHBOR_SCALE: f64 = 1.3;

/// Builds the edge-following (shortest-path) distance matrix over `points`.
///
/// # Arguments
///
/// * `points` - Cartesian positions of the candidate sites.
/// * `neighbor_scale` - Edge cutoff as a multiple of the largest
///   nearest-neighbour distance; [`DEFAULT_NEIGHBOR_SCALE`] is appropriate for
///   roughly evenly spaced surface sites.
///
/// # Errors
///
/// Returns [`DistanceError::Empty`] for an empty point set and
/// [`DistanceError::Disconnected`] when the proximity graph does not join
/// every pair of points.
pub fn edge_distance_matrix(
    points: &[Point3<f64>],
    neighbor_scale: f64,
) -> Result<DistanceMatrix, DistanceError> {
    if points.is_empty() {
        return Err(DistanceError::Empty);
    }
    let n = points.len();
    if n == 1 {
        return DistanceMatrix::from_matrix(DMatrix::zeros(1, 1));
    }

    let mut nearest = vec![f64::INFINITY; n];
    for (i, j) in (0..n).tuple_combinations() {
        let d = (points[i] - points[j]).norm();
        if d < nearest[i] {
            nearest[i] = d;
        }
        if d < nearest[j] {
            nearest[j] = d;
        }
    }
    let cutoff = neighbor_scale * nearest.iter().fold(0.0_f64, |acc, &d| acc.max(d));

    let mut graph: UnGraph<(), f64> = UnGraph::new_undirected();
    let nodes: Vec<NodeIndex> = (0..n).map(|_| graph.add_node(())).collect();
    for (i, j) in (0..n).tuple_combinations() {
        let d = (points[i] - points[j]).norm();
        if d <= cutoff {
            graph.add_edge(nodes[i], nodes[j], d);
        }
    }
    debug!(
        points = n,
        edges = graph.edge_count(),
        cutoff,
        "built surface proximity graph"
    );

    let mut matrix = DMatrix::zeros(n, n);
    for i in 0..n {
        let paths = dijkstra(&graph, nodes[i], None, |e| *e.weight());
        for j in (i + 1)..n {
            match paths.get(&nodes[j]) {
                Some(&d) => {
                    matrix[(i, j)] = d;
                    matrix[(j, i)] = d;
                }
                None => return Err(DistanceError::Disconnected { from: i, to: j }),
            }
        }
    }

    DistanceMatrix::from_matrix(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn square_corners_follow_the_perimeter() {
        // Unit square: the cutoff admits the sides but not the diagonal, so the
        // corner-to-corner distance is two side lengths instead of sqrt(2).
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let dist = edge_distance_matrix(&points, DEFAULT_NEIGHBOR_SCALE).unwrap();
        assert_relative_eq!(dist.value(0, 1), 1.0);
        assert_relative_eq!(dist.value(0, 2), 2.0);
        assert_relative_eq!(dist.value(1, 3), 2.0);
    }

    #[test]
    fn chain_distances_accumulate_along_edges() {
        let points: Vec<_> = (0..5).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        let dist = edge_distance_matrix(&points, DEFAULT_NEIGHBOR_SCALE).unwrap();
        assert_relative_eq!(dist.value(0, 4), 4.0);
        assert_relative_eq!(dist.value(1, 3), 2.0);
    }

    #[test]
    fn separated_pairs_are_reported_disconnected() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(11.0, 0.0, 0.0),
        ];
        assert!(matches!(
            edge_distance_matrix(&points, DEFAULT_NEIGHBOR_SCALE),
            Err(DistanceError::Disconnected { .. })
        ));
    }

    #[test]
    fn single_point_yields_zero_matrix() {
        let dist = edge_distance_matrix(&[Point3::new(1.0, 2.0, 3.0)], DEFAULT_NEIGHBOR_SCALE)
            .unwrap();
        assert_eq!(dist.len(), 1);
        assert_relative_eq!(dist.value(0, 0), 0.0);
    }
}
