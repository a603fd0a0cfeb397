use anyhow::{ensure, Result};

use crate::problem::travel_matrix::TravelMatrix;
use crate::problem::DEPOT;

/// Precomputed k-nearest-neighbor adjacency over all nodes (depot included as
/// a row). Each list is sorted ascending by distance, ties by id, and never
/// contains its own node.
#[derive(Debug, Clone)]
pub struct NeighborGraph {
    lists: Vec<Vec<usize>>,
}

impl NeighborGraph {
    pub fn with_nearest(
        matrix: &impl TravelMatrix,
        num_neighbors: usize,
        include_depot: bool,
    ) -> Self {
        let n = matrix.num_nodes();
        let lists = (0..n)
            .map(|from| {
                let mut related: Vec<usize> = (0..n)
                    .filter(|&to| to != from && (include_depot || to != DEPOT))
                    .collect();
                related.sort_by(|&a, &b| {
                    matrix
                        .distance(from, a)
                        .total_cmp(&matrix.distance(from, b))
                        .then(a.cmp(&b))
                });
                related.truncate(num_neighbors);
                related
            })
            .collect();
        Self { lists }
    }

    /// Takes externally computed lists; one list per node, depot first.
    pub fn from_lists(lists: Vec<Vec<usize>>) -> Result<Self> {
        let n = lists.len();
        for (node, list) in lists.iter().enumerate() {
            for &other in list {
                ensure!(
                    other < n,
                    "neighbor {} of node {} is out of range (nodes: {})",
                    other,
                    node,
                    n
                );
                ensure!(other != node, "node {} lists itself as neighbor", node);
            }
        }
        Ok(Self { lists })
    }

    #[inline(always)]
    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.lists.get(node).map(|it| it.as_slice()).unwrap_or(&[])
    }

    pub fn num_nodes(&self) -> usize {
        self.lists.len()
    }
}
