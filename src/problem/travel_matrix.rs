use anyhow::{ensure, Result};

use crate::problem::Arc;
use crate::utils::Tolerance;

pub trait TravelMatrix {
    fn distance(&self, from: usize, to: usize) -> f64;
    fn max_distance(&self) -> f64;
    fn num_nodes(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct FixSizedTravelMatrix {
    n: usize,
    data: Vec<f64>,
    max_distance: f64,
}

impl FixSizedTravelMatrix {
    pub fn with_euclidean_distances(coords: &[(f64, f64)]) -> Self {
        let n = coords.len();
        let mut data = vec![0.0; n * n];

        let mut max_distance = 0.0f64;
        for i in 0..n {
            for j in (i + 1)..n {
                let (xi, yi) = coords[i];
                let (xj, yj) = coords[j];
                let euclidean = ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt();
                max_distance = max_distance.max(euclidean);
                data[i * n + j] = euclidean;
                data[j * n + i] = euclidean;
            }
        }

        Self {
            n,
            data,
            max_distance,
        }
    }

    /// Checks that the matrix is finite, non-negative and symmetric.
    pub fn validate(&self) -> Result<()> {
        for i in 0..self.n {
            for j in 0..self.n {
                let d = self.distance(i, j);
                ensure!(
                    d.is_finite() && d >= 0.0,
                    "distance({}, {}) = {} is not a finite non-negative value",
                    i,
                    j,
                    d
                );
                ensure!(
                    (d - self.distance(j, i)).abs() <= f64::tol(),
                    "distance matrix is not symmetric at ({}, {}): {} != {}",
                    i,
                    j,
                    d,
                    self.distance(j, i)
                );
            }
        }
        Ok(())
    }

    #[inline(always)]
    fn idx(&self, from: usize, to: usize) -> usize {
        debug_assert!(from < self.n);
        debug_assert!(to < self.n);
        from * self.n + to
    }
}

impl TravelMatrix for FixSizedTravelMatrix {
    #[inline(always)]
    fn distance(&self, from: usize, to: usize) -> f64 {
        self.data[self.idx(from, to)]
    }
    #[inline(always)]
    fn max_distance(&self) -> f64 {
        self.max_distance
    }
    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.n
    }
}

pub struct FixSizedTravelMatrixBuilder {
    n: usize,
    data: Vec<f64>,
}

impl FixSizedTravelMatrixBuilder {
    /// All off-diagonal entries start at `default_distance`.
    pub fn with_num_nodes(num_nodes: usize, default_distance: f64) -> Self {
        let mut data = vec![default_distance; num_nodes * num_nodes];
        for i in 0..num_nodes {
            data[i * num_nodes + i] = 0.0;
        }
        Self { n: num_nodes, data }
    }

    pub fn set_arc(&mut self, arc: Arc) -> &mut Self {
        self.data[arc.from * self.n + arc.to] = arc.distance;
        self
    }

    /// Sets both directions.
    pub fn set_edge(&mut self, a: usize, b: usize, distance: f64) -> &mut Self {
        self.set_arc(Arc {
            from: a,
            to: b,
            distance,
        })
        .set_arc(Arc {
            from: b,
            to: a,
            distance,
        })
    }

    pub fn build(self) -> FixSizedTravelMatrix {
        let max_distance = self
            .data
            .iter()
            .cloned()
            .filter(|it| it.is_finite())
            .fold(0.0, f64::max);
        FixSizedTravelMatrix {
            n: self.n,
            data: self.data,
            max_distance,
        }
    }
}
