use anyhow::{bail, ensure, Result};
use tinyvec::ArrayVec;

use crate::problem::{CustomerId, ProblemContext};

pub mod construction;

pub type Tour = Vec<CustomerId>;

/// Read-only view of the driver's current solution.
#[derive(Clone, Debug)]
pub struct Solution {
    tours: Vec<Tour>,
    /// Tour index per node id; `None` for the depot and unvisited customers.
    customer_to_tour: Vec<Option<usize>>,
    /// Position within the owning tour per node id.
    position_in_tour: Vec<usize>,
}

impl Solution {
    pub fn from_tours(context: &ProblemContext, tours: Vec<Tour>) -> Result<Self> {
        let num_nodes = context.customer_count() + 1;
        let mut customer_to_tour = vec![None; num_nodes];
        let mut position_in_tour = vec![0; num_nodes];
        for (tour_id, tour) in tours.iter().enumerate() {
            for (pos, &customer) in tour.iter().enumerate() {
                ensure!(
                    context.is_customer(customer),
                    "tour {} contains {} which is not a customer id",
                    tour_id,
                    customer
                );
                if let Some(other) = customer_to_tour[customer] {
                    bail!(
                        "customer {} appears in tour {} and tour {}",
                        customer,
                        other,
                        tour_id
                    );
                }
                customer_to_tour[customer] = Some(tour_id);
                position_in_tour[customer] = pos;
            }
        }
        Ok(Self {
            tours,
            customer_to_tour,
            position_in_tour,
        })
    }

    /// A solution in which no customer is visited.
    pub fn empty(context: &ProblemContext) -> Self {
        let num_nodes = context.customer_count() + 1;
        Self {
            tours: Vec::new(),
            customer_to_tour: vec![None; num_nodes],
            position_in_tour: vec![0; num_nodes],
        }
    }

    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    pub fn num_tours(&self) -> usize {
        self.tours.len()
    }

    pub fn tour_of(&self, customer: CustomerId) -> Option<usize> {
        self.customer_to_tour.get(customer).cloned().flatten()
    }

    pub fn is_assigned(&self, customer: CustomerId) -> bool {
        self.tour_of(customer).is_some()
    }

    pub fn iter_assigned(&self) -> impl Iterator<Item = CustomerId> + '_ {
        self.tours.iter().flat_map(|tour| tour.iter().cloned())
    }

    pub fn number_of_assigned(&self) -> usize {
        self.tours.iter().map(|tour| tour.len()).sum()
    }

    pub fn iter_non_empty_tour_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.tours
            .iter()
            .enumerate()
            .filter(|(_, tour)| !tour.is_empty())
            .map(|(id, _)| id)
    }

    /// Predecessor and successor of a customer within its tour; the depot
    /// ends of a tour are not reported.
    pub fn tour_neighbors(&self, customer: CustomerId) -> ArrayVec<[CustomerId; 2]> {
        let mut res = ArrayVec::new();
        if let Some(tour_id) = self.tour_of(customer) {
            let tour = &self.tours[tour_id];
            let pos = self.position_in_tour[customer];
            if pos > 0 {
                res.push(tour[pos - 1]);
            }
            if pos + 1 < tour.len() {
                res.push(tour[pos + 1]);
            }
        }
        res
    }
}
