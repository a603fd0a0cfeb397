//! Capacity-bounded nearest-neighbor tours, used to give the harness a
//! plausible solution to destroy.

use anyhow::{ensure, Result};
use fixedbitset::FixedBitSet;
use log::debug;
use rand::seq::SliceRandom;

use crate::problem::{ProblemContext, DEPOT};
use crate::solution::{Solution, Tour};
use crate::utils::{Random, RandomDecisions};

pub struct NearestNeighborTours<'a> {
    context: &'a ProblemContext,
    capacity: u32,
    /// Probability of leaving a customer unvisited (prize-collecting runs).
    skip_probability: f64,
}

impl<'a> NearestNeighborTours<'a> {
    pub fn new(context: &'a ProblemContext, capacity: u32, skip_probability: f64) -> Self {
        Self {
            context,
            capacity,
            skip_probability,
        }
    }

    pub fn construct(&self, rng: &mut Random) -> Result<Solution> {
        let context = self.context;
        let n = context.customer_count();
        let mut done = FixedBitSet::with_capacity(n + 1);
        done.insert(DEPOT);

        let mut skipped = 0;
        let mut order: Vec<usize> = context.iter_customers().collect();
        order.shuffle(rng);
        for c in order {
            ensure!(
                context.demand(c) <= self.capacity,
                "customer {} has demand {} above the vehicle capacity {}",
                c,
                context.demand(c),
                self.capacity
            );
            if rng.chance(self.skip_probability) {
                done.insert(c);
                skipped += 1;
            }
        }

        let mut tours: Vec<Tour> = Vec::new();
        let mut remaining = n - skipped;
        while remaining > 0 {
            let mut tour = Tour::new();
            let mut load = 0;
            let mut last = DEPOT;
            loop {
                let next = context
                    .iter_customers()
                    .filter(|&c| !done.contains(c) && load + context.demand(c) <= self.capacity)
                    .min_by(|&a, &b| {
                        context
                            .distance(last, a)
                            .total_cmp(&context.distance(last, b))
                            .then(a.cmp(&b))
                    });
                match next {
                    Some(c) => {
                        done.insert(c);
                        load += context.demand(c);
                        tour.push(c);
                        last = c;
                        remaining -= 1;
                    }
                    None => break,
                }
            }
            tours.push(tour);
        }

        debug!(
            "constructed {} tours, {} customers left unvisited",
            tours.len(),
            skipped
        );
        Solution::from_tours(context, tours)
    }
}
