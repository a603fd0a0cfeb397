use log::trace;
use rand::seq::{IteratorRandom, SliceRandom};

use crate::lns::destroy::frontier::Frontier;
use crate::lns::destroy::parameters::{
    Acceptance, FrontierRetention, RelatednessRemovalParameters, SeedPolicy,
};
use crate::lns::destroy::removal_set::RemovalSet;
use crate::problem::{CustomerId, ProblemContext};
use crate::solution::Solution;
use crate::utils::{Random, RandomDecisions};

/// Outcome of one expansion attempt on a frontier member.
#[derive(Debug, PartialEq, Eq)]
enum Expansion {
    Accepted,
    /// Candidates existed but none was accepted.
    Idle,
    /// No unselected candidate was left.
    Exhausted,
}

/// Grows a removal set outwards from a seed customer along the
/// k-nearest-neighbor adjacency (and optionally along tours), so that the
/// removed customers are close to each other.
pub struct RelatednessRemoval {
    params: RelatednessRemovalParameters,
}

impl RelatednessRemoval {
    pub fn new(params: RelatednessRemovalParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &RelatednessRemovalParameters {
        &self.params
    }

    pub fn select(
        &self,
        context: &ProblemContext,
        solution: &Solution,
        rng: &mut Random,
    ) -> RemovalSet {
        let customer_count = context.customer_count();
        let target = self.params.removal_count.draw(customer_count, rng);
        if target == 0 {
            return RemovalSet::new(customer_count, 0);
        }
        let seed = self.select_seed(context, solution, rng);
        self.select_from_seed(context, solution, seed, target, rng)
    }

    /// Expands from `seed` until `target` customers are selected or no
    /// further customer can be found. A `seed` that is not a customer id is
    /// replaced by a random one.
    pub fn select_from_seed(
        &self,
        context: &ProblemContext,
        solution: &Solution,
        seed: CustomerId,
        target: usize,
        rng: &mut Random,
    ) -> RemovalSet {
        let customer_count = context.customer_count();
        if customer_count == 0 {
            return RemovalSet::new(0, 0);
        }
        let target = target.clamp(1, customer_count);
        let mut removed = RemovalSet::new(customer_count, target);
        let mut frontier = Frontier::new(self.params.frontier_policy, target);
        if removed.insert(seed) {
            frontier.push(seed);
        }

        let mut idle = 0;
        let mut reseeds = 0;
        // set when an idle reseed failed; cleared by the next accepted customer
        let mut stalled = false;
        while removed.len() < target {
            let jump = removed.len() >= self.params.min_selected_for_jump
                && rng.chance(self.params.random_jump_probability);
            if jump && self.reseed(context, &mut removed, &mut frontier, rng) {
                reseeds += 1;
                idle = 0;
                continue;
            }
            if idle < self.params.max_idle_expansions {
                if let Some((slot, c)) = frontier.pick(rng) {
                    match self.expand(context, solution, slot, c, &mut removed, &mut frontier, rng)
                    {
                        Expansion::Accepted => {
                            idle = 0;
                            stalled = false;
                        }
                        Expansion::Idle => idle += 1,
                        Expansion::Exhausted => {}
                    }
                    continue;
                }
            }
            idle = 0;
            if self.reseed(context, &mut removed, &mut frontier, rng) {
                reseeds += 1;
                continue;
            }
            if frontier.is_empty() || stalled {
                break;
            }
            stalled = true;
        }

        trace!(
            "relatedness removal from seed {}: {}/{} customers, {} reseeds{}",
            seed,
            removed.len(),
            target,
            reseeds,
            if removed.is_degraded() { " (degraded)" } else { "" }
        );
        removed
    }

    pub(crate) fn select_seed(
        &self,
        context: &ProblemContext,
        solution: &Solution,
        rng: &mut Random,
    ) -> CustomerId {
        let customer_count = context.customer_count();
        let visited = |c: &CustomerId| context.is_customer(*c);
        let seed = match self.params.seed_policy {
            SeedPolicy::Uniform => None,
            SeedPolicy::PreferVisited { probability } => {
                if rng.chance(probability) {
                    solution.iter_assigned().filter(visited).choose(rng)
                } else {
                    None
                }
            }
            SeedPolicy::RandomTour => solution
                .iter_non_empty_tour_ids()
                .choose(rng)
                .and_then(|tour_id| {
                    solution.tours()[tour_id]
                        .choose(rng)
                        .cloned()
                        .filter(visited)
                }),
        };
        seed.unwrap_or_else(|| rng.random_int(1, customer_count))
    }

    #[allow(clippy::too_many_arguments)]
    fn expand(
        &self,
        context: &ProblemContext,
        solution: &Solution,
        slot: usize,
        c: CustomerId,
        removed: &mut RemovalSet,
        frontier: &mut Frontier,
        rng: &mut Random,
    ) -> Expansion {
        if self.params.tour_neighbor_probability > 0.0
            && rng.chance(self.params.tour_neighbor_probability)
        {
            let mut along_tour = solution.tour_neighbors(c);
            along_tour.retain(|t| context.is_customer(*t) && !removed.contains(*t));
            if let Some(&t) = along_tour.as_slice().choose(rng) {
                accept(t, removed, frontier);
                if self.params.frontier_retention == FrontierRetention::SingleVisit {
                    frontier.remove(slot);
                }
                return Expansion::Accepted;
            }
        }

        let prefix = rng.random_int(
            *self.params.neighbor_prefix.start(),
            *self.params.neighbor_prefix.end(),
        );
        let candidates: Vec<CustomerId> = context
            .neighbors(c)
            .iter()
            .take(prefix)
            .cloned()
            .filter(|nb| context.is_customer(*nb) && !removed.contains(*nb))
            .collect();
        if candidates.is_empty() {
            frontier.remove(slot);
            return Expansion::Exhausted;
        }

        let mut accepted = 0;
        match self.params.acceptance {
            Acceptance::Nearest => {
                accept(candidates[0], removed, frontier);
                accepted += 1;
            }
            Acceptance::Uniform => {
                if let Some(&nb) = candidates.choose(rng) {
                    accept(nb, removed, frontier);
                    accepted += 1;
                }
            }
            Acceptance::PowerBiased { exponent } => {
                let idx = (rng.fraction().powf(exponent) * candidates.len() as f64) as usize;
                accept(candidates[idx.min(candidates.len() - 1)], removed, frontier);
                accepted += 1;
            }
            Acceptance::Probabilistic { probability } => {
                for nb in candidates {
                    if removed.len() >= removed.target() {
                        break;
                    }
                    if rng.chance(probability) {
                        accept(nb, removed, frontier);
                        accepted += 1;
                    }
                }
            }
        }

        if self.params.frontier_retention == FrontierRetention::SingleVisit {
            frontier.remove(slot);
        }
        if accepted > 0 {
            Expansion::Accepted
        } else {
            Expansion::Idle
        }
    }

    /// Draws random customers until an unselected one turns up. Returns
    /// `false` once the retry budget is spent.
    fn reseed(
        &self,
        context: &ProblemContext,
        removed: &mut RemovalSet,
        frontier: &mut Frontier,
        rng: &mut Random,
    ) -> bool {
        let customer_count = context.customer_count();
        for _ in 0..self.params.seed_retries(customer_count) {
            let c = rng.random_int(1, customer_count);
            if removed.insert(c) {
                frontier.push(c);
                return true;
            }
        }
        false
    }
}

fn accept(customer: CustomerId, removed: &mut RemovalSet, frontier: &mut Frontier) {
    if removed.insert(customer) {
        frontier.push(customer);
    }
}
