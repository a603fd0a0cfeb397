use std::collections::VecDeque;

use crate::lns::destroy::parameters::FrontierPolicy;
use crate::problem::CustomerId;
use crate::utils::{Random, RandomDecisions};

/// Selected customers whose neighborhoods are still being expanded.
pub(crate) struct Frontier {
    policy: FrontierPolicy,
    queue: VecDeque<CustomerId>,
}

impl Frontier {
    pub(crate) fn new(policy: FrontierPolicy, capacity: usize) -> Self {
        Self {
            policy,
            queue: VecDeque::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, customer: CustomerId) {
        self.queue.push_back(customer);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the slot and customer of the next member to expand.
    pub(crate) fn pick(&self, rng: &mut Random) -> Option<(usize, CustomerId)> {
        if self.is_empty() {
            return None;
        }
        let slot = match self.policy {
            FrontierPolicy::Random => rng.random_int(0, self.queue.len() - 1),
            FrontierPolicy::Fifo => 0,
        };
        Some((slot, self.queue[slot]))
    }

    pub(crate) fn remove(&mut self, slot: usize) {
        match self.policy {
            FrontierPolicy::Random => {
                self.queue.swap_remove_back(slot);
            }
            FrontierPolicy::Fifo => {
                self.queue.remove(slot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::create_seeded_rng;

    use super::*;

    #[test]
    fn fifo_expands_oldest_first() {
        let mut rng = create_seeded_rng(3);
        let mut frontier = Frontier::new(FrontierPolicy::Fifo, 4);
        frontier.push(4);
        frontier.push(2);
        frontier.push(9);
        let mut order = vec![];
        while let Some((slot, c)) = frontier.pick(&mut rng) {
            order.push(c);
            frontier.remove(slot);
        }
        assert_eq!(vec![4, 2, 9], order);
    }

    #[test]
    fn random_pick_drains_every_member() {
        let mut rng = create_seeded_rng(3);
        let mut frontier = Frontier::new(FrontierPolicy::Random, 4);
        for c in 1..=5 {
            frontier.push(c);
        }
        let mut seen = vec![];
        while let Some((slot, c)) = frontier.pick(&mut rng) {
            seen.push(c);
            frontier.remove(slot);
        }
        seen.sort();
        assert_eq!(vec![1, 2, 3, 4, 5], seen);
        assert!(frontier.is_empty());
    }
}
