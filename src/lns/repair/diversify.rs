use rand::seq::SliceRandom;

use crate::utils::{Random, RandomDecisions};

/// Light random post-pass over a finished insertion order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Diversification {
    pub reverse_probability: f64,
    pub shuffle_probability: f64,
    /// Upper bound of adjacent swaps applied when swapping fires.
    pub max_adjacent_swaps: usize,
    pub swap_probability: f64,
}

impl Default for Diversification {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Diversification {
    pub fn disabled() -> Self {
        Self {
            reverse_probability: 0.0,
            shuffle_probability: 0.0,
            max_adjacent_swaps: 0,
            swap_probability: 0.0,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.reverse_probability == 0.0
            && self.shuffle_probability == 0.0
            && (self.max_adjacent_swaps == 0 || self.swap_probability == 0.0)
    }

    pub(crate) fn apply<T>(&self, order: &mut [T], rng: &mut Random) {
        if order.len() < 2 || self.is_disabled() {
            return;
        }
        if rng.chance(self.shuffle_probability) {
            order.shuffle(rng);
        } else if rng.chance(self.reverse_probability) {
            order.reverse();
        }
        if self.max_adjacent_swaps > 0 && rng.chance(self.swap_probability) {
            for _ in 0..rng.random_int(1, self.max_adjacent_swaps) {
                let i = rng.random_int(0, order.len() - 2);
                order.swap(i, i + 1);
            }
        }
    }
}
